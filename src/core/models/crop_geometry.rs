/// A point in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropPoint {
    pub x: f32,
    pub y: f32,
}

impl CropPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Where an image is drawn on screen, in display units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayViewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl DisplayViewport {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Maps a point picked on the displayed image back onto the source pixels.
    /// A viewport with no area maps points through unchanged.
    pub fn to_image_point(
        &self,
        display_point: CropPoint,
        image_width: u32,
        image_height: u32,
    ) -> CropPoint {
        if self.width <= 0.0 || self.height <= 0.0 {
            log::warn!("[QUAD_CROP] Viewport has no area, using raw display point");
            return display_point;
        }

        let scale_x = image_width as f32 / self.width;
        let scale_y = image_height as f32 / self.height;

        let mapped = CropPoint::new(
            (display_point.x - self.x) * scale_x,
            (display_point.y - self.y) * scale_y,
        );

        log::debug!(
            "[QUAD_CROP] Display point {:?} -> image point {:?} (scale {}, {})",
            display_point,
            mapped,
            scale_x,
            scale_y
        );

        mapped
    }
}

/// Axis-aligned pixel rectangle, `left`/`top` inclusive, `right`/`bottom` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl PixelRect {
    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}
