use crate::core::models::{CaptureBuffer, CropError, CropPoint, DisplayViewport, PixelRect};
use crate::global_constants::LOG_TAG_QUAD_CROP;

pub const QUAD_CORNER_COUNT: usize = 4;

/// Four-corner region picker over one source image.
///
/// Corners are expected top-left, top-right, bottom-right, bottom-left, but the
/// order is not enforced. The crop is the axis-aligned bounding rectangle
/// spanned by those corners, copied pixel for pixel; no perspective correction
/// is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadCropSession {
    source: CaptureBuffer,
    points: Vec<CropPoint>,
}

impl QuadCropSession {
    pub fn new(source: CaptureBuffer) -> Self {
        log::debug!(
            "{} starting session over {}x{} image",
            LOG_TAG_QUAD_CROP,
            source.width,
            source.height
        );

        Self {
            source,
            points: Vec::with_capacity(QUAD_CORNER_COUNT),
        }
    }

    pub fn source(&self) -> &CaptureBuffer {
        &self.source
    }

    pub fn into_source(self) -> CaptureBuffer {
        self.source
    }

    pub fn points(&self) -> &[CropPoint] {
        &self.points
    }

    pub fn is_complete(&self) -> bool {
        self.points.len() == QUAD_CORNER_COUNT
    }

    pub fn add_point(&mut self, point: CropPoint) -> Result<(), CropError> {
        if self.points.len() >= QUAD_CORNER_COUNT {
            log::warn!("{} ignoring point {:?}, quad already complete", LOG_TAG_QUAD_CROP, point);
            return Err(CropError::TooManyPoints);
        }

        self.points.push(point);
        log::debug!(
            "{} corner {} set at {:?}",
            LOG_TAG_QUAD_CROP,
            self.points.len(),
            point
        );
        Ok(())
    }

    /// Adds a corner picked on a scaled on-screen rendering of the source.
    pub fn add_display_point(
        &mut self,
        display_point: CropPoint,
        viewport: &DisplayViewport,
    ) -> Result<(), CropError> {
        let image_point =
            viewport.to_image_point(display_point, self.source.width, self.source.height);
        self.add_point(image_point)
    }

    pub fn reset_points(&mut self) {
        log::debug!("{} clearing {} corners", LOG_TAG_QUAD_CROP, self.points.len());
        self.points.clear();
    }

    /// Bounding rectangle of the four corners, clamped to the source image.
    pub fn bounding_rect(&self) -> Result<PixelRect, CropError> {
        let [top_left, top_right, bottom_right, bottom_left] = match self.points.as_slice() {
            [a, b, c, d] => [*a, *b, *c, *d],
            _ => {
                return Err(CropError::IncompletePolygon {
                    points: self.points.len(),
                })
            }
        };

        let min_x = top_left.x.min(bottom_left.x);
        let max_x = top_right.x.max(bottom_right.x);
        let min_y = top_left.y.min(top_right.y);
        let max_y = bottom_right.y.max(bottom_left.y);

        let rect = PixelRect {
            left: clamp_to_pixels(min_x, self.source.width),
            top: clamp_to_pixels(min_y, self.source.height),
            right: clamp_to_pixels(max_x, self.source.width),
            bottom: clamp_to_pixels(max_y, self.source.height),
        };

        log::debug!(
            "{} corners x[{}, {}] y[{}, {}] -> {:?}",
            LOG_TAG_QUAD_CROP,
            min_x,
            max_x,
            min_y,
            max_y,
            rect
        );

        if rect.is_empty() {
            return Err(CropError::DegenerateCrop {
                width: rect.width(),
                height: rect.height(),
            });
        }

        Ok(rect)
    }

    pub fn crop(&self) -> Result<CaptureBuffer, CropError> {
        let rect = self.bounding_rect()?;

        let cropped = self
            .source
            .crop_region(rect.left, rect.top, rect.width(), rect.height())
            .map_err(|error| CropError::Image(error.to_string()))?;

        log::info!(
            "{} cropped {}x{} region at ({}, {})",
            LOG_TAG_QUAD_CROP,
            cropped.width,
            cropped.height,
            rect.left,
            rect.top
        );

        Ok(cropped)
    }
}

fn clamp_to_pixels(coordinate: f32, limit: u32) -> u32 {
    coordinate.floor().clamp(0.0, limit as f32) as u32
}
