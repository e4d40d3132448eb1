use anyhow::{Context, Result};
use image::{DynamicImage, ImageFormat, RgbaImage};

const BYTES_PER_PIXEL: u32 = 4;

/// An owned RGBA8 still, as produced by a capture source or a crop.
#[derive(Clone, PartialEq, Eq)]
pub struct CaptureBuffer {
    pub width: u32,
    pub height: u32,
    raw_data: Vec<u8>,
}

impl std::fmt::Debug for CaptureBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.raw_data.len())
            .finish()
    }
}

impl CaptureBuffer {
    pub fn build_from_raw_data(
        width_pixels: u32,
        height_pixels: u32,
        raw_rgba_data: Vec<u8>,
    ) -> Result<Self> {
        let expected_len = (width_pixels * height_pixels * BYTES_PER_PIXEL) as usize;
        if raw_rgba_data.len() != expected_len {
            anyhow::bail!(
                "RGBA data has {} bytes, expected {} for {}x{}",
                raw_rgba_data.len(),
                expected_len,
                width_pixels,
                height_pixels
            );
        }

        log::debug!(
            "[CAPTURE_BUFFER] building buffer: {}x{}",
            width_pixels,
            height_pixels
        );

        Ok(Self {
            width: width_pixels,
            height: height_pixels,
            raw_data: raw_rgba_data,
        })
    }

    /// Decodes a PNG/JPEG/... file body into an RGBA buffer.
    pub fn from_encoded_bytes(encoded: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory(encoded).context("Failed to decode image bytes")?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::build_from_raw_data(width, height, rgba.into_raw())
    }

    pub fn to_dynamic_image(&self) -> Result<DynamicImage> {
        let rgba = RgbaImage::from_raw(self.width, self.height, self.raw_data.clone())
            .ok_or_else(|| anyhow::anyhow!("Failed to create image from raw data"))?;
        Ok(DynamicImage::ImageRgba8(rgba))
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut encoded = Vec::new();
        self.to_dynamic_image()?
            .write_to(&mut std::io::Cursor::new(&mut encoded), ImageFormat::Png)
            .context("Failed to encode image as PNG")?;
        Ok(encoded)
    }

    #[cfg(test)]
    pub fn pixel_at(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = ((y * self.width + x) * BYTES_PER_PIXEL) as usize;
        let pixel = self.raw_data.get(start..start + BYTES_PER_PIXEL as usize)?;
        Some([pixel[0], pixel[1], pixel[2], pixel[3]])
    }

    /// Copies the `crop_width` x `crop_height` block at (`x`, `y`) row by row.
    /// The block must lie entirely inside the buffer.
    pub fn crop_region(&self, x: u32, y: u32, crop_width: u32, crop_height: u32) -> Result<Self> {
        if crop_width == 0 || crop_height == 0 {
            anyhow::bail!("Crop dimensions must be greater than zero");
        }

        if x + crop_width > self.width || y + crop_height > self.height {
            anyhow::bail!(
                "Crop region {}x{} at ({}, {}) exceeds image bounds {}x{}",
                crop_width,
                crop_height,
                x,
                y,
                self.width,
                self.height
            );
        }

        log::debug!(
            "[CAPTURE_BUFFER] Cropping region: {}x{} at ({}, {}) from {}x{}",
            crop_width,
            crop_height,
            x,
            y,
            self.width,
            self.height
        );

        let mut cropped_data =
            Vec::with_capacity((crop_width * crop_height * BYTES_PER_PIXEL) as usize);

        for row in y..(y + crop_height) {
            let row_start = ((row * self.width + x) * BYTES_PER_PIXEL) as usize;
            let row_end = row_start + (crop_width * BYTES_PER_PIXEL) as usize;
            cropped_data.extend_from_slice(&self.raw_data[row_start..row_end]);
        }

        Self::build_from_raw_data(crop_width, crop_height, cropped_data)
    }
}

#[cfg(test)]
pub(crate) fn gradient_buffer(width: u32, height: u32) -> CaptureBuffer {
    let mut raw = Vec::with_capacity((width * height * BYTES_PER_PIXEL) as usize);
    for y in 0..height {
        for x in 0..width {
            raw.extend_from_slice(&[(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255]);
        }
    }
    CaptureBuffer::build_from_raw_data(width, height, raw).unwrap()
}
