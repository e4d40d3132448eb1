use anyhow::Result;
use async_trait::async_trait;

use crate::core::models::{CaptureBuffer, OcrTableResult, OcrTextResult};

#[async_trait]
pub trait OcrService: Send + Sync {
    async fn extract_text(&self, image: &CaptureBuffer) -> Result<OcrTextResult>;

    /// An empty result means no table was found and is not an error.
    async fn extract_table(&self, image: &CaptureBuffer) -> Result<OcrTableResult>;
}
