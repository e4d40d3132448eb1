use anyhow::Result;
use async_trait::async_trait;

use crate::core::models::CaptureBuffer;

/// A camera-like device that hands out one still per request.
#[async_trait]
pub trait CaptureSource: Send + Sync {
    /// `Ok(None)` means the device produced nothing (denied, unavailable, or no
    /// new frame).
    async fn capture_still(&self) -> Result<Option<CaptureBuffer>>;
}
