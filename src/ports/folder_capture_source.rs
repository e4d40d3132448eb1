use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::SystemTime;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::core::interfaces::ports::CaptureSource;
use crate::core::models::CaptureBuffer;
use crate::global_constants::LOG_TAG_CAPTURE;

const SUPPORTED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// Treats a folder as a camera roll: each capture takes the newest photo that
/// has not been handed out yet.
pub struct FolderCaptureSource {
    folder: PathBuf,
    consumed: Mutex<HashSet<PathBuf>>,
}

impl FolderCaptureSource {
    pub fn initialize(folder: PathBuf) -> Self {
        log::debug!("{} watching capture folder {:?}", LOG_TAG_CAPTURE, folder);
        Self {
            folder,
            consumed: Mutex::new(HashSet::new()),
        }
    }

    fn is_supported_image(path: &Path) -> bool {
        path.extension()
            .and_then(|extension| extension.to_str())
            .map(|extension| extension.to_ascii_lowercase())
            .map(|extension| SUPPORTED_EXTENSIONS.contains(&extension.as_str()))
            .unwrap_or(false)
    }

    fn is_consumed(&self, path: &Path) -> bool {
        self.consumed
            .lock()
            .map(|consumed| consumed.contains(path))
            .unwrap_or(false)
    }

    fn mark_consumed(&self, path: PathBuf) {
        if let Ok(mut consumed) = self.consumed.lock() {
            consumed.insert(path);
        }
    }

    async fn find_newest_unconsumed(&self) -> Result<Option<PathBuf>> {
        let mut entries = tokio::fs::read_dir(&self.folder)
            .await
            .with_context(|| format!("failed to read capture folder {:?}", self.folder))?;

        let mut newest: Option<(SystemTime, PathBuf)> = None;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !Self::is_supported_image(&path) || self.is_consumed(&path) {
                continue;
            }

            let modified = entry
                .metadata()
                .await
                .and_then(|metadata| metadata.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);

            let candidate = (modified, path);
            if newest.as_ref().map_or(true, |current| candidate > *current) {
                newest = Some(candidate);
            }
        }

        Ok(newest.map(|(_, path)| path))
    }

    async fn load_capture(path: &Path) -> Result<CaptureBuffer> {
        let encoded = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read photo {:?}", path))?;
        CaptureBuffer::from_encoded_bytes(&encoded)
            .with_context(|| format!("failed to decode photo {:?}", path))
    }
}

#[async_trait]
impl CaptureSource for FolderCaptureSource {
    async fn capture_still(&self) -> Result<Option<CaptureBuffer>> {
        if !self.folder.is_dir() {
            log::warn!(
                "{} capture folder {:?} is missing, no camera available",
                LOG_TAG_CAPTURE,
                self.folder
            );
            return Ok(None);
        }

        let Some(path) = self.find_newest_unconsumed().await? else {
            log::info!("{} no new photo in {:?}", LOG_TAG_CAPTURE, self.folder);
            return Ok(None);
        };

        // Each photo is handed out at most once, readable or not.
        self.mark_consumed(path.clone());
        let capture = match Self::load_capture(&path).await {
            Ok(capture) => capture,
            Err(error) => {
                log::warn!("{} skipping unreadable photo {:?}: {:#}", LOG_TAG_CAPTURE, path, error);
                return Err(error);
            }
        };

        log::info!(
            "{} captured {}x{} photo from {:?}",
            LOG_TAG_CAPTURE,
            capture.width,
            capture.height,
            path
        );
        Ok(Some(capture))
    }
}
