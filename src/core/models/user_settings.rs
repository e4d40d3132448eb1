use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::global_constants;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannerSettings {
    pub ocr_base_url: String,
    pub storage_base_url: String,
    pub capture_folder: PathBuf,
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

fn default_request_timeout_seconds() -> u64 {
    global_constants::DEFAULT_REQUEST_TIMEOUT_SECONDS
}

impl Default for ScannerSettings {
    fn default() -> Self {
        let capture_root = dirs::picture_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(std::env::temp_dir);

        Self {
            ocr_base_url: global_constants::DEFAULT_OCR_BASE_URL.to_string(),
            storage_base_url: global_constants::DEFAULT_STORAGE_BASE_URL.to_string(),
            capture_folder: capture_root.join(global_constants::DEFAULT_CAPTURE_FOLDER_NAME),
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }
}

impl ScannerSettings {
    /// Loads settings from the user config directory, writing defaults on first
    /// run, then applies environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let settings_path = Self::get_settings_file_path()?;
        let mut settings = Self::load_from_path(&settings_path)?;
        settings.apply_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    pub fn load_from_path(settings_path: &Path) -> anyhow::Result<Self> {
        if !settings_path.exists() {
            log::info!("[SETTINGS] No settings file found, using defaults");
            let default_settings = Self::default();
            default_settings.save_to_path(settings_path)?;
            return Ok(default_settings);
        }

        let contents = std::fs::read_to_string(settings_path)?;
        let settings: ScannerSettings = serde_json::from_str(&contents)?;

        log::info!("[SETTINGS] Loaded settings from {:?}", settings_path);
        log::debug!("[SETTINGS] OCR URL: {}", settings.ocr_base_url);
        log::debug!("[SETTINGS] Storage URL: {}", settings.storage_base_url);
        log::debug!("[SETTINGS] Capture folder: {:?}", settings.capture_folder);

        Ok(settings)
    }

    pub fn save_to_path(&self, settings_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = settings_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(settings_path, contents)?;

        log::info!("[SETTINGS] Saved settings to {:?}", settings_path);
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds.max(1))
    }

    pub(crate) fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(global_constants::ENV_OCR_BASE_URL) {
            log::info!("[SETTINGS] OCR URL overridden from environment");
            self.ocr_base_url = url;
        }
        if let Some(url) = lookup(global_constants::ENV_STORAGE_BASE_URL) {
            log::info!("[SETTINGS] Storage URL overridden from environment");
            self.storage_base_url = url;
        }
    }

    fn get_settings_file_path() -> anyhow::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join(global_constants::APPLICATION_DIR_NAME);

        Ok(config_dir.join(global_constants::SETTINGS_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scanner_settings_default_values() {
        let settings = ScannerSettings::default();

        assert_eq!(settings.ocr_base_url, global_constants::DEFAULT_OCR_BASE_URL);
        assert_eq!(
            settings.storage_base_url,
            global_constants::DEFAULT_STORAGE_BASE_URL
        );
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
        assert!(settings
            .capture_folder
            .ends_with(global_constants::DEFAULT_CAPTURE_FOLDER_NAME));
    }

    #[test]
    fn test_deserialization_with_missing_timeout_uses_default() {
        let json = r#"{
            "ocr_base_url": "http://localhost:8000",
            "storage_base_url": "http://localhost:8001",
            "capture_folder": "/tmp/captures"
        }"#;

        let settings: ScannerSettings = serde_json::from_str(json).unwrap();

        assert_eq!(
            settings.request_timeout_seconds,
            global_constants::DEFAULT_REQUEST_TIMEOUT_SECONDS
        );
    }

    #[test]
    fn test_environment_overrides_replace_urls() {
        let mut settings = ScannerSettings::default();

        settings.apply_overrides(|key| match key {
            global_constants::ENV_OCR_BASE_URL => Some("http://ocr.local".to_string()),
            _ => None,
        });

        assert_eq!(settings.ocr_base_url, "http://ocr.local");
        assert_eq!(
            settings.storage_base_url,
            global_constants::DEFAULT_STORAGE_BASE_URL
        );
    }

    #[test]
    fn test_settings_save_and_load_roundtrip() {
        let temp_dir = std::env::temp_dir().join("pet-food-scanner-settings-test");
        let settings_path = temp_dir.join("settings.json");
        std::fs::remove_dir_all(&temp_dir).ok();

        let original_settings = ScannerSettings {
            ocr_base_url: "http://localhost:9000".to_string(),
            storage_base_url: "http://localhost:9001".to_string(),
            capture_folder: PathBuf::from("/tmp/roll"),
            request_timeout_seconds: 5,
        };
        original_settings.save_to_path(&settings_path).unwrap();

        let loaded_settings = ScannerSettings::load_from_path(&settings_path).unwrap();

        assert_eq!(loaded_settings, original_settings);

        std::fs::remove_dir_all(&temp_dir).ok();
    }

    #[test]
    fn test_load_from_missing_path_writes_defaults() {
        let temp_dir = std::env::temp_dir().join("pet-food-scanner-settings-defaults-test");
        let settings_path = temp_dir.join("settings.json");
        std::fs::remove_dir_all(&temp_dir).ok();

        let loaded_settings = ScannerSettings::load_from_path(&settings_path).unwrap();

        assert_eq!(loaded_settings, ScannerSettings::default());
        assert!(settings_path.exists());

        std::fs::remove_dir_all(&temp_dir).ok();
    }
}
