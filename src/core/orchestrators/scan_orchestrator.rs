use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::core::interfaces::adapters::{OcrService, StorageService};
use crate::core::interfaces::ports::CaptureSource;
use crate::core::models::{StoredProduct, WizardError};
use crate::core::orchestrators::{CaptureWizard, WizardEffect, WizardMessage};
use crate::global_constants::LOG_TAG_ORCHESTRATOR;

/// Runs a [`CaptureWizard`] against the real collaborators: every effect the
/// wizard asks for is performed, bounded by the request timeout, and its
/// outcome fed back as the matching result message.
pub struct ScanOrchestrator {
    wizard: CaptureWizard,
    capture_source: Arc<dyn CaptureSource>,
    ocr_service: Arc<dyn OcrService>,
    storage_service: Arc<dyn StorageService>,
    request_timeout: Duration,
}

impl ScanOrchestrator {
    pub fn build(
        capture_source: Arc<dyn CaptureSource>,
        ocr_service: Arc<dyn OcrService>,
        storage_service: Arc<dyn StorageService>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            wizard: CaptureWizard::new(),
            capture_source,
            ocr_service,
            storage_service,
            request_timeout,
        }
    }

    pub fn wizard(&self) -> &CaptureWizard {
        &self.wizard
    }

    pub async fn dispatch(&mut self, message: WizardMessage) -> Result<(), WizardError> {
        let mut next_effect = self.wizard.update(message)?;

        while let Some(effect) = next_effect {
            let result_message = self.perform_effect(effect).await;
            next_effect = self.wizard.update(result_message)?;
        }

        Ok(())
    }

    pub async fn search_products(&self, name_prefix: &str) -> anyhow::Result<Vec<StoredProduct>> {
        log::info!("{} Searching products for {:?}", LOG_TAG_ORCHESTRATOR, name_prefix);
        let products = self.storage_service.search_products(name_prefix).await?;
        log::debug!("{} Found {} products", LOG_TAG_ORCHESTRATOR, products.len());
        Ok(products)
    }

    async fn perform_effect(&self, effect: WizardEffect) -> WizardMessage {
        log::debug!("{} Performing {:?}", LOG_TAG_ORCHESTRATOR, effect);

        match effect {
            WizardEffect::RequestCapture(token) => {
                let result = self
                    .run_with_timeout("capture", self.capture_source.capture_still())
                    .await;
                WizardMessage::CaptureCompleted(token, result)
            }
            WizardEffect::ExtractText(token, image) => {
                let result = self
                    .run_with_timeout("text OCR", self.ocr_service.extract_text(&image))
                    .await;
                WizardMessage::TextExtracted(token, result)
            }
            WizardEffect::ExtractTable(token, image) => {
                let result = self
                    .run_with_timeout("table OCR", self.ocr_service.extract_table(&image))
                    .await;
                WizardMessage::TableExtracted(token, result)
            }
            WizardEffect::SaveRecord(token, record) => {
                let result = self
                    .run_with_timeout("save", self.storage_service.save_product(&record))
                    .await;
                WizardMessage::SubmitCompleted(token, result)
            }
        }
    }

    async fn run_with_timeout<T>(
        &self,
        label: &str,
        call: impl Future<Output = anyhow::Result<T>>,
    ) -> Result<T, String> {
        match tokio::time::timeout(self.request_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(error)) => {
                log::error!("{} {} failed: {:#}", LOG_TAG_ORCHESTRATOR, label, error);
                Err(format!("{:#}", error))
            }
            Err(_) => {
                log::error!(
                    "{} {} timed out after {:?}",
                    LOG_TAG_ORCHESTRATOR,
                    label,
                    self.request_timeout
                );
                Err(format!("{} timed out after {:?}", label, self.request_timeout))
            }
        }
    }
}
