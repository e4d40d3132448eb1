use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use serde_json::{json, Value};

use crate::core::interfaces::adapters::OcrService;
use crate::core::models::{CaptureBuffer, FeedingRow, OcrTableResult, OcrTextResult};
use crate::global_constants;

/// OCR over the scanner backend's `/upload/` endpoint, which takes the image as
/// a base64 data URL and answers with an `extracted_texts` object.
pub struct HttpOcrService {
    client: reqwest::Client,
    upload_url: String,
}

impl HttpOcrService {
    pub fn new(base_url: &str) -> Self {
        let upload_url = format!(
            "{}{}",
            base_url.trim_end_matches('/'),
            global_constants::OCR_UPLOAD_PATH
        );
        log::info!("[HTTP_OCR] Using OCR endpoint {}", upload_url);

        Self {
            client: reqwest::Client::new(),
            upload_url,
        }
    }

    fn build_data_url(image: &CaptureBuffer) -> Result<String> {
        let png = image
            .encode_png()
            .context("Failed to prepare image for OCR upload")?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(png);
        Ok(format!("{}{}", global_constants::IMAGE_DATA_URL_PREFIX, encoded))
    }

    async fn upload(&self, image: &CaptureBuffer, mode: Option<&str>) -> Result<Value> {
        log::debug!(
            "[HTTP_OCR] Uploading {}x{} image (mode {:?})",
            image.width,
            image.height,
            mode
        );

        let mut body = json!({ "imageUrl": Self::build_data_url(image)? });
        if let Some(mode) = mode {
            body["mode"] = Value::String(mode.to_string());
        }

        let response = self
            .client
            .post(&self.upload_url)
            .json(&body)
            .send()
            .await
            .context("OCR request failed")?
            .error_for_status()
            .context("OCR service rejected the image")?;

        let payload: Value = response
            .json()
            .await
            .context("OCR service returned invalid JSON")?;
        log::debug!("[HTTP_OCR] Response: {}", payload);

        Ok(payload)
    }
}

fn parse_text_response(payload: &Value) -> OcrTextResult {
    let text = payload["extracted_texts"]["productName"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    OcrTextResult { text }
}

/// The backend answers either with structured rows or with the raw text of the
/// table; anything else counts as no table.
fn parse_table_response(payload: &Value) -> Result<OcrTableResult> {
    match &payload["extracted_texts"]["feedingGuidelines"] {
        Value::Array(_) => {
            let rows: Vec<FeedingRow> =
                serde_json::from_value(payload["extracted_texts"]["feedingGuidelines"].clone())
                    .context("Feeding guideline rows have an unexpected shape")?;
            Ok(OcrTableResult { rows })
        }
        Value::String(text) => Ok(OcrTableResult::from_text(text)),
        _ => Ok(OcrTableResult::default()),
    }
}

#[async_trait]
impl OcrService for HttpOcrService {
    async fn extract_text(&self, image: &CaptureBuffer) -> Result<OcrTextResult> {
        log::info!("[HTTP_OCR] Starting text extraction");
        let payload = self.upload(image, None).await?;
        let result = parse_text_response(&payload);

        log::info!(
            "[HTTP_OCR] Text extraction complete. Extracted {} characters",
            result.text.len()
        );
        Ok(result)
    }

    async fn extract_table(&self, image: &CaptureBuffer) -> Result<OcrTableResult> {
        log::info!("[HTTP_OCR] Starting feeding table extraction");
        let payload = self
            .upload(image, Some(global_constants::OCR_TABLE_MODE))
            .await?;
        let result = parse_table_response(&payload)?;

        log::info!(
            "[HTTP_OCR] Table extraction complete. Found {} rows",
            result.rows.len()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::capture_buffer::gradient_buffer;

    #[test]
    fn test_new_builds_upload_url_without_double_slash() {
        let service = HttpOcrService::new("http://localhost:8000/");

        assert_eq!(service.upload_url, "http://localhost:8000/upload/");
    }

    #[test]
    fn test_data_url_carries_png_payload() {
        let data_url = HttpOcrService::build_data_url(&gradient_buffer(3, 3)).unwrap();

        assert!(data_url.starts_with("data:image/png;base64,iVBORw0KGgo"));
    }

    #[test]
    fn test_parse_text_response_reads_product_name_slot() {
        let payload = json!({ "extracted_texts": { "productName": "Acme\nDog Food" } });

        assert_eq!(parse_text_response(&payload).text, "Acme\nDog Food");
    }

    #[test]
    fn test_parse_text_response_without_text_is_empty() {
        assert_eq!(parse_text_response(&json!({})).text, "");
    }

    #[test]
    fn test_parse_table_response_reads_structured_rows() {
        let payload = json!({
            "extracted_texts": {
                "feedingGuidelines": [
                    { "weight": "5 kg", "amount": "100 g", "notes": "" },
                    { "weight": "10 kg", "amount": "170 g" }
                ]
            }
        });

        let table = parse_table_response(&payload).unwrap();

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], FeedingRow::new("10 kg", "170 g", ""));
    }

    #[test]
    fn test_parse_table_response_falls_back_to_text_rows() {
        let payload = json!({
            "extracted_texts": { "feedingGuidelines": "5 kg    100 g\n10 kg    170 g" }
        });

        let table = parse_table_response(&payload).unwrap();

        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn test_parse_table_response_with_blank_text_is_no_table() {
        let payload = json!({ "extracted_texts": { "feedingGuidelines": "" } });

        assert!(parse_table_response(&payload).unwrap().is_empty());
    }
}
