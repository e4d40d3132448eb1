use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::core::interfaces::adapters::StorageService;
use crate::core::models::{ProductRecord, StoredProduct};
use crate::global_constants;

pub struct HttpStorageService {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    products: Vec<StoredProduct>,
}

impl HttpStorageService {
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        log::info!("[HTTP_STORAGE] Using storage backend {}", base_url);

        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    fn add_product_url(&self) -> String {
        format!("{}{}", self.base_url, global_constants::STORAGE_ADD_PRODUCT_PATH)
    }

    fn search_url(&self, name_prefix: &str) -> String {
        format!(
            "{}{}?query={}",
            self.base_url,
            global_constants::STORAGE_SEARCH_PATH,
            urlencoding::encode(name_prefix)
        )
    }
}

#[async_trait]
impl StorageService for HttpStorageService {
    async fn save_product(&self, record: &ProductRecord) -> Result<()> {
        log::info!(
            "[HTTP_STORAGE] Saving product {:?} ({} feeding rows, table image: {})",
            record.product_name,
            record.feeding_guidelines.len(),
            record.feeding_guidelines_image.is_some()
        );

        let body = serde_json::to_value(record).context("Failed to serialize product record")?;

        let response = self
            .client
            .post(self.add_product_url())
            .json(&body)
            .send()
            .await
            .context("Save request failed")?
            .error_for_status()
            .context("Storage backend rejected the product")?;

        let response_text = response.text().await.unwrap_or_default();
        log::debug!("[HTTP_STORAGE] Save response: {}", response_text);

        Ok(())
    }

    async fn search_products(&self, name_prefix: &str) -> Result<Vec<StoredProduct>> {
        let url = self.search_url(name_prefix);
        log::debug!("[HTTP_STORAGE] Search URL: {}", url);

        let response: SearchResponse = self
            .client
            .get(url)
            .send()
            .await
            .context("Search request failed")?
            .error_for_status()
            .context("Storage backend rejected the search")?
            .json()
            .await
            .context("Search response was not valid JSON")?;

        Ok(response.products)
    }
}
