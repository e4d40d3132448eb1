use anyhow::Result;
use async_trait::async_trait;

use crate::core::models::{ProductRecord, StoredProduct};

#[async_trait]
pub trait StorageService: Send + Sync {
    async fn save_product(&self, record: &ProductRecord) -> Result<()>;

    async fn search_products(&self, name_prefix: &str) -> Result<Vec<StoredProduct>>;
}
