mod http_ocr_service;
mod http_storage_service;

pub use http_ocr_service::HttpOcrService;
pub use http_storage_service::HttpStorageService;
