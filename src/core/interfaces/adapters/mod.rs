mod ocr_service;
mod storage_service;

pub use ocr_service::OcrService;
pub use storage_service::StorageService;
