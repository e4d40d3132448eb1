pub const APPLICATION_NAME: &str = "Pet Food Scanner";
pub const APPLICATION_DIR_NAME: &str = "pet-food-scanner";

pub const LOG_TAG_APP: &str = "[APP]";
pub const LOG_TAG_CAPTURE: &str = "[CAPTURE]";
pub const LOG_TAG_WIZARD: &str = "[WIZARD]";
pub const LOG_TAG_QUAD_CROP: &str = "[QUAD_CROP]";
pub const LOG_TAG_ORCHESTRATOR: &str = "[ORCHESTRATOR]";

pub const DEFAULT_OCR_BASE_URL: &str = "https://dog-food-backend.onrender.com";
pub const DEFAULT_STORAGE_BASE_URL: &str = "https://dog-food-scanner.onrender.com";
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_CAPTURE_FOLDER_NAME: &str = "pet-food-scanner-captures";

pub const ENV_OCR_BASE_URL: &str = "PET_FOOD_SCANNER_OCR_URL";
pub const ENV_STORAGE_BASE_URL: &str = "PET_FOOD_SCANNER_STORAGE_URL";

pub const SETTINGS_FILE_NAME: &str = "settings.json";

pub const OCR_UPLOAD_PATH: &str = "/upload/";
pub const OCR_TABLE_MODE: &str = "feeding";
pub const STORAGE_ADD_PRODUCT_PATH: &str = "/add-product/";
pub const STORAGE_SEARCH_PATH: &str = "/search-products/";

pub const IMAGE_DATA_URL_PREFIX: &str = "data:image/png;base64,";

pub const TOTAL_STEP_COUNT: usize = 7;

pub const STARTUP_BANNER: &str = r#"
╔════════════════════════════════════════════════════════╗
║  Pet Food Scanner                                      ║
║                                                        ║
║  Drop photos into the capture folder, then type        ║
║  `capture`. Type `help` for all commands.              ║
║                                                        ║
╚════════════════════════════════════════════════════════╝
"#;
