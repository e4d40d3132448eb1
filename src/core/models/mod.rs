pub(crate) mod capture_buffer;
mod crop_geometry;
mod errors;
mod field_kind;
mod ocr;
mod product_record;
mod user_settings;

pub use capture_buffer::CaptureBuffer;
pub use crop_geometry::{CropPoint, DisplayViewport, PixelRect};
pub use errors::{CropError, ValidationError, ValidationIssue, WizardError};
pub use field_kind::{FieldKind, WizardStep};
pub use ocr::{OcrTableResult, OcrTextResult};
pub use product_record::{FeedingRow, FoodForm, ProductRecord, ProductType, StoredProduct};
pub use user_settings::ScannerSettings;
