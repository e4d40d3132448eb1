pub mod capture_wizard;
pub mod quad_cropper;
mod scan_orchestrator;

pub use capture_wizard::{
    CaptureSessionState, CaptureWizard, ReviewEdit, SessionMode, WizardEffect, WizardMessage,
};
pub use quad_cropper::QuadCropSession;
pub use scan_orchestrator::ScanOrchestrator;
