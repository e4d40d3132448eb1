use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: &'static str,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid product record: {}", describe_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            issues: vec![ValidationIssue::new(field, message)],
        }
    }

    #[cfg(test)]
    pub fn fields(&self) -> Vec<&'static str> {
        self.issues.iter().map(|issue| issue.field).collect()
    }
}

fn describe_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("{} {}", issue.field, issue.message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CropError {
    #[error("a crop needs exactly 4 points, {points} selected")]
    IncompletePolygon { points: usize },

    #[error("all 4 corner points are already selected")]
    TooManyPoints,

    #[error("selected corners enclose no area ({width}x{height})")]
    DegenerateCrop { width: u32, height: u32 },

    #[error("failed to copy crop region: {0}")]
    Image(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error("no image captured: {0}")]
    Capture(String),

    #[error("another request is still in flight")]
    Busy,

    #[error("`{action}` is not available while {state}")]
    InvalidTransition { action: &'static str, state: String },

    #[error(transparent)]
    Crop(#[from] CropError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to save product: {0}")]
    Submit(String),
}
