pub mod sensitive;
pub mod types;

pub use sensitive::{MaskingError, Sanitized, placeholder_for, restore, sanitize};
pub use types::{AnalysisResult, Failure, Sensitive};
