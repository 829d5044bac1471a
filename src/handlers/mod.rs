// Handler modules
pub mod analyze;
pub mod filters;

// Re-export all handler functions
pub use analyze::{build_analysis, handle_analyze, render_analysis};
pub use filters::handle_filters;
