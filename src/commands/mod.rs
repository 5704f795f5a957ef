pub mod analyze;
pub mod serve;

// Re-export command functions for convenience
pub use analyze::{analyze, AnalyzeParams};
pub use serve::serve;
