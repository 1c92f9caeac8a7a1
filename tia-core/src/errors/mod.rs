//! Error handling for TIA.
//!
//! Each subsystem owns one `thiserror` enum; `AnalysisError` aggregates
//! them at the request boundary. Library code never reaches for `anyhow`.

pub mod analysis_error;
pub mod cache_error;
pub mod config_error;
pub mod diff_error;
pub mod error_code;
pub mod graph_error;
pub mod index_error;
pub mod semantic_error;
pub mod solution_error;

pub use analysis_error::AnalysisError;
pub use error_code::TiaErrorCode;
pub use cache_error::CacheError;
pub use config_error::ConfigError;
pub use diff_error::DiffError;
pub use graph_error::GraphError;
pub use index_error::IndexError;
pub use semantic_error::SemanticError;
pub use solution_error::SolutionError;
