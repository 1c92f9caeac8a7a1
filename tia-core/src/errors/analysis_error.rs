//! Top-level analysis errors.

use super::{
    CacheError, ConfigError, DiffError, GraphError, IndexError, SemanticError,
    SolutionError,
};

/// Errors that can surface from a top-level analysis request.
/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("solution error: {0}")]
    Solution(#[from] SolutionError),

    #[error("index error: {0}")]
    Index(#[from] IndexError),

    #[error("semantic error: {0}")]
    Semantic(#[from] SemanticError),

    #[error("call graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("diff error: {0}")]
    Diff(#[from] DiffError),

    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("analysis cancelled")]
    Cancelled,
}
