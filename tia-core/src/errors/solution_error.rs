//! Solution and project model errors.

/// Errors from solution/project manifest parsing and dependency ordering.
#[derive(Debug, thiserror::Error)]
pub enum SolutionError {
    #[error("solution or project file not found: {path}")]
    NotFound { path: String },

    #[error("malformed manifest {path}: {message}")]
    Manifest { path: String, message: String },

    /// Fatal for the whole-graph build; the cycle members are reported in
    /// discovery order.
    #[error("circular project dependency: {}", cycle.join(" -> "))]
    CircularDependency { cycle: Vec<String> },

    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
