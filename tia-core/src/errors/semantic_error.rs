//! Semantic layer errors.

/// Errors from parsing and semantic model construction.
#[derive(Debug, thiserror::Error)]
pub enum SemanticError {
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("file is not part of the compilation: {path}")]
    FileNotFound { path: String },

    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
