//! Diff parser errors.

/// Errors acquiring diff input. Malformed diff lines are never errors; the
/// parser skips them with a warning.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    #[error("diff file not found: {path}")]
    NotFound { path: String },

    #[error("io error reading diff: {0}")]
    Io(#[from] std::io::Error),

    #[error("diff command `{command}` failed: {message}")]
    Command { command: String, message: String },
}
