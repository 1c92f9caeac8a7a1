//! Cache contract errors.

/// Errors from a cache provider. Any entry may be absent without
/// correctness loss, so these only surface from snapshot persistence.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("snapshot store failure: {message}")]
    Snapshot { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
