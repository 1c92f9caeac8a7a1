//! Call graph errors.

/// Errors from call graph construction.
///
/// Per-file parse or resolution failures are demoted to debug logs and the
/// file contributes no edges; only build-level failures surface here.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("graph build failed: {message}")]
    Build { message: String },

    #[error("unknown method: {method_id}")]
    UnknownMethod { method_id: String },
}
