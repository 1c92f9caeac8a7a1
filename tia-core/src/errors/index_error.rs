//! Symbol index errors.

/// Errors from symbol index construction.
///
/// Index queries never error: querying an unbuilt index logs a warning and
/// returns empty results, and individual file failures are logged and
/// skipped during the build.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("no input to index: neither solution, project, nor directory was usable")]
    NoInput,

    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
