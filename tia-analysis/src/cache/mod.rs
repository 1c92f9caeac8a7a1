//! Cache contract implementations.
//!
//! In-memory by default; every algorithm also stays correct behind the
//! no-op cache, which stores nothing.

pub mod memory;
pub mod noop;
pub mod snapshot;

pub use memory::MemoryCache;
pub use noop::NoopCache;
pub use snapshot::{detect_changes, fingerprint_solution, MemorySnapshotStore};
