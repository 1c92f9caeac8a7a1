//! Cross-cutting traits: cancellation and the cache contract.

pub mod cache;
pub mod cancellation;

pub use cache::{ChangeReport, FileFingerprint, KeyedCache, SnapshotStore, SolutionSnapshot};
pub use cancellation::{Cancellable, CancellationToken};
