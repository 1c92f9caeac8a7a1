//! The cache contract.
//!
//! The engine talks to persistence only through these capabilities. Every
//! algorithm remains correct when backed by a cache that stores nothing.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::CacheError;
use crate::types::collections::FxHashMap;

/// Atomic get-or-compute cache keyed by `K`.
///
/// Implementations may compute twice under contention; compute must be
/// idempotent. `clear_all` drops every entry.
pub trait KeyedCache<K, V>: Send + Sync {
    /// Return the cached value for `key`, computing and storing it via
    /// `factory` on a miss.
    fn get_or_compute(&self, key: K, factory: &mut dyn FnMut() -> V) -> V;

    /// Drop all cached entries.
    fn clear_all(&self);
}

/// Content-derived fingerprint of one tracked file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFingerprint {
    pub mtime_secs: i64,
    pub mtime_nanos: u32,
    pub file_size: u64,
    pub content_hash: u64,
}

/// Opaque fingerprint of a solution's tracked files at one point in time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolutionSnapshot {
    pub solution_path: PathBuf,
    pub files: FxHashMap<PathBuf, FileFingerprint>,
}

/// Result of comparing the current tree against the last saved snapshot.
#[derive(Debug, Clone, Default)]
pub struct ChangeReport {
    pub has_changes: bool,
    pub reason: String,
    pub added: Vec<PathBuf>,
    pub modified: Vec<PathBuf>,
    pub deleted: Vec<PathBuf>,
}

/// Persistence for solution snapshots. Saving must be atomic: a reader
/// observes either the previous snapshot or the new one, never a blend.
pub trait SnapshotStore: Send + Sync {
    fn save(&self, snapshot: &SolutionSnapshot) -> Result<(), CacheError>;
    fn load(&self) -> Result<Option<SolutionSnapshot>, CacheError>;
    fn clear(&self) -> Result<(), CacheError>;
}
