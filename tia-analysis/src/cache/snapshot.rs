//! Solution snapshots and change detection.
//!
//! Two-level comparison: mtime plus size first, content hash (xxh3) only
//! when the cheap check disagrees. The snapshot is an opaque fingerprint
//! of the solution's tracked files.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tia_core::errors::CacheError;
use tia_core::traits::{ChangeReport, FileFingerprint, SnapshotStore, SolutionSnapshot};
use tracing::debug;
use xxhash_rust::xxh3::xxh3_64;

use crate::solution::SolutionInfo;

/// Fingerprint every source file of a solution.
pub fn fingerprint_solution(solution: &SolutionInfo) -> SolutionSnapshot {
    let mut snapshot = SolutionSnapshot {
        solution_path: solution.path.clone(),
        ..Default::default()
    };

    for file in solution.source_files() {
        match fingerprint_file(file) {
            Ok(fp) => {
                snapshot.files.insert(file.to_path_buf(), fp);
            }
            Err(e) => {
                debug!(file = %file.display(), "unreadable file left out of snapshot: {e}");
            }
        }
    }
    snapshot
}

fn fingerprint_file(path: &Path) -> std::io::Result<FileFingerprint> {
    let metadata = std::fs::metadata(path)?;
    let (mtime_secs, mtime_nanos) = mtime_parts(&metadata.modified()?);
    let content = std::fs::read(path)?;
    Ok(FileFingerprint {
        mtime_secs,
        mtime_nanos,
        file_size: metadata.len(),
        content_hash: xxh3_64(&content),
    })
}

/// Compare the current tree against the last saved snapshot.
///
/// Level 1 is mtime plus size; a mismatch escalates to the content hash,
/// so a rewritten-but-identical file does not count as modified.
pub fn detect_changes(previous: &SolutionSnapshot, current: &SolutionSnapshot) -> ChangeReport {
    let mut report = ChangeReport::default();

    for (path, fp) in &current.files {
        match previous.files.get(path) {
            None => report.added.push(path.clone()),
            Some(old) => {
                let cheap_match = old.mtime_secs == fp.mtime_secs
                    && old.mtime_nanos == fp.mtime_nanos
                    && old.file_size == fp.file_size;
                if !cheap_match && old.content_hash != fp.content_hash {
                    report.modified.push(path.clone());
                }
            }
        }
    }
    for path in previous.files.keys() {
        if !current.files.contains_key(path) {
            report.deleted.push(path.clone());
        }
    }

    report.added.sort();
    report.modified.sort();
    report.deleted.sort();
    report.has_changes =
        !report.added.is_empty() || !report.modified.is_empty() || !report.deleted.is_empty();
    report.reason = if report.has_changes {
        format!(
            "{} added, {} modified, {} deleted",
            report.added.len(),
            report.modified.len(),
            report.deleted.len()
        )
    } else {
        "no tracked file changed".to_string()
    };
    report
}

/// Snapshot store holding at most one snapshot in memory. Saving swaps
/// the whole value under a lock, so readers never observe a blend.
#[derive(Default)]
pub struct MemorySnapshotStore {
    snapshot: Mutex<Option<SolutionSnapshot>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn save(&self, snapshot: &SolutionSnapshot) -> Result<(), CacheError> {
        let mut guard = self.snapshot.lock().map_err(|e| CacheError::Snapshot {
            message: e.to_string(),
        })?;
        *guard = Some(snapshot.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<SolutionSnapshot>, CacheError> {
        let guard = self.snapshot.lock().map_err(|e| CacheError::Snapshot {
            message: e.to_string(),
        })?;
        Ok(guard.clone())
    }

    fn clear(&self) -> Result<(), CacheError> {
        let mut guard = self.snapshot.lock().map_err(|e| CacheError::Snapshot {
            message: e.to_string(),
        })?;
        *guard = None;
        Ok(())
    }
}

fn mtime_parts(mtime: &std::time::SystemTime) -> (i64, u32) {
    match mtime.duration_since(std::time::UNIX_EPOCH) {
        Ok(d) => (d.as_secs() as i64, d.subsec_nanos()),
        Err(_) => (0, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tia_core::types::collections::FxHashMap;

    fn fp(hash: u64) -> FileFingerprint {
        FileFingerprint {
            mtime_secs: 100,
            mtime_nanos: 0,
            file_size: 10,
            content_hash: hash,
        }
    }

    fn snapshot(files: &[(&str, FileFingerprint)]) -> SolutionSnapshot {
        let mut map = FxHashMap::default();
        for (path, fingerprint) in files {
            map.insert(PathBuf::from(path), fingerprint.clone());
        }
        SolutionSnapshot {
            solution_path: PathBuf::from("App.sln"),
            files: map,
        }
    }

    #[test]
    fn identical_snapshots_report_no_changes() {
        let a = snapshot(&[("a.cs", fp(1))]);
        let report = detect_changes(&a, &a.clone());
        assert!(!report.has_changes);
        assert_eq!(report.reason, "no tracked file changed");
    }

    #[test]
    fn add_modify_delete_all_detected() {
        let old = snapshot(&[("kept.cs", fp(1)), ("gone.cs", fp(2)), ("edited.cs", fp(3))]);
        let mut edited = fp(4);
        edited.mtime_secs = 200;
        let new = snapshot(&[("kept.cs", fp(1)), ("new.cs", fp(5)), ("edited.cs", edited)]);

        let report = detect_changes(&old, &new);
        assert!(report.has_changes);
        assert_eq!(report.added, vec![PathBuf::from("new.cs")]);
        assert_eq!(report.modified, vec![PathBuf::from("edited.cs")]);
        assert_eq!(report.deleted, vec![PathBuf::from("gone.cs")]);
    }

    #[test]
    fn touched_but_identical_content_is_not_modified() {
        let old = snapshot(&[("a.cs", fp(1))]);
        let mut touched = fp(1);
        touched.mtime_secs = 999;
        let new = snapshot(&[("a.cs", touched)]);

        let report = detect_changes(&old, &new);
        assert!(!report.has_changes);
    }

    #[test]
    fn store_roundtrip_and_clear() {
        let store = MemorySnapshotStore::new();
        assert!(store.load().unwrap().is_none());

        let snap = snapshot(&[("a.cs", fp(1))]);
        store.save(&snap).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.files.len(), 1);

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
