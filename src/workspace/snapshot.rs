//! Workspace snapshots: per-file digests and sizes at one point in time

use crate::workspace::hash::{hash_file, FileHash};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use tracing::debug;

/// Immutable view of a set of files' content
///
/// `files` and `sizes` always share the same key set and `total_bytes` is
/// the sum of `sizes`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    files: BTreeMap<String, String>,
    sizes: BTreeMap<String, u64>,
    total_bytes: u64,
}

impl Snapshot {
    /// Create an empty snapshot
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a snapshot from `(path, hash)` records; later duplicates win
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = (String, FileHash)>,
    {
        let mut files = BTreeMap::new();
        let mut sizes = BTreeMap::new();

        for (path, hash) in records {
            files.insert(path.clone(), hash.digest);
            sizes.insert(path, hash.size);
        }

        let total_bytes = sizes.values().sum();
        Self {
            files,
            sizes,
            total_bytes,
        }
    }

    /// Path to hex digest
    pub fn files(&self) -> &BTreeMap<String, String> {
        &self.files
    }

    /// Path to byte size
    pub fn sizes(&self) -> &BTreeMap<String, u64> {
        &self.sizes
    }

    /// Sum of all file sizes
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Number of files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// What happened to one requested path during a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Hashed and recorded in the snapshot
    Included { size: u64, digest: String },
    /// Path no longer exists under the root
    SkippedMissing,
    /// Path exists but could not be read
    SkippedUnreadable { reason: String },
}

impl ScanOutcome {
    /// Whether the path made it into the snapshot
    pub fn is_included(&self) -> bool {
        matches!(self, Self::Included { .. })
    }
}

/// Result of scanning a file list: the snapshot plus a per-path account
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Snapshot of every included path
    pub snapshot: Snapshot,
    /// Outcome for each requested path, in request order
    pub outcomes: Vec<(String, ScanOutcome)>,
}

impl ScanReport {
    /// Paths omitted from the snapshot, with their outcome
    pub fn skipped(&self) -> impl Iterator<Item = (&str, &ScanOutcome)> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| !outcome.is_included())
            .map(|(path, outcome)| (path.as_str(), outcome))
    }
}

/// Snapshot `paths` (relative to `root`)
///
/// Paths that vanished or cannot be read are left out of the snapshot and
/// reported as skipped; they never abort the scan.
pub fn snapshot(root: &Path, paths: &[String]) -> ScanReport {
    snapshot_with_progress(root, paths, &|| {})
}

/// Like [`snapshot`], calling `on_file` once per processed path
///
/// Files are hashed in parallel on the rayon pool; results are gathered
/// into the snapshot only after every worker has finished.
pub fn snapshot_with_progress(
    root: &Path,
    paths: &[String],
    on_file: &(dyn Fn() + Sync),
) -> ScanReport {
    let outcomes: Vec<(String, ScanOutcome)> = paths
        .par_iter()
        .map(|rel| {
            let outcome = scan_one(root, rel);
            on_file();
            (rel.clone(), outcome)
        })
        .collect();

    let snapshot = Snapshot::from_records(outcomes.iter().filter_map(|(path, outcome)| {
        match outcome {
            ScanOutcome::Included { size, digest } => Some((
                path.clone(),
                FileHash {
                    digest: digest.clone(),
                    size: *size,
                },
            )),
            _ => None,
        }
    }));

    let skipped = outcomes.len() - snapshot.len();
    debug!(
        "Scanned {} files ({} bytes), skipped {}",
        snapshot.len(),
        snapshot.total_bytes(),
        skipped
    );

    ScanReport { snapshot, outcomes }
}

fn scan_one(root: &Path, rel: &str) -> ScanOutcome {
    let full = root.join(rel);

    match full.metadata() {
        Ok(meta) if !meta.is_file() => {
            return ScanOutcome::SkippedUnreadable {
                reason: "not a regular file".to_string(),
            }
        }
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => return ScanOutcome::SkippedMissing,
        Err(e) => {
            return ScanOutcome::SkippedUnreadable {
                reason: e.to_string(),
            }
        }
    }

    match hash_file(&full) {
        Ok(hash) => ScanOutcome::Included {
            size: hash.size,
            digest: hash.digest,
        },
        // Deleted between the metadata check and the open
        Err(e) if e.kind() == io::ErrorKind::NotFound => ScanOutcome::SkippedMissing,
        Err(e) => {
            debug!("Skipping unreadable file {}: {}", rel, e);
            ScanOutcome::SkippedUnreadable {
                reason: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn paths(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn snapshot_records_sizes_and_total() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "hello").unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/lib.rs"), "fn main() {}").unwrap();

        let report = snapshot(dir.path(), &paths(&["a.txt", "src/lib.rs"]));
        let snap = report.snapshot;

        assert_eq!(snap.len(), 2);
        assert_eq!(snap.sizes()["a.txt"], 5);
        assert_eq!(snap.sizes()["src/lib.rs"], 12);
        assert_eq!(snap.total_bytes(), 17);
        assert_eq!(
            snap.files().keys().collect::<Vec<_>>(),
            snap.sizes().keys().collect::<Vec<_>>()
        );
    }

    #[test]
    fn missing_paths_are_skipped_not_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("kept.txt"), "x").unwrap();

        let report = snapshot(dir.path(), &paths(&["kept.txt", "gone.txt"]));

        assert_eq!(report.snapshot.len(), 1);
        let skipped: Vec<_> = report.skipped().collect();
        assert_eq!(skipped, vec![("gone.txt", &ScanOutcome::SkippedMissing)]);
    }

    #[test]
    fn directories_are_reported_unreadable() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        let report = snapshot(dir.path(), &paths(&["sub"]));

        assert!(report.snapshot.is_empty());
        assert!(matches!(
            report.outcomes[0].1,
            ScanOutcome::SkippedUnreadable { .. }
        ));
    }

    #[test]
    fn outcomes_keep_request_order() {
        let dir = TempDir::new().unwrap();
        let names: Vec<String> = (0..50).map(|i| format!("f{i:02}.txt")).collect();
        for name in &names {
            fs::write(dir.path().join(name), name).unwrap();
        }

        let report = snapshot(dir.path(), &names);
        let order: Vec<_> = report.outcomes.iter().map(|(p, _)| p.clone()).collect();

        assert_eq!(order, names);
        assert_eq!(report.snapshot.len(), 50);
    }

    #[test]
    fn progress_called_per_path() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a"), "1").unwrap();
        let counter = AtomicUsize::new(0);

        snapshot_with_progress(dir.path(), &paths(&["a", "b", "c"]), &|| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn rescanning_unchanged_tree_is_identical() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "same").unwrap();
        let list = paths(&["a.txt"]);

        assert_eq!(
            snapshot(dir.path(), &list).snapshot,
            snapshot(dir.path(), &list).snapshot
        );
    }
}
