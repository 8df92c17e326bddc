//! Incremental scanning and change detection.
//!
//! Signatures (mtime + size) of every supported file are persisted between
//! runs; diffing against the previous snapshot yields exactly the set of
//! files whose dates need (re-)resolution.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use recap_models::{is_supported_media, FileSignature};

use crate::error::PipelineResult;

/// Snapshot of file signatures, persisted as a JSON object
/// `path -> "<mtime>_<size>"`. Entirely replaced after each scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignatureStore(pub BTreeMap<PathBuf, FileSignature>);

impl SignatureStore {
    /// Load the previous snapshot. Missing or corrupt files load as empty:
    /// the worst case is a full re-resolution, never a wrong diff.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path).map_err(|e| e.to_string()).and_then(|s| {
            serde_json::from_str(&s).map_err(|e| e.to_string())
        }) {
            Ok(store) => store,
            Err(e) => {
                warn!("Could not load scan cache {}: {}. Rescanning everything.", path.display(), e);
                Self::default()
            }
        }
    }

    /// Persist this snapshot, replacing whatever was there.
    pub fn save(&self, path: impl AsRef<Path>) -> PipelineResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}

/// Result of diffing two signature snapshots. Unchanged files appear in none
/// of the sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanDiff {
    pub new: BTreeSet<PathBuf>,
    pub changed: BTreeSet<PathBuf>,
    pub deleted: BTreeSet<PathBuf>,
}

impl ScanDiff {
    /// Paths requiring date re-resolution and re-assignment.
    pub fn to_process(&self) -> BTreeSet<PathBuf> {
        self.new.union(&self.changed).cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.new.is_empty() && self.changed.is_empty() && self.deleted.is_empty()
    }
}

/// Classify files as new, changed, or deleted relative to a previous
/// snapshot.
pub fn diff(current: &SignatureStore, previous: &SignatureStore) -> ScanDiff {
    let mut result = ScanDiff::default();

    for (path, sig) in &current.0 {
        match previous.0.get(path) {
            None => {
                result.new.insert(path.clone());
            }
            Some(prev_sig) if prev_sig != sig => {
                result.changed.insert(path.clone());
            }
            Some(_) => {}
        }
    }

    for path in previous.0.keys() {
        if !current.0.contains_key(path) {
            result.deleted.insert(path.clone());
        }
    }

    result
}

/// Signatures of all supported media files at the top level of `dir`.
pub fn scan_folder(dir: impl AsRef<Path>) -> PipelineResult<SignatureStore> {
    let mut store = SignatureStore::default();

    for entry in WalkDir::new(dir.as_ref())
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() || !is_supported_media(path) {
            continue;
        }
        match FileSignature::of(path) {
            Ok(sig) => {
                store.0.insert(path.to_path_buf(), sig);
            }
            Err(e) => warn!("Could not stat {}: {}", path.display(), e),
        }
    }

    Ok(store)
}

/// Outcome of an incremental scan.
#[derive(Debug)]
pub struct ScanOutcome {
    /// Every supported file currently present, in path order
    pub all_files: Vec<PathBuf>,
    /// Files that are new or changed since the previous run
    pub to_process: BTreeSet<PathBuf>,
    /// Files present previously but gone now
    pub deleted: BTreeSet<PathBuf>,
}

/// Scan `input_dir`, diff against the persisted snapshot at `cache_path`,
/// then overwrite the snapshot with the current state.
pub fn incremental_scan(
    input_dir: impl AsRef<Path>,
    cache_path: impl AsRef<Path>,
) -> PipelineResult<ScanOutcome> {
    let current = scan_folder(input_dir)?;
    let previous = SignatureStore::load(&cache_path);
    let changes = diff(&current, &previous);

    info!(
        "Scan: {} files total, {} new, {} changed, {} deleted",
        current.0.len(),
        changes.new.len(),
        changes.changed.len(),
        changes.deleted.len()
    );
    for path in &changes.deleted {
        // Deleted files stay in the assignment store; pruning is a known gap
        debug!("Deleted since last run (still assigned): {}", path.display());
    }

    current.save(&cache_path)?;

    Ok(ScanOutcome {
        all_files: current.0.keys().cloned().collect(),
        to_process: changes.to_process(),
        deleted: changes.deleted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(mtime: u64, size: u64) -> FileSignature {
        FileSignature {
            mtime_secs: mtime,
            size,
        }
    }

    fn store(entries: &[(&str, FileSignature)]) -> SignatureStore {
        SignatureStore(
            entries
                .iter()
                .map(|(p, s)| (PathBuf::from(p), *s))
                .collect(),
        )
    }

    #[test]
    fn test_diff_classification() {
        let previous = store(&[("/m/a.jpg", sig(1, 10)), ("/m/b.jpg", sig(2, 20)), ("/m/c.jpg", sig(3, 30))]);
        let current = store(&[("/m/a.jpg", sig(1, 10)), ("/m/b.jpg", sig(5, 25)), ("/m/d.jpg", sig(4, 40))]);

        let d = diff(&current, &previous);
        assert_eq!(d.new, [PathBuf::from("/m/d.jpg")].into());
        assert_eq!(d.changed, [PathBuf::from("/m/b.jpg")].into());
        assert_eq!(d.deleted, [PathBuf::from("/m/c.jpg")].into());
    }

    #[test]
    fn test_diff_sets_are_disjoint() {
        let previous = store(&[("/m/a.jpg", sig(1, 10)), ("/m/b.jpg", sig(2, 20))]);
        let current = store(&[("/m/b.jpg", sig(9, 20)), ("/m/c.jpg", sig(3, 30))]);

        let d = diff(&current, &previous);
        assert!(d.new.is_disjoint(&d.changed));
        assert!(d.new.is_disjoint(&d.deleted));
        assert!(d.changed.is_disjoint(&d.deleted));

        // Everything in current but not in new/changed is unchanged
        for path in current.0.keys() {
            if !d.new.contains(path) && !d.changed.contains(path) {
                assert_eq!(previous.0.get(path), current.0.get(path));
            }
        }
    }

    #[test]
    fn test_identical_snapshots_diff_empty() {
        let s = store(&[("/m/a.jpg", sig(1, 10))]);
        assert!(diff(&s, &s).is_empty());
    }

    #[test]
    fn test_scan_folder_filters_and_skips_subdirs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("photo.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("clip.mp4"), b"xx").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"xxx").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested/deep.jpg"), b"y").unwrap();

        let store = scan_folder(dir.path()).unwrap();
        let names: Vec<_> = store
            .0
            .keys()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["clip.mp4", "photo.jpg"]);
    }

    #[test]
    fn test_incremental_scan_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let media = dir.path().join("media");
        std::fs::create_dir(&media).unwrap();
        let cache = dir.path().join("scan_cache.json");

        std::fs::write(media.join("a.jpg"), b"one").unwrap();

        let first = incremental_scan(&media, &cache).unwrap();
        assert_eq!(first.to_process.len(), 1);

        // Unchanged second run
        let second = incremental_scan(&media, &cache).unwrap();
        assert!(second.to_process.is_empty());
        assert_eq!(second.all_files.len(), 1);

        // Add a file, delete nothing
        std::fs::write(media.join("b.mp4"), b"two").unwrap();
        let third = incremental_scan(&media, &cache).unwrap();
        assert_eq!(third.to_process.len(), 1);
        assert!(third.deleted.is_empty());
    }

    #[test]
    fn test_corrupt_cache_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("scan_cache.json");
        std::fs::write(&cache, b"{not json").unwrap();
        assert!(SignatureStore::load(&cache).0.is_empty());
    }
}
