//! Rendered clip cache.
//!
//! Not a persisted index: the cache is rebuilt on every run by listing the
//! processed-clips directory. Entries follow the `NNNN_<stem>.mp4` naming of
//! the render step; the numeric prefix is ignored so a clip rendered under a
//! different index in an earlier run is still a hit.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Lookup from an original file's base name to its rendered clip.
#[derive(Debug, Default)]
pub struct ClipCache {
    clips: BTreeMap<String, PathBuf>,
}

impl ClipCache {
    /// Build the cache by listing `processed_dir`. A missing directory is an
    /// empty cache.
    pub fn scan(processed_dir: impl AsRef<Path>) -> Self {
        let processed_dir = processed_dir.as_ref();
        let mut clips = BTreeMap::new();

        let Ok(entries) = std::fs::read_dir(processed_dir) else {
            return Self { clips };
        };

        for entry in entries.filter_map(|e| e.ok()) {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(base) = parse_clip_name(name) {
                clips.insert(base.to_string(), entry.path());
            }
        }

        debug!("Clip cache: {} entries", clips.len());
        Self { clips }
    }

    /// Look up a rendered clip by the original file's base name.
    ///
    /// Self-healing: a mapping whose file was deleted since the scan is a
    /// miss, so the caller re-renders.
    pub fn get(&self, base_name: &str) -> Option<&Path> {
        let path = self.clips.get(base_name)?;
        if path.exists() {
            Some(path)
        } else {
            debug!("Stale cache entry for {}: {}", base_name, path.display());
            None
        }
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

/// Extract the original base name from a `NNNN_<stem>.mp4` entry.
/// Separator cards and anything else not matching the convention are skipped.
fn parse_clip_name(name: &str) -> Option<&str> {
    let stem = name.strip_suffix(".mp4")?;
    if stem.starts_with("separator_") {
        return None;
    }
    let (prefix, base) = stem.split_once('_')?;
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clip_name() {
        assert_eq!(parse_clip_name("0042_IMG_1234.mp4"), Some("IMG_1234"));
        assert_eq!(parse_clip_name("6000_holiday.mp4"), Some("holiday"));
        assert_eq!(parse_clip_name("separator_07.mp4"), None);
        assert_eq!(parse_clip_name("noprefix.mp4"), None);
        assert_eq!(parse_clip_name("0001_clip.mov"), None);
    }

    #[test]
    fn test_scan_and_lookup() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("0001_IMG_20250102.mp4"), b"a").unwrap();
        std::fs::write(dir.path().join("separator_01.mp4"), b"b").unwrap();
        std::fs::write(dir.path().join("stray.txt"), b"c").unwrap();

        let cache = ClipCache::scan(dir.path());
        assert_eq!(cache.len(), 1);
        assert!(cache.get("IMG_20250102").is_some());
        assert!(cache.get("missing").is_none());
    }

    #[test]
    fn test_lookup_ignores_numeric_prefix() {
        // A clip rendered under a different index in a prior run still hits
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("3001_fileA.mp4"), b"x").unwrap();

        let cache = ClipCache::scan(dir.path());
        assert!(cache.get("fileA").is_some());
    }

    #[test]
    fn test_deleted_output_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let clip = dir.path().join("0001_gone.mp4");
        std::fs::write(&clip, b"x").unwrap();

        let cache = ClipCache::scan(dir.path());
        std::fs::remove_file(&clip).unwrap();
        assert!(cache.get("gone").is_none());
    }

    #[test]
    fn test_missing_dir_is_empty() {
        assert!(ClipCache::scan("/no/such/dir").is_empty());
    }
}
