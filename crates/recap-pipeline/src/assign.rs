//! Day assignment: bucket resolved files by calendar date.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use tracing::{debug, info, warn};

use recap_models::{DateSource, MediaKind, MediaRecord};

use crate::error::{PipelineError, PipelineResult};
use crate::resolve::resolve_date;

/// Assignment store: calendar date to the day's media, ordered by timestamp.
///
/// Persisted as a JSON object `"YYYY-MM-DD" -> [record]`.
pub type AssignmentMap = BTreeMap<NaiveDate, Vec<MediaRecord>>;

/// Counters collected during an assignment pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AssignStats {
    pub total: usize,
    pub assigned: usize,
    pub skipped_wrong_year: usize,
    pub skipped_unsupported: usize,
    pub by_source: BTreeMap<DateSource, usize>,
}

/// Resolve and bucket `files` for `target_year`.
///
/// Files outside the year are counted and dropped; unsupported files are
/// counted and dropped; a single file's failure never aborts the pass.
/// Buckets are sorted by resolved timestamp ascending (stable, so scan order
/// breaks ties).
pub async fn assign_files(files: &[PathBuf], target_year: i32) -> (AssignmentMap, AssignStats) {
    let mut assignments = AssignmentMap::new();
    let mut stats = AssignStats {
        total: files.len(),
        ..Default::default()
    };

    for path in files {
        let Some(kind) = MediaKind::from_path(path) else {
            stats.skipped_unsupported += 1;
            continue;
        };
        let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
            stats.skipped_unsupported += 1;
            continue;
        };

        let (date, source) = resolve_date(path, kind, target_year).await;
        if date.year() != target_year {
            debug!("Skipping {} (year {})", filename, date.year());
            stats.skipped_wrong_year += 1;
            continue;
        }

        assignments.entry(date.date()).or_default().push(MediaRecord {
            filepath: path.clone(),
            filename: filename.to_string(),
            kind,
            date,
            source,
        });
        stats.assigned += 1;
        *stats.by_source.entry(source).or_insert(0) += 1;
    }

    for bucket in assignments.values_mut() {
        bucket.sort_by_key(|r| r.date);
    }

    info!(
        "Assignment: {} files, {} assigned, {} wrong year, {} unsupported",
        stats.total, stats.assigned, stats.skipped_wrong_year, stats.skipped_unsupported
    );
    for (source, count) in &stats.by_source {
        info!("  {}: {}", source, count);
    }

    (assignments, stats)
}

/// Load the assignment store; a missing file is fatal for render phases.
pub fn load_assignments(path: impl AsRef<Path>) -> PipelineResult<AssignmentMap> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(PipelineError::MissingAssignments(path.to_path_buf()));
    }
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Persist the assignment store.
pub fn save_assignments(assignments: &AssignmentMap, path: impl AsRef<Path>) -> PipelineResult<()> {
    let json = serde_json::to_string_pretty(assignments)?;
    std::fs::write(path.as_ref(), json)?;
    info!("Saved assignment store to {}", path.as_ref().display());
    Ok(())
}

/// Every file path already present in the store.
pub fn known_filepaths(assignments: &AssignmentMap) -> BTreeSet<PathBuf> {
    assignments
        .values()
        .flatten()
        .map(|r| r.filepath.clone())
        .collect()
}

/// Merge newly assigned records into an existing store, re-sorting the
/// affected buckets by timestamp.
pub fn merge_assignments(existing: &mut AssignmentMap, new: AssignmentMap) {
    for (date, records) in new {
        let bucket = existing.entry(date).or_default();
        bucket.extend(records);
        bucket.sort_by_key(|r| r.date);
    }
}

/// Dates in the store that fall in `month` of the target year, ascending.
pub fn month_dates(assignments: &AssignmentMap, month: u32) -> Vec<NaiveDate> {
    assignments
        .keys()
        .filter(|d| d.month() == month)
        .copied()
        .collect()
}

/// Warn about assigned files that no longer exist on disk.
pub fn warn_missing_files(assignments: &AssignmentMap) {
    for record in assignments.values().flatten() {
        if !record.filepath.exists() {
            warn!(
                "Assigned file no longer exists: {} (pruning is not performed)",
                record.filepath.display()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn record(name: &str, date: NaiveDateTime) -> MediaRecord {
        MediaRecord {
            filepath: PathBuf::from(format!("/m/{}", name)),
            filename: name.to_string(),
            kind: MediaKind::Image,
            date,
            source: DateSource::Filename,
        }
    }

    fn dt(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_assign_buckets_by_date() {
        let dir = tempfile::tempdir().unwrap();
        let mk = |name: &str| {
            let p = dir.path().join(name);
            std::fs::write(&p, b"x").unwrap();
            p
        };

        let files = vec![
            mk("IMG_20250102_161334.jpg"),
            mk("IMG_20250102_090000.jpg"),
            mk("VID_20250317_100000.mp4"),
            mk("IMG_20240401_120000.jpg"), // wrong year
            mk("readme.txt"),              // unsupported
        ];

        let (assignments, stats) = assign_files(&files, 2025).await;

        assert_eq!(stats.assigned, 3);
        assert_eq!(stats.skipped_wrong_year, 1);
        assert_eq!(stats.skipped_unsupported, 1);

        let jan2 = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let bucket = &assignments[&jan2];
        assert_eq!(bucket.len(), 2);
        // Sorted by timestamp, not filename
        assert_eq!(bucket[0].filename, "IMG_20250102_090000.jpg");
        assert_eq!(bucket[1].filename, "IMG_20250102_161334.jpg");

        // Bucket invariant: every record's date matches its key
        for (date, records) in &assignments {
            for r in records {
                assert_eq!(r.date.date(), *date);
                assert_eq!(date.year(), 2025);
            }
        }
    }

    #[test]
    fn test_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("media_assignment.json");

        let mut assignments = AssignmentMap::new();
        let date = NaiveDate::from_ymd_opt(2025, 7, 4).unwrap();
        assignments.insert(date, vec![record("a.jpg", dt(2025, 7, 4, 9))]);

        save_assignments(&assignments, &path).unwrap();

        // Keys serialize as ISO date strings
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw.get("2025-07-04").is_some());

        let loaded = load_assignments(&path).unwrap();
        assert_eq!(loaded, assignments);
    }

    #[test]
    fn test_missing_store_is_fatal() {
        let err = load_assignments("/nope/media_assignment.json").unwrap_err();
        assert!(matches!(err, PipelineError::MissingAssignments(_)));
    }

    #[test]
    fn test_merge_resorts_bucket() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 4).unwrap();
        let mut existing = AssignmentMap::new();
        existing.insert(date, vec![record("late.jpg", dt(2025, 7, 4, 18))]);

        let mut new = AssignmentMap::new();
        new.insert(date, vec![record("early.jpg", dt(2025, 7, 4, 8))]);

        merge_assignments(&mut existing, new);
        let bucket = &existing[&date];
        assert_eq!(bucket[0].filename, "early.jpg");
        assert_eq!(bucket[1].filename, "late.jpg");
    }

    #[test]
    fn test_month_dates() {
        let mut assignments = AssignmentMap::new();
        for (m, d) in [(7, 4), (7, 20), (8, 1)] {
            assignments.insert(
                NaiveDate::from_ymd_opt(2025, m, d).unwrap(),
                vec![record("x.jpg", dt(2025, m, d, 0))],
            );
        }
        let july = month_dates(&assignments, 7);
        assert_eq!(july.len(), 2);
        assert!(july[0] < july[1]);
    }
}
