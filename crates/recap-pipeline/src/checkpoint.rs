//! Checkpoint/resume state.
//!
//! Coarse progress (which phases finished, which months rendered) is
//! persisted after every mutation so an interrupted run can resume at the
//! last completed month boundary. Persistence failures are logged and
//! swallowed: losing resumability is acceptable, aborting the run is not.

use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

/// A named pipeline phase tracked by the checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    MediaScan,
    MediaAssignment,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StepsCompleted {
    #[serde(default)]
    media_scan: bool,
    #[serde(default)]
    media_assignment: bool,
    #[serde(default)]
    months_processed: Vec<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CheckpointData {
    last_update: Option<String>,
    #[serde(default)]
    steps_completed: StepsCompleted,
    #[serde(default)]
    completed: bool,
}

/// Persisted run progress.
#[derive(Debug)]
pub struct Checkpoint {
    path: PathBuf,
    data: CheckpointData,
}

impl Checkpoint {
    /// Load the checkpoint at `path`; missing or corrupt files start fresh.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let data = if path.exists() {
            match std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|s| serde_json::from_str(&s).map_err(|e| e.to_string()))
            {
                Ok(data) => {
                    info!("Loaded checkpoint from {}", path.display());
                    data
                }
                Err(e) => {
                    warn!("Error loading checkpoint: {}. Starting fresh.", e);
                    CheckpointData::default()
                }
            }
        } else {
            CheckpointData::default()
        };
        Self { path, data }
    }

    /// Persist the current state. Failure is logged and swallowed.
    pub fn save(&mut self) {
        self.data.last_update = Some(Local::now().format("%Y-%m-%dT%H:%M:%S").to_string());
        let result = serde_json::to_string_pretty(&self.data)
            .map_err(|e| e.to_string())
            .and_then(|json| std::fs::write(&self.path, json).map_err(|e| e.to_string()));
        match result {
            Ok(()) => debug!("Checkpoint saved"),
            Err(e) => error!("Error saving checkpoint: {}", e),
        }
    }

    pub fn mark_phase_done(&mut self, phase: Phase) {
        let flag = match phase {
            Phase::MediaScan => &mut self.data.steps_completed.media_scan,
            Phase::MediaAssignment => &mut self.data.steps_completed.media_assignment,
        };
        *flag = true;
        self.save();
        info!("Phase completed: {:?}", phase);
    }

    pub fn is_phase_done(&self, phase: Phase) -> bool {
        match phase {
            Phase::MediaScan => self.data.steps_completed.media_scan,
            Phase::MediaAssignment => self.data.steps_completed.media_assignment,
        }
    }

    /// Idempotent: marking a month twice keeps a single sorted entry.
    pub fn mark_month_done(&mut self, month: u32) {
        let months = &mut self.data.steps_completed.months_processed;
        if !months.contains(&month) {
            months.push(month);
            months.sort_unstable();
            self.save();
            info!("Month {} completed", month);
        }
    }

    pub fn is_month_done(&self, month: u32) -> bool {
        self.data.steps_completed.months_processed.contains(&month)
    }

    /// Remove a month from the done-set, forcing it to re-render.
    pub fn invalidate_month(&mut self, month: u32) {
        let months = &mut self.data.steps_completed.months_processed;
        if let Some(pos) = months.iter().position(|&m| m == month) {
            months.remove(pos);
            self.save();
            info!("Month {} invalidated, will be regenerated", month);
        }
    }

    pub fn invalidate_months(&mut self, months: &[u32]) {
        for &month in months {
            self.invalidate_month(month);
        }
    }

    pub fn completed_months(&self) -> &[u32] {
        &self.data.steps_completed.months_processed
    }

    pub fn mark_all_done(&mut self) {
        self.data.completed = true;
        self.save();
    }

    pub fn is_complete(&self) -> bool {
        self.data.completed
    }

    /// Whether a prior unfinished run left progress to resume from.
    pub fn should_resume(&self) -> bool {
        !self.data.completed
            && (self.data.steps_completed.media_scan
                || self.data.steps_completed.media_assignment
                || !self.data.steps_completed.months_processed.is_empty())
    }

    /// Reset to fresh and persist the empty state.
    pub fn clear(&mut self) {
        self.data = CheckpointData::default();
        self.save();
    }

    /// One-line progress description shown when resuming.
    pub fn progress_summary(&self) -> String {
        let steps = &self.data.steps_completed;
        let mut parts = Vec::new();
        if steps.media_scan {
            parts.push("scan done".to_string());
        }
        if steps.media_assignment {
            parts.push("assignment done".to_string());
        }
        if !steps.months_processed.is_empty() {
            parts.push(format!(
                "{}/12 months rendered ({})",
                steps.months_processed.len(),
                steps
                    .months_processed
                    .iter()
                    .map(|m| m.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }
        if parts.is_empty() {
            "no progress yet".to_string()
        } else {
            parts.join(", ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_and_invalidation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint.json");

        let mut cp = Checkpoint::load(&path);
        cp.mark_month_done(7);

        let reloaded = Checkpoint::load(&path);
        assert!(reloaded.is_month_done(7));

        let mut cp = reloaded;
        cp.invalidate_month(7);
        assert!(!cp.is_month_done(7));
        assert!(!Checkpoint::load(&path).is_month_done(7));
    }

    #[test]
    fn test_month_done_idempotent_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let mut cp = Checkpoint::load(dir.path().join("c.json"));
        cp.mark_month_done(9);
        cp.mark_month_done(2);
        cp.mark_month_done(9);
        assert_eq!(cp.completed_months(), &[2, 9]);
    }

    #[test]
    fn test_persisted_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint.json");

        let mut cp = Checkpoint::load(&path);
        cp.mark_phase_done(Phase::MediaScan);
        cp.mark_month_done(3);

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["steps_completed"]["media_scan"], true);
        assert_eq!(raw["steps_completed"]["media_assignment"], false);
        assert_eq!(raw["steps_completed"]["months_processed"][0], 3);
        assert_eq!(raw["completed"], false);
        assert!(raw["last_update"].is_string());
    }

    #[test]
    fn test_corrupt_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint.json");
        std::fs::write(&path, b"garbage").unwrap();

        let cp = Checkpoint::load(&path);
        assert!(!cp.should_resume());
        assert!(!cp.is_complete());
    }

    #[test]
    fn test_should_resume_transitions() {
        let dir = tempfile::tempdir().unwrap();
        let mut cp = Checkpoint::load(dir.path().join("c.json"));
        assert!(!cp.should_resume());

        cp.mark_phase_done(Phase::MediaAssignment);
        assert!(cp.should_resume());

        cp.mark_all_done();
        assert!(!cp.should_resume());
        assert!(cp.is_complete());

        cp.clear();
        assert!(!cp.is_complete());
        assert_eq!(cp.progress_summary(), "no progress yet");
    }

    #[test]
    fn test_save_failure_is_swallowed() {
        let mut cp = Checkpoint::load("/nonexistent-dir/deep/checkpoint.json");
        cp.mark_month_done(1); // must not panic
        assert!(cp.is_month_done(1));
    }
}
