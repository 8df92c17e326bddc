//! Top-level pipeline phases, as invoked by the CLI subcommands.

use std::path::PathBuf;

use chrono::Datelike;
use tracing::{info, warn};

use recap_media::fsops;

use crate::assign::{
    assign_files, known_filepaths, load_assignments, merge_assignments, save_assignments,
    warn_missing_files,
};
use crate::checkpoint::{Checkpoint, Phase};
use crate::config::RecapConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::render::render_year;
use crate::reports::write_reports;
use crate::scan::{incremental_scan, scan_folder};

/// Scan and (re-)assign. Returns whether the assignment store changed.
///
/// Skipped entirely when the checkpoint says both phases already completed;
/// skipped cheaply when the scan finds no new or changed files and a store
/// already exists.
pub async fn run_assign(config: &RecapConfig, checkpoint: &mut Checkpoint) -> PipelineResult<bool> {
    fsops::ensure_dir(&config.output_dir).await?;

    if checkpoint.is_phase_done(Phase::MediaScan)
        && checkpoint.is_phase_done(Phase::MediaAssignment)
    {
        info!("Scan and assignment already completed (from checkpoint)");
        return Ok(false);
    }

    info!("Checking for new/changed media files...");
    let scan = incremental_scan(&config.input_dir, config.scan_cache_path())?;
    checkpoint.mark_phase_done(Phase::MediaScan);

    if scan.to_process.is_empty() && config.assignment_path().exists() {
        info!("No new files detected, keeping existing assignments");
        checkpoint.mark_phase_done(Phase::MediaAssignment);
        return Ok(false);
    }

    info!("{} new or changed files", scan.to_process.len());

    // Re-assignment runs over all files; resolution is cheap next to renders
    let (assignments, _stats) = assign_files(&scan.all_files, config.target_year).await;
    save_assignments(&assignments, config.assignment_path())?;
    write_reports(&assignments, config)?;
    checkpoint.mark_phase_done(Phase::MediaAssignment);

    Ok(true)
}

/// Render phase only. The assignment store must already exist.
pub async fn run_render(
    config: &RecapConfig,
    checkpoint: &mut Checkpoint,
) -> PipelineResult<PathBuf> {
    let assignments = load_assignments(config.assignment_path())?;
    warn_missing_files(&assignments);
    render_year(&assignments, config, checkpoint).await
}

/// The full pipeline: scan, assign, render, final concat, cleanup.
pub async fn run_full(config: &RecapConfig, checkpoint: &mut Checkpoint) -> PipelineResult<PathBuf> {
    if checkpoint.is_complete() {
        info!("Previous run completed; starting fresh");
        checkpoint.clear();
    } else if checkpoint.should_resume() {
        info!("Resuming from checkpoint: {}", checkpoint.progress_summary());
    }

    fsops::ensure_dir(config.processed_dir()).await?;
    fsops::ensure_dir(config.video_dir()).await?;

    run_assign(config, checkpoint).await?;
    let final_video = run_render(config, checkpoint).await?;
    checkpoint.mark_all_done();

    // Keep processed/ and output/ as caches; only scratch space goes
    let temp = config.temp_dir();
    if temp.exists() {
        if let Err(e) = tokio::fs::remove_dir_all(&temp).await {
            warn!("Could not remove {}: {}", temp.display(), e);
        }
    }

    Ok(final_video)
}

/// Regenerate specific months: optionally pick up files not yet assigned,
/// then invalidate and re-render the months and the final video.
pub async fn regenerate_months(
    config: &RecapConfig,
    checkpoint: &mut Checkpoint,
    months: &[u32],
    rescan: bool,
) -> PipelineResult<PathBuf> {
    for &month in months {
        if !(1..=12).contains(&month) {
            return Err(PipelineError::InvalidMonth(month));
        }
    }

    if rescan {
        rescan_for_months(config, months).await?;
    }

    for &month in months {
        let video = config.month_video_path(month);
        if video.exists() {
            info!("Removing {}", video.display());
            tokio::fs::remove_file(&video).await?;
        }
        checkpoint.invalidate_month(month);
    }

    run_render(config, checkpoint).await
}

/// Assign files that are not yet in the store, keeping only dates in the
/// requested months, and merge them in.
async fn rescan_for_months(config: &RecapConfig, months: &[u32]) -> PipelineResult<()> {
    let mut assignments = load_assignments(config.assignment_path())?;
    let known = known_filepaths(&assignments);

    let current = scan_folder(&config.input_dir)?;
    let new_files: Vec<PathBuf> = current
        .0
        .keys()
        .filter(|p| !known.contains(*p))
        .cloned()
        .collect();

    if new_files.is_empty() {
        info!("No new files to pick up");
        return Ok(());
    }
    info!("Found {} new files", new_files.len());

    let (mut fresh, _stats) = assign_files(&new_files, config.target_year).await;
    fresh.retain(|date, _| months.contains(&date.month()));

    if fresh.is_empty() {
        info!("No new files fall in the selected months");
        return Ok(());
    }

    for (date, records) in &fresh {
        info!("{}: {} new file(s)", date, records.len());
    }
    merge_assignments(&mut assignments, fresh);
    save_assignments(&assignments, config.assignment_path())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_assign_creates_store_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let media = dir.path().join("media");
        std::fs::create_dir(&media).unwrap();
        std::fs::write(media.join("IMG_20250102_161334.jpg"), b"x").unwrap();

        let config = RecapConfig {
            input_dir: media,
            output_dir: dir.path().join("work"),
            ..Default::default()
        };
        let mut checkpoint = Checkpoint::load(config.checkpoint_path());

        let changed = run_assign(&config, &mut checkpoint).await.unwrap();
        assert!(changed);
        assert!(config.assignment_path().exists());
        assert!(config.visual_report_path().exists());
        assert!(config.csv_report_path().exists());
        assert!(checkpoint.is_phase_done(Phase::MediaAssignment));
    }

    #[tokio::test]
    async fn test_run_assign_skips_when_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let media = dir.path().join("media");
        std::fs::create_dir(&media).unwrap();
        std::fs::write(media.join("IMG_20250102_161334.jpg"), b"x").unwrap();

        let config = RecapConfig {
            input_dir: media,
            output_dir: dir.path().join("work"),
            ..Default::default()
        };

        let mut checkpoint = Checkpoint::load(config.checkpoint_path());
        assert!(run_assign(&config, &mut checkpoint).await.unwrap());

        // Second run with a fresh checkpoint: no changes, store exists
        checkpoint.clear();
        assert!(!run_assign(&config, &mut checkpoint).await.unwrap());
    }

    #[tokio::test]
    async fn test_run_render_without_store_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = RecapConfig {
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let mut checkpoint = Checkpoint::load(config.checkpoint_path());

        let err = run_render(&config, &mut checkpoint).await.unwrap_err();
        assert!(matches!(err, PipelineError::MissingAssignments(_)));
    }

    #[tokio::test]
    async fn test_regenerate_rejects_bad_month() {
        let dir = tempfile::tempdir().unwrap();
        let config = RecapConfig {
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let mut checkpoint = Checkpoint::load(config.checkpoint_path());

        let err = regenerate_months(&config, &mut checkpoint, &[13], false)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidMonth(13)));
    }
}
