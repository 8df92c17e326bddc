//! Render orchestration.
//!
//! Strictly sequential: one ffmpeg invocation at a time, each awaited to
//! completion. Per-item failures are logged and skipped; a month's separator
//! or concatenation failure aborts the phase.

use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::{info, warn};

use recap_media::{animated, caption, concat, fsops, normalize, separator, still, trim};
use recap_models::{MediaKind, MediaRecord};

use crate::assign::{month_dates, AssignmentMap};
use crate::checkpoint::Checkpoint;
use crate::clip_cache::ClipCache;
use crate::config::RecapConfig;
use crate::error::{PipelineError, PipelineResult};

/// Render one media file into a processed clip named
/// `NNNN_<stem>.mp4`. Returns `None` on failure (logged, item skipped).
pub async fn render_clip(
    record: &MediaRecord,
    clip_index: u32,
    config: &RecapConfig,
) -> Option<PathBuf> {
    let output = config
        .processed_dir()
        .join(format!("{:04}_{}.mp4", clip_index, record.base_name()));

    info!("Processing [{}]: {} ({})", clip_index, record.filename, record.kind);

    let result = match record.kind {
        MediaKind::Image => {
            if config.pan_zoom.enabled {
                // Alternate zoom direction between consecutive stills
                let zoom_in = clip_index % 2 == 0;
                match still::render_photo_clip(
                    &record.filepath,
                    &output,
                    config.photo_secs,
                    zoom_in,
                    &config.pan_zoom,
                    &config.encoding,
                )
                .await
                {
                    Ok(()) => Ok(()),
                    Err(e) => {
                        warn!(
                            "Pan/zoom render failed for {} ({}), falling back to static",
                            record.filename, e
                        );
                        still::render_static_photo_clip(
                            &record.filepath,
                            &output,
                            config.photo_secs,
                            &config.encoding,
                        )
                        .await
                    }
                }
            } else {
                still::render_static_photo_clip(
                    &record.filepath,
                    &output,
                    config.photo_secs,
                    &config.encoding,
                )
                .await
            }
        }
        MediaKind::Video => {
            trim::extract_video_clip(
                &record.filepath,
                &output,
                config.video_secs,
                &config.encoding,
            )
            .await
        }
        MediaKind::AnimatedImage => {
            animated::render_animated_clip(
                &record.filepath,
                &output,
                config.gif_max_secs,
                &config.encoding,
            )
            .await
        }
    };

    match result {
        Ok(()) => Some(output),
        Err(e) => {
            warn!("Skipping {}: render failed: {}", record.filename, e);
            None
        }
    }
}

/// Render one month's video: separator card, then every day's clips (cached
/// or fresh), captioned and concatenated into `month_NN_<Name>.mp4`.
///
/// Returns `Ok(None)` when the month has no media.
pub async fn render_month(
    month: u32,
    assignments: &AssignmentMap,
    config: &RecapConfig,
) -> PipelineResult<Option<PathBuf>> {
    let dates = month_dates(assignments, month);
    if dates.is_empty() {
        info!("No media for {}", config.month_name(month));
        return Ok(None);
    }

    info!(
        "Rendering {}: {} days with media",
        config.month_name(month),
        dates.len()
    );

    fsops::ensure_dir(config.processed_dir()).await?;

    // Separator card is itself cached in the processed directory
    let separator_path = config.separator_path(month);
    if !separator_path.exists() {
        separator::render_separator_card(
            &config.separator_title(month),
            &separator_path,
            config.separator_secs,
            config.fade_secs,
            config.separator_font_size,
            &config.encoding,
        )
        .await?;
    }

    let cache = ClipCache::scan(config.processed_dir());

    // (clip path, date for the caption; None for the separator)
    let mut clips: Vec<(PathBuf, Option<(NaiveDate, MediaKind)>)> =
        vec![(separator_path, None)];
    let mut clip_index = config.clip_index_base(month);

    for date in &dates {
        for record in &assignments[date] {
            let clip = match cache.get(record.base_name()) {
                Some(hit) => {
                    info!("Using cached clip for {}", record.filename);
                    hit.to_path_buf()
                }
                None => match render_clip(record, clip_index, config).await {
                    Some(path) => path,
                    None => continue,
                },
            };
            clips.push((clip, Some((*date, record.kind))));
            clip_index += 1;
        }
    }

    // Stage working copies so cached clips are never mutated
    let month_temp = config.month_temp_dir(month);
    fsops::ensure_dir(&month_temp).await?;

    let mut staged = Vec::with_capacity(clips.len());
    for (i, (clip, meta)) in clips.iter().enumerate() {
        let Some((date, kind)) = meta else {
            staged.push(clip.clone());
            continue;
        };

        let file_name = clip
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| format!("clip_{}.mp4", i));
        let working = month_temp.join(format!("{:04}_{}", i, file_name));
        tokio::fs::copy(clip, &working).await?;

        if kind.needs_normalization() {
            if let Err(e) = normalize::normalize_clip(&working, &config.encoding).await {
                warn!("Normalization failed for {}: {}", working.display(), e);
            }
        }

        if config.caption.enabled {
            let text = config.caption_text(*date);
            if let Err(e) =
                caption::caption_clip(&working, &text, &config.caption, &config.encoding).await
            {
                warn!("Caption failed for {}: {}", working.display(), e);
            }
        }

        staged.push(working);
    }

    let output = config.month_video_path(month);
    fsops::ensure_dir(config.video_dir()).await?;
    info!(
        "Compiling {} video ({} clips)...",
        config.month_name(month),
        staged.len() - 1
    );
    concat::concat_clips(&staged, &output, &config.encoding, |_| {}).await?;

    Ok(Some(output))
}

/// Render every month still pending per the checkpoint, then concatenate the
/// month videos into the final artifact.
pub async fn render_year(
    assignments: &AssignmentMap,
    config: &RecapConfig,
    checkpoint: &mut Checkpoint,
) -> PipelineResult<PathBuf> {
    fsops::ensure_dir(config.video_dir()).await?;

    let mut month_videos = Vec::new();
    for month in 1..=12 {
        let month_output = config.month_video_path(month);

        if checkpoint.is_month_done(month) && month_output.exists() {
            info!("Skipping {} (already rendered)", config.month_name(month));
            month_videos.push(month_output);
            continue;
        }

        if let Some(video) = render_month(month, assignments, config).await? {
            month_videos.push(video);
            checkpoint.mark_month_done(month);
        }
    }

    if month_videos.is_empty() {
        return Err(PipelineError::NoMonthVideos);
    }

    let final_path = config.final_video_path();
    info!(
        "Concatenating {} month videos into {}",
        month_videos.len(),
        final_path.display()
    );

    let total_ms = concat::total_duration_ms(&month_videos).await;
    let mut last_decile = 0;
    concat::concat_clips(&month_videos, &final_path, &config.encoding, |progress| {
        let decile = (progress.percentage(total_ms) / 10.0) as u32;
        if decile > last_decile {
            last_decile = decile;
            info!(
                "Final concat: {:.0}% ({:.1}x)",
                progress.percentage(total_ms),
                progress.speed
            );
        }
    })
    .await?;

    info!("Final video: {}", final_path.display());
    Ok(final_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_render_month_empty_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let config = RecapConfig {
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let assignments = AssignmentMap::new();
        let result = render_month(7, &assignments, &config).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_render_year_requires_some_output() {
        let dir = tempfile::tempdir().unwrap();
        let config = RecapConfig {
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let mut checkpoint = Checkpoint::load(config.checkpoint_path());
        let assignments = AssignmentMap::new();

        let err = render_year(&assignments, &config, &mut checkpoint)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::NoMonthVideos));
    }
}
