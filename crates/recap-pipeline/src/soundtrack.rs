//! Soundtrack assembly over the finished recap.
//!
//! One audio track per month, matched by a two-digit name prefix. Each
//! month's segment length follows its video's duration, with crossfade
//! compensation so the music lines up with the month boundaries.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use recap_media::{audio, fsops, get_duration};

use crate::config::RecapConfig;
use crate::error::{PipelineError, PipelineResult};

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a", "wav", "aac", "flac"];

/// Find the audio track for a month: a file in `audio_dir` whose name starts
/// with the zero-padded month number.
pub fn find_month_track(audio_dir: impl AsRef<Path>, month: u32) -> Option<PathBuf> {
    let prefix = format!("{:02}", month);
    let entries = std::fs::read_dir(audio_dir.as_ref()).ok()?;

    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let ext_ok = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| AUDIO_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if ext_ok && name.starts_with(&prefix) {
            return Some(path);
        }
    }
    None
}

/// Assemble the soundtrack and mux it onto the final video.
///
/// Months without a rendered video or without a matching track are skipped
/// with a warning. Fails if the final video is missing or no segment could
/// be cut at all.
pub async fn add_soundtrack(config: &RecapConfig) -> PipelineResult<PathBuf> {
    let final_video = config.final_video_path();
    if !final_video.exists() {
        return Err(PipelineError::MissingVideo(final_video));
    }

    fsops::ensure_dir(config.temp_dir()).await?;
    let work_dir = config.temp_dir().join("soundtrack");
    fsops::ensure_dir(&work_dir).await?;

    // Month durations drive the segment lengths
    let mut month_durations = Vec::new();
    for month in 1..=12 {
        let video = config.month_video_path(month);
        if !video.exists() {
            continue;
        }
        match get_duration(&video).await {
            Ok(duration) => {
                info!("{}: {:.1}s", config.month_name(month), duration);
                month_durations.push((month, duration));
            }
            Err(e) => warn!("Could not measure {}: {}", video.display(), e),
        }
    }

    // Cut one segment per month, compensating for the crossfade overlap on
    // every segment except the last
    let mut segments = Vec::new();
    let last_index = month_durations.len().saturating_sub(1);
    for (i, (month, duration)) in month_durations.iter().enumerate() {
        let Some(track) = find_month_track(&config.audio_dir, *month) else {
            warn!(
                "No audio track with prefix {:02} in {}",
                month,
                config.audio_dir.display()
            );
            continue;
        };

        let compensation = if i == last_index { 0.0 } else { config.crossfade_secs };
        let segment = work_dir.join(format!("segment_{:02}.m4a", month));
        match audio::extract_audio_segment(
            &track,
            &segment,
            duration + compensation,
            &config.encoding,
        )
        .await
        {
            Ok(()) => segments.push(segment),
            Err(e) => warn!("Segment for month {} failed: {}", month, e),
        }
    }

    if segments.is_empty() {
        return Err(PipelineError::NoAudioSegments);
    }

    let joined = work_dir.join("soundtrack_joined.m4a");
    audio::crossfade_segments(&segments, &joined, config.crossfade_secs, &config.encoding).await?;

    let total_secs = get_duration(&final_video).await?;
    let faded = work_dir.join("soundtrack_faded.m4a");
    audio::fade_soundtrack(
        &joined,
        &faded,
        total_secs,
        config.audio_fade_secs,
        &config.encoding,
    )
    .await?;

    let output = config.final_video_with_audio_path();
    audio::mux_soundtrack(&final_video, &faded, &output, &config.encoding).await?;

    info!("Recap with soundtrack: {}", output.display());
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_month_track_by_prefix() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("07 - summer song.mp3"), b"x").unwrap();
        std::fs::write(dir.path().join("08_august.m4a"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        assert!(find_month_track(dir.path(), 7)
            .unwrap()
            .to_string_lossy()
            .contains("summer song"));
        assert!(find_month_track(dir.path(), 8).is_some());
        assert!(find_month_track(dir.path(), 9).is_none());
    }

    #[tokio::test]
    async fn test_missing_final_video_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = RecapConfig {
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let err = add_soundtrack(&config).await.unwrap_err();
        assert!(matches!(err, PipelineError::MissingVideo(_)));
    }
}
