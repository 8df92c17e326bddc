//! Video clip extraction.

use std::path::Path;

use rand::Rng;
use tracing::info;

use recap_models::EncodingConfig;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::filters;
use crate::probe;

/// Pick a start offset for a clip of `clip_secs` inside a video of
/// `total_secs`, at a random position when the video is long enough.
pub fn pick_start_offset(total_secs: f64, clip_secs: f64) -> f64 {
    let slack = total_secs - clip_secs;
    if slack <= 0.0 {
        return 0.0;
    }
    rand::rng().random_range(0.0..slack)
}

/// Extract a normalized clip from a video.
///
/// A random window is chosen when the source is longer than the clip; short
/// sources are taken from the start and the clip simply ends early. Audio is
/// dropped: day clips are silent until the soundtrack is muxed in.
pub async fn extract_video_clip(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    clip_secs: f64,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    let input = input.as_ref();
    let output = output.as_ref();

    let total_secs = probe::get_duration(input).await.unwrap_or(0.0);
    let start = pick_start_offset(total_secs, clip_secs);

    info!(
        "Extracting video clip: {} -> {} (start {:.2}s of {:.2}s)",
        input.display(),
        output.display(),
        start,
        total_secs
    );

    let cmd = FfmpegCommand::new(input, output)
        .seek(start)
        .duration(clip_secs)
        .video_filter(filters::normalize(
            encoding.width,
            encoding.height,
            encoding.fps,
        ))
        .output_arg("-an")
        .output_args(encoding.to_video_args());

    FfmpegRunner::new().run(&cmd).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_start_offset_short_video() {
        assert_eq!(pick_start_offset(0.5, 0.9), 0.0);
        assert_eq!(pick_start_offset(0.9, 0.9), 0.0);
    }

    #[test]
    fn test_pick_start_offset_in_range() {
        for _ in 0..50 {
            let start = pick_start_offset(10.0, 0.9);
            assert!(start >= 0.0);
            assert!(start < 9.1);
        }
    }
}
