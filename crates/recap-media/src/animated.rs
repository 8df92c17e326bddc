//! Animated image (GIF) to video rendering.

use std::path::Path;

use tracing::info;

use recap_models::EncodingConfig;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::filters;
use crate::probe;

/// Render an animated image into a normalized clip.
///
/// GIFs shorter than the clip length are looped to fill it; longer ones are
/// truncated. GIFs carry no audio stream, so the output is silent like every
/// other day clip.
pub async fn render_animated_clip(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    clip_secs: f64,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    let input = input.as_ref();
    let output = output.as_ref();

    let source_secs = probe::get_duration(input).await.unwrap_or(0.0);

    info!(
        "Rendering animated clip: {} -> {} (source {:.2}s)",
        input.display(),
        output.display(),
        source_secs
    );

    let mut cmd = FfmpegCommand::new(input, output);
    if source_secs > 0.0 && source_secs < clip_secs {
        cmd = cmd.input_arg("-stream_loop").input_arg("-1");
    }

    let cmd = cmd
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
