//! Month separator card rendering.

use std::path::Path;

use tracing::info;

use recap_models::EncodingConfig;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::filters;

/// Render a title card: black background, centered month name, fade in/out.
pub async fn render_separator_card(
    title: &str,
    output: impl AsRef<Path>,
    duration_secs: f64,
    fade_secs: f64,
    font_size: u32,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    let output = output.as_ref();

    info!("Rendering separator card '{}' -> {}", title, output.display());

    let source = format!(
        "color=c=black:s={}x{}:d={}:r={}",
        encoding.width, encoding.height, duration_secs, encoding.fps
    );
    let filter = format!(
        "{},{}",
        filters::centered_text(title, font_size),
        filters::fade_in_out(duration_secs, fade_secs)
    );

    let cmd = FfmpegCommand::lavfi(source, output)
        .video_filter(filter)
        .output_args(encoding.to_video_args());

    FfmpegRunner::new().run(&cmd).await
}
