//! In-place clip normalization.

use std::path::Path;

use tracing::debug;

use recap_models::EncodingConfig;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::filters;
use crate::fsops;

/// Re-encode a clip to the shared frame geometry and rate, replacing it on
/// success. Applied to video- and gif-derived clips before concatenation;
/// still-derived clips are rendered pre-normalized.
pub async fn normalize_clip(path: impl AsRef<Path>, encoding: &EncodingConfig) -> MediaResult<()> {
    let path = path.as_ref();
    debug!("Normalizing {}", path.display());

    let tmp = path.with_extension("normalized.mp4");
    let cmd = FfmpegCommand::new(path, &tmp)
        .video_filter(filters::normalize(
            encoding.width,
            encoding.height,
            encoding.fps,
        ))
        .output_args(encoding.to_video_args());

    match FfmpegRunner::new().run(&cmd).await {
        Ok(()) => fsops::replace_file(&tmp, path).await,
        Err(e) => {
            let _ = tokio::fs::remove_file(&tmp).await;
            Err(e)
        }
    }
}
