//! Date caption overlay.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use recap_models::EncodingConfig;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::filters::{self, CaptionCorner};
use crate::fsops;

/// Caption overlay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionStyle {
    /// Whether captions are drawn at all
    pub enabled: bool,
    /// Corner of the frame the caption sits in
    pub corner: CaptionCorner,
    /// Distance from the frame edges in pixels
    pub margin: u32,
    /// Font size in pixels
    pub font_size: u32,
    /// Drawtext color spec (e.g. "white@0.7")
    pub font_color: String,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            enabled: true,
            corner: CaptionCorner::BottomRight,
            margin: 20,
            font_size: 24,
            font_color: "white@0.7".to_string(),
        }
    }
}

/// Burn a caption into a clip, re-encoding into a sibling temp file and
/// replacing the original on success. The original is left untouched when
/// the render fails.
pub async fn caption_clip(
    path: impl AsRef<Path>,
    text: &str,
    style: &CaptionStyle,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    let path = path.as_ref();

    info!("Captioning '{}' onto {}", text, path.display());

    let tmp = path.with_extension("captioned.mp4");
    let filter = filters::corner_text(
        text,
        style.corner,
        style.margin,
        style.font_size,
        &style.font_color,
    );

    let cmd = FfmpegCommand::new(path, &tmp)
        .video_filter(filter)
        .output_args(encoding.to_video_args());

    match FfmpegRunner::new().run(&cmd).await {
        Ok(()) => fsops::replace_file(&tmp, path).await,
        Err(e) => {
            let _ = tokio::fs::remove_file(&tmp).await;
            Err(e)
        }
    }
}
