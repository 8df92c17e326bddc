//! Still image to video rendering.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use recap_models::EncodingConfig;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::filters;

/// Pan/zoom (Ken Burns) settings for still images.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PanZoom {
    /// Whether the effect is applied at all
    pub enabled: bool,
    /// Zoom factor at the first frame
    pub zoom_start: f64,
    /// Zoom factor at the last frame
    pub zoom_end: f64,
}

impl Default for PanZoom {
    fn default() -> Self {
        Self {
            enabled: true,
            zoom_start: 1.0,
            zoom_end: 1.10,
        }
    }
}

impl PanZoom {
    /// Zoom range for this render, optionally reversed for a zoom-out.
    pub fn range(&self, zoom_in: bool) -> (f64, f64) {
        if zoom_in {
            (self.zoom_start, self.zoom_end)
        } else {
            (self.zoom_end, self.zoom_start)
        }
    }
}

/// Render a still image into a letterboxed clip with a pan/zoom effect.
pub async fn render_photo_clip(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    duration_secs: f64,
    zoom_in: bool,
    pan_zoom: &PanZoom,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    let input = input.as_ref();
    let output = output.as_ref();

    info!(
        "Rendering photo clip: {} -> {} ({:.2}s, zoom {})",
        input.display(),
        output.display(),
        duration_secs,
        if zoom_in { "in" } else { "out" }
    );

    let (zoom_start, zoom_end) = pan_zoom.range(zoom_in);
    let filter = filters::pan_zoom(
        encoding.width,
        encoding.height,
        encoding.fps,
        duration_secs,
        zoom_start,
        zoom_end,
    );

    let cmd = FfmpegCommand::new(input, output)
        .loop_input()
        .video_filter(filter)
        .duration(duration_secs)
        .output_args(encoding.to_video_args());

    FfmpegRunner::new().run(&cmd).await
}

/// Render a still image into a letterboxed clip without any effect.
///
/// Fallback path when the pan/zoom render fails.
pub async fn render_static_photo_clip(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    duration_secs: f64,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    let input = input.as_ref();
    let output = output.as_ref();

    info!(
        "Rendering static photo clip: {} -> {} ({:.2}s)",
        input.display(),
        output.display(),
        duration_secs
    );

    let filter = format!(
        "{},fps={}",
        filters::letterbox(encoding.width, encoding.height),
        encoding.fps
    );

    let cmd = FfmpegCommand::new(input, output)
        .loop_input()
        .video_filter(filter)
        .duration(duration_secs)
        .output_args(encoding.to_video_args());

    FfmpegRunner::new().run(&cmd).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pan_zoom_range() {
        let pz = PanZoom::default();
        assert_eq!(pz.range(true), (1.0, 1.10));
        assert_eq!(pz.range(false), (1.10, 1.0));
    }
}
