//! Clip concatenation via the concat demuxer.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use recap_models::EncodingConfig;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::probe;
use crate::progress::FfmpegProgress;

/// Escape a path for a concat demuxer list file entry.
fn concat_list_entry(path: &Path) -> String {
    let escaped = path.to_string_lossy().replace('\'', "'\\''");
    format!("file '{}'\n", escaped)
}

/// Write the concat demuxer list file for `clips` into a temp file.
async fn write_concat_list(clips: &[PathBuf]) -> MediaResult<tempfile::NamedTempFile> {
    let list = tempfile::Builder::new()
        .prefix("concat_")
        .suffix(".txt")
        .tempfile()?;

    let mut contents = String::new();
    for clip in clips {
        contents.push_str(&concat_list_entry(clip));
    }

    let mut f = tokio::fs::File::create(list.path()).await?;
    f.write_all(contents.as_bytes()).await?;
    f.flush().await?;

    Ok(list)
}

/// Concatenate clips into one video, re-encoding so that minor stream
/// differences between cached and freshly rendered clips cannot break the
/// output. `progress_callback` receives each FFmpeg progress snapshot.
pub async fn concat_clips<F>(
    clips: &[PathBuf],
    output: impl AsRef<Path>,
    encoding: &EncodingConfig,
    progress_callback: F,
) -> MediaResult<()>
where
    F: FnMut(FfmpegProgress),
{
    let output = output.as_ref();
    if clips.is_empty() {
        return Err(MediaError::InvalidMedia(
            "No clips to concatenate".to_string(),
        ));
    }

    info!(
        "Concatenating {} clips -> {}",
        clips.len(),
        output.display()
    );

    let list = write_concat_list(clips).await?;
    debug!("Concat list at {}", list.path().display());

    let cmd = FfmpegCommand::new(list.path(), output)
        .input_args(["-f", "concat", "-safe", "0"])
        .output_args(encoding.to_video_args())
        .output_args(encoding.to_audio_args());

    let result = FfmpegRunner::new()
        .run_with_progress(&cmd, progress_callback)
        .await;

    // keep the list file alive until ffmpeg is done
    drop(list);
    result
}

/// Sum the durations of `clips` in milliseconds, skipping unreadable files.
pub async fn total_duration_ms(clips: &[PathBuf]) -> i64 {
    let mut total = 0.0;
    for clip in clips {
        if let Ok(d) = probe::get_duration(clip).await {
            total += d;
        }
    }
    (total * 1000.0) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concat_list_entry_escaping() {
        let entry = concat_list_entry(Path::new("/tmp/it's here.mp4"));
        assert_eq!(entry, "file '/tmp/it'\\''s here.mp4'\n");
    }

    #[tokio::test]
    async fn test_concat_rejects_empty() {
        let enc = EncodingConfig::default();
        let err = concat_clips(&[], "/tmp/out.mp4", &enc, |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::InvalidMedia(_)));
    }

    #[tokio::test]
    async fn test_write_concat_list() {
        let clips = vec![PathBuf::from("/a/one.mp4"), PathBuf::from("/a/two.mp4")];
        let list = write_concat_list(&clips).await.unwrap();
        let contents = std::fs::read_to_string(list.path()).unwrap();
        assert_eq!(contents, "file '/a/one.mp4'\nfile '/a/two.mp4'\n");
    }
}
