//! Soundtrack assembly: per-month segments, crossfades, final mux.

use std::path::{Path, PathBuf};

use rand::Rng;
use tracing::{debug, info};

use recap_models::EncodingConfig;

use crate::command::{run_ffmpeg, FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::probe;

/// Cut a segment of `duration_secs` from a random point of an audio track,
/// looping the track when it is shorter than the segment.
pub async fn extract_audio_segment(
    track: impl AsRef<Path>,
    output: impl AsRef<Path>,
    duration_secs: f64,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    let track = track.as_ref();
    let output = output.as_ref();

    let track_secs = probe::get_duration(track).await.unwrap_or(0.0);
    debug!(
        "Audio segment: {} ({:.1}s) -> {:.1}s",
        track.display(),
        track_secs,
        duration_secs
    );

    let mut cmd = FfmpegCommand::new(track, output);
    let slack = track_secs - duration_secs;
    if track_secs > 0.0 && slack <= 0.0 {
        cmd = cmd.input_arg("-stream_loop").input_arg("-1");
    } else if slack > 0.0 {
        cmd = cmd.seek(rand::rng().random_range(0.0..slack));
    }

    let cmd = cmd
        .duration(duration_secs)
        .output_arg("-vn")
        .output_args(encoding.to_audio_args());

    FfmpegRunner::new().run(&cmd).await
}

/// Join audio segments with crossfades between consecutive pairs.
///
/// Built as a single filter_complex chain: `[0][1]acrossfade[a1]`,
/// `[a1][2]acrossfade[a2]`, and so on. A single segment is copied through.
pub async fn crossfade_segments(
    segments: &[PathBuf],
    output: impl AsRef<Path>,
    crossfade_secs: f64,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    let output = output.as_ref();

    match segments.len() {
        0 => {
            return Err(MediaError::InvalidMedia(
                "No audio segments to join".to_string(),
            ))
        }
        1 => {
            tokio::fs::copy(&segments[0], output).await?;
            return Ok(());
        }
        _ => {}
    }

    info!(
        "Crossfading {} audio segments -> {}",
        segments.len(),
        output.display()
    );

    let mut args: Vec<String> = vec!["-y".into(), "-v".into(), "error".into()];
    for seg in segments {
        args.push("-i".into());
        args.push(seg.to_string_lossy().to_string());
    }

    let mut chain = String::new();
    let mut prev = "[0:a]".to_string();
    for (i, _) in segments.iter().enumerate().skip(1) {
        let label = if i == segments.len() - 1 {
            "[out]".to_string()
        } else {
            format!("[a{}]", i)
        };
        chain.push_str(&format!(
            "{}[{}:a]acrossfade=d={}:c1=tri:c2=tri{};",
            prev, i, crossfade_secs, label
        ));
        prev = label;
    }
    chain.pop(); // trailing semicolon

    args.push("-filter_complex".into());
    args.push(chain);
    args.push("-map".into());
    args.push("[out]".into());
    args.extend(encoding.to_audio_args());
    args.push(output.to_string_lossy().to_string());

    run_ffmpeg(&args).await
}

/// Apply a fade-in and fade-out to an assembled soundtrack.
pub async fn fade_soundtrack(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    total_secs: f64,
    fade_secs: f64,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    let filter = format!(
        "afade=t=in:st=0:d={fade},afade=t=out:st={out_start}:d={fade}",
        fade = fade_secs,
        out_start = (total_secs - fade_secs).max(0.0)
    );

    let cmd = FfmpegCommand::new(input.as_ref(), output.as_ref())
        .audio_filter(filter)
        .output_args(encoding.to_audio_args());

    FfmpegRunner::new().run(&cmd).await
}

/// Mux a soundtrack under a finished video without re-encoding the video.
///
/// `-shortest` trims the audio to the video length, so a slightly long
/// soundtrack never stretches the output.
pub async fn mux_soundtrack(
    video: impl AsRef<Path>,
    audio: impl AsRef<Path>,
    output: impl AsRef<Path>,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    let video = video.as_ref();
    let audio = audio.as_ref();
    let output = output.as_ref();

    info!(
        "Muxing soundtrack {} under {} -> {}",
        audio.display(),
        video.display(),
        output.display()
    );

    let mut args: Vec<String> = vec![
        "-y".into(),
        "-v".into(),
        "error".into(),
        "-i".into(),
        video.to_string_lossy().to_string(),
        "-i".into(),
        audio.to_string_lossy().to_string(),
        "-map".into(),
        "0:v:0".into(),
        "-map".into(),
        "1:a:0".into(),
        "-c:v".into(),
        "copy".into(),
    ];
    args.extend(encoding.to_audio_args());
    args.push("-shortest".into());
    args.push(output.to_string_lossy().to_string());

    run_ffmpeg(&args).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_crossfade_rejects_empty() {
        let enc = EncodingConfig::default();
        let err = crossfade_segments(&[], "/tmp/out.m4a", 2.0, &enc)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::InvalidMedia(_)));
    }
}
