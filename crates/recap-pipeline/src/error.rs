//! Pipeline error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a pipeline phase.
///
/// Per-item failures (one file's date resolution or render) are handled where
/// they occur and never surface here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Assignment store not found at {0} (run the assignment phase first)")]
    MissingAssignments(PathBuf),

    #[error("Expected video not found: {0}")]
    MissingVideo(PathBuf),

    #[error("Invalid month number: {0} (must be 1-12)")]
    InvalidMonth(u32),

    #[error("No month videos were produced; nothing to concatenate")]
    NoMonthVideos,

    #[error("No audio segments could be assembled")]
    NoAudioSegments,

    #[error("Media error: {0}")]
    Media(#[from] recap_media::MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
