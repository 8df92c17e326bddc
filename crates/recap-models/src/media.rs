//! Media kinds and per-day assignment records.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Image extensions accepted by the scanner (lowercase, no dot).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "heic", "gif"];

/// Video extensions accepted by the scanner (lowercase, no dot).
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv"];

/// Kind of a media file.
///
/// Animated images are a distinct kind: a `.gif` is never classified as a
/// plain image even though its extension appears in [`IMAGE_EXTENSIONS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    #[serde(rename = "image")]
    Image,
    #[serde(rename = "video")]
    Video,
    #[serde(rename = "gif")]
    AnimatedImage,
}

impl MediaKind {
    /// Classify a path by extension. Animated-image detection takes priority.
    ///
    /// Returns `None` for unsupported extensions.
    pub fn from_path(path: impl AsRef<Path>) -> Option<MediaKind> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())?;

        if ext == "gif" {
            Some(MediaKind::AnimatedImage)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Video)
        } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Image)
        } else {
            None
        }
    }

    /// Whether clips rendered from this kind need re-normalization before
    /// concatenation. Stills are rendered pre-normalized.
    pub fn needs_normalization(&self) -> bool {
        matches!(self, MediaKind::Video | MediaKind::AnimatedImage)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::AnimatedImage => "gif",
        };
        write!(f, "{}", s)
    }
}

/// Whether a path carries a supported media extension.
pub fn is_supported_media(path: impl AsRef<Path>) -> bool {
    MediaKind::from_path(path).is_some()
}

/// Which source supplied a resolved capture date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DateSource {
    /// Date pattern embedded in the filename
    #[serde(rename = "filename")]
    Filename,
    /// EXIF capture-time tag of an image
    #[serde(rename = "exif")]
    Exif,
    /// Container-level creation time of a video
    #[serde(rename = "video_metadata")]
    VideoMetadata,
    /// Filesystem modification time fallback
    #[serde(rename = "file_mtime")]
    FileMtime,
}

impl fmt::Display for DateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DateSource::Filename => "filename",
            DateSource::Exif => "exif",
            DateSource::VideoMetadata => "video_metadata",
            DateSource::FileMtime => "file_mtime",
        };
        write!(f, "{}", s)
    }
}

/// One media file assigned to a calendar day.
///
/// Serialized shape matches the persisted assignment store:
/// `{filepath, filename, type, date, source}` with `date` in ISO-8601.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRecord {
    /// Absolute path to the original file
    pub filepath: PathBuf,
    /// File name component, including extension
    pub filename: String,
    /// Media kind
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// Resolved capture timestamp
    pub date: NaiveDateTime,
    /// Where the timestamp came from
    pub source: DateSource,
}

impl MediaRecord {
    /// File name with the extension stripped. Key for the rendered clip cache.
    pub fn base_name(&self) -> &str {
        self.filename
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&self.filename)
    }
}
