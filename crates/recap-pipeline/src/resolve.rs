//! Capture date resolution.
//!
//! Three timestamp sources compete for each file: a date embedded in the
//! filename, a metadata date (EXIF for images, container creation time for
//! videos), and the filesystem modification time. Resolution always produces
//! a date; metadata problems are swallowed, never propagated.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::{DateTime, Datelike, Local, NaiveDateTime};
use tracing::debug;

use recap_models::{extract_filename_date, DateSource, MediaKind};

/// Which competing source won the date decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chosen {
    Filename,
    Metadata,
}

/// Decide between a filename date and a metadata date for the target year.
///
/// - Both valid for the year: the chronologically earlier wins, because a
///   later metadata timestamp is more likely a re-save or download artifact
///   than the true capture moment. The filename wins ties.
/// - One valid: that one.
/// - Neither valid: the filename date is still used if it exists, otherwise
///   the metadata date; the caller filters by year afterward.
/// - Neither exists: `None`, and the caller falls back to mtime.
pub fn choose_date(
    filename_date: Option<NaiveDateTime>,
    metadata_date: Option<NaiveDateTime>,
    target_year: i32,
) -> Option<(NaiveDateTime, Chosen)> {
    let filename_valid = filename_date.filter(|d| d.year() == target_year);
    let metadata_valid = metadata_date.filter(|d| d.year() == target_year);

    match (filename_valid, metadata_valid) {
        (Some(f), Some(m)) => {
            if f <= m {
                Some((f, Chosen::Filename))
            } else {
                Some((m, Chosen::Metadata))
            }
        }
        (Some(f), None) => Some((f, Chosen::Filename)),
        (None, Some(m)) => Some((m, Chosen::Metadata)),
        (None, None) => filename_date
            .map(|f| (f, Chosen::Filename))
            .or(metadata_date.map(|m| (m, Chosen::Metadata))),
    }
}

/// Read an image's EXIF capture time, trying tags in priority order.
///
/// Any failure (no EXIF segment, corrupt tag, unparseable value) yields
/// `None`.
pub fn exif_date(path: impl AsRef<Path>) -> Option<NaiveDateTime> {
    let path = path.as_ref();
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut reader).ok()?;

    for tag in [
        exif::Tag::DateTimeOriginal,
        exif::Tag::DateTimeDigitized,
        exif::Tag::DateTime,
    ] {
        let Some(field) = exif.get_field(tag, exif::In::PRIMARY) else {
            continue;
        };
        let raw = field.display_value().to_string();
        if let Ok(dt) = NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S") {
            return Some(dt);
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(&raw, "%Y:%m:%d %H:%M:%S") {
            return Some(dt);
        }
        debug!("Unparseable EXIF {} value in {}: {}", tag, path.display(), raw);
    }
    None
}

/// Filesystem modification time in local time. Falls back to "now" when the
/// metadata cannot be read, so this path never fails.
fn mtime_date(path: &Path) -> NaiveDateTime {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map(|t| DateTime::<Local>::from(t).naive_local())
        .unwrap_or_else(|_| Local::now().naive_local())
}

/// Resolve the capture date of a media file.
///
/// Never fails: the mtime fallback always produces a result.
pub async fn resolve_date(
    path: impl AsRef<Path>,
    kind: MediaKind,
    target_year: i32,
) -> (NaiveDateTime, DateSource) {
    let path = path.as_ref();

    let filename_date = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(extract_filename_date);

    let (metadata_date, metadata_source) = match kind {
        MediaKind::Image | MediaKind::AnimatedImage => (exif_date(path), DateSource::Exif),
        MediaKind::Video => (
            recap_media::probe_creation_time(path).await,
            DateSource::VideoMetadata,
        ),
    };

    match choose_date(filename_date, metadata_date, target_year) {
        Some((date, Chosen::Filename)) => (date, DateSource::Filename),
        Some((date, Chosen::Metadata)) => (date, metadata_source),
        None => (mtime_date(path), DateSource::FileMtime),
    }
}
