//! Filename date extraction.
//!
//! Camera and messaging apps embed capture dates in file names in a handful
//! of recognizable shapes:
//!
//! - `20250102_161334.jpg` (date with time)
//! - `IMG-20250105-WA0010.jpg`
//! - `VID_20250323_181709.mp4`
//! - `2025-03-14_photo.jpg`

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

/// Earliest year a filename date is considered plausible.
pub const FILENAME_YEAR_MIN: i32 = 2000;
/// Latest year a filename date is considered plausible.
pub const FILENAME_YEAR_MAX: i32 = 2030;

static DATE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{8})_(\d{6})").expect("valid regex"));
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d{8})").expect("valid regex"));
static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})-(\d{2})-(\d{2})").expect("valid regex"));

fn plausible_year(year: i32) -> bool {
    (FILENAME_YEAR_MIN..=FILENAME_YEAR_MAX).contains(&year)
}

fn parse_compact_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y%m%d").ok()
}

/// Extract a date (optionally with time) embedded in a file name.
///
/// Patterns are tried in order; the first pattern that yields a plausible
/// date (year within [`FILENAME_YEAR_MIN`]..=[`FILENAME_YEAR_MAX`]) wins and
/// later patterns are not tried:
///
/// 1. `YYYYMMDD_HHMMSS`
/// 2. bare `YYYYMMDD` anywhere in the name
/// 3. `YYYY-MM-DD`
pub fn extract_filename_date(filename: &str) -> Option<NaiveDateTime> {
    if let Some(caps) = DATE_TIME_RE.captures(filename) {
        let date = parse_compact_date(&caps[1]);
        let time = NaiveTime::parse_from_str(&caps[2], "%H%M%S").ok();
        if let (Some(date), Some(time)) = (date, time) {
            if plausible_year(date.year()) {
                return Some(date.and_time(time));
            }
        }
    }

    if let Some(caps) = DATE_RE.captures(filename) {
        if let Some(date) = parse_compact_date(&caps[1]) {
            if plausible_year(date.year()) {
                return Some(date.and_hms_opt(0, 0, 0).expect("midnight is valid"));
            }
        }
    }

    if let Some(caps) = ISO_DATE_RE.captures(filename) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        if plausible_year(year) {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                return Some(date.and_hms_opt(0, 0, 0).expect("midnight is valid"));
            }
        }
    }

    None
}
