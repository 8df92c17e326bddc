//! Pipeline configuration.
//!
//! One [`RecapConfig`] value is built at startup (defaults, then environment,
//! then CLI flags) and passed by reference into every component. Nothing in
//! the pipeline reads ambient global settings.

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use recap_media::{CaptionStyle, PanZoom};
use recap_models::EncodingConfig;

/// Default length of a clip rendered from a photo, in seconds.
pub const DEFAULT_PHOTO_SECS: f64 = 0.8;
/// Default length of a clip trimmed from a video, in seconds.
pub const DEFAULT_VIDEO_SECS: f64 = 1.25;
/// Default length cap for animated-image clips, in seconds.
pub const DEFAULT_GIF_MAX_SECS: f64 = 1.25;
/// Default month separator card length, in seconds.
pub const DEFAULT_SEPARATOR_SECS: f64 = 1.0;
/// Default fade length on separator cards, in seconds.
pub const DEFAULT_FADE_SECS: f64 = 0.3;
/// Default separator card font size.
pub const DEFAULT_SEPARATOR_FONT_SIZE: u32 = 80;
/// Default fade applied to the assembled soundtrack, in seconds.
pub const DEFAULT_AUDIO_FADE_SECS: f64 = 2.0;
/// Default crossfade between month audio segments. Matches the separator
/// card length so each song change sits under its month's title card.
pub const DEFAULT_CROSSFADE_SECS: f64 = DEFAULT_SEPARATOR_SECS;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const MONTH_NAMES_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Configuration for a recap run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecapConfig {
    /// Folder holding the source photos and videos (scanned top level only)
    pub input_dir: PathBuf,
    /// Working folder: persisted state, reports, and the sub-folders below
    pub output_dir: PathBuf,
    /// Folder with one audio track per month (matched by `NN` name prefix)
    pub audio_dir: PathBuf,
    /// The single calendar year the pipeline filters for
    pub target_year: i32,

    /// Photo clip length in seconds
    pub photo_secs: f64,
    /// Video clip length in seconds
    pub video_secs: f64,
    /// Animated-image clip length cap in seconds
    pub gif_max_secs: f64,
    /// Month separator card length in seconds
    pub separator_secs: f64,
    /// Fade length on separator cards in seconds
    pub fade_secs: f64,
    /// Separator card font size
    pub separator_font_size: u32,
    /// Crossfade between month audio segments in seconds
    pub crossfade_secs: f64,
    /// Fade in/out on the assembled soundtrack in seconds
    pub audio_fade_secs: f64,

    /// Encoding settings shared by every render step
    pub encoding: EncodingConfig,
    /// Pan/zoom effect settings for stills
    pub pan_zoom: PanZoom,
    /// Date caption overlay settings
    pub caption: CaptionStyle,
}

impl Default for RecapConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("media"),
            output_dir: PathBuf::from("recap"),
            audio_dir: PathBuf::from("audio"),
            target_year: 2025,
            photo_secs: DEFAULT_PHOTO_SECS,
            video_secs: DEFAULT_VIDEO_SECS,
            gif_max_secs: DEFAULT_GIF_MAX_SECS,
            separator_secs: DEFAULT_SEPARATOR_SECS,
            fade_secs: DEFAULT_FADE_SECS,
            separator_font_size: DEFAULT_SEPARATOR_FONT_SIZE,
            crossfade_secs: DEFAULT_CROSSFADE_SECS,
            audio_fade_secs: DEFAULT_AUDIO_FADE_SECS,
            encoding: EncodingConfig::default(),
            pan_zoom: PanZoom::default(),
            caption: CaptionStyle::default(),
        }
    }
}

impl RecapConfig {
    /// Build a config from defaults overridden by `RECAP_*` environment
    /// variables. Unset or unparseable variables keep the default.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("RECAP_INPUT_DIR") {
            config.input_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = env::var("RECAP_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = env::var("RECAP_AUDIO_DIR") {
            config.audio_dir = PathBuf::from(dir);
        }
        if let Ok(year) = env::var("RECAP_YEAR") {
            if let Ok(year) = year.parse() {
                config.target_year = year;
            }
        }

        config
    }

    /// English month name, `month` in 1..=12.
    pub fn month_name(&self, month: u32) -> &'static str {
        MONTH_NAMES[(month - 1) as usize]
    }

    /// Short date text burned onto clips, e.g. `3 Jan 2025`.
    pub fn caption_text(&self, date: chrono::NaiveDate) -> String {
        use chrono::Datelike;
        format!(
            "{} {} {}",
            date.day(),
            MONTH_NAMES_SHORT[(date.month() - 1) as usize],
            date.year()
        )
    }

    /// Title drawn on a month separator card, e.g. `July 2025`.
    pub fn separator_title(&self, month: u32) -> String {
        format!("{} {}", self.month_name(month), self.target_year)
    }

    // Persisted state and reports live directly under the working folder.

    pub fn assignment_path(&self) -> PathBuf {
        self.output_dir.join("media_assignment.json")
    }

    pub fn scan_cache_path(&self) -> PathBuf {
        self.output_dir.join("media_scan_cache.json")
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        self.output_dir.join("checkpoint.json")
    }

    pub fn visual_report_path(&self) -> PathBuf {
        self.output_dir.join("report_visual.txt")
    }

    pub fn csv_report_path(&self) -> PathBuf {
        self.output_dir.join("report_detailed.csv")
    }

    /// Rendered per-item clips, kept between runs as the clip cache.
    pub fn processed_dir(&self) -> PathBuf {
        self.output_dir.join("processed")
    }

    /// Scratch space, removed after a successful run.
    pub fn temp_dir(&self) -> PathBuf {
        self.output_dir.join("temp")
    }

    /// Month videos and the final artifacts.
    pub fn video_dir(&self) -> PathBuf {
        self.output_dir.join("output")
    }

    pub fn month_video_path(&self, month: u32) -> PathBuf {
        self.video_dir()
            .join(format!("month_{:02}_{}.mp4", month, self.month_name(month)))
    }

    pub fn separator_path(&self, month: u32) -> PathBuf {
        self.processed_dir()
            .join(format!("separator_{:02}.mp4", month))
    }

    pub fn month_temp_dir(&self, month: u32) -> PathBuf {
        self.temp_dir().join(format!("month_{:02}", month))
    }

    pub fn final_video_path(&self) -> PathBuf {
        self.video_dir()
            .join(format!("{}_recap.mp4", self.target_year))
    }

    pub fn final_video_with_audio_path(&self) -> PathBuf {
        self.video_dir()
            .join(format!("{}_recap_with_audio.mp4", self.target_year))
    }

    /// Clip index base for a month; leaves room for 1000 clips per month so
    /// processed-file names sort chronologically.
    pub fn clip_index_base(&self, month: u32) -> u32 {
        (month - 1) * 1000
    }

    /// Override the working folders from CLI flags.
    pub fn with_dirs(mut self, input: Option<&Path>, output: Option<&Path>) -> Self {
        if let Some(dir) = input {
            self.input_dir = dir.to_path_buf();
        }
        if let Some(dir) = output {
            self.output_dir = dir.to_path_buf();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_paths() {
        let config = RecapConfig {
            output_dir: PathBuf::from("/work"),
            ..Default::default()
        };
        assert_eq!(
            config.month_video_path(7),
            PathBuf::from("/work/output/month_07_July.mp4")
        );
        assert_eq!(
            config.separator_path(3),
            PathBuf::from("/work/processed/separator_03.mp4")
        );
        assert_eq!(
            config.final_video_path(),
            PathBuf::from("/work/output/2025_recap.mp4")
        );
    }

    #[test]
    fn test_clip_index_base() {
        let config = RecapConfig::default();
        assert_eq!(config.clip_index_base(1), 0);
        assert_eq!(config.clip_index_base(7), 6000);
    }

    #[test]
    fn test_crossfade_matches_separator_length() {
        let config = RecapConfig::default();
        assert_eq!(config.crossfade_secs, config.separator_secs);
    }

    #[test]
    fn test_caption_text() {
        let config = RecapConfig::default();
        let date = chrono::NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();
        assert_eq!(config.caption_text(date), "3 Jan 2025");
    }
}
