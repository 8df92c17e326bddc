//! FFmpeg glue for the recap pipeline.
//!
//! Everything that shells out to ffmpeg/ffprobe lives here: probing,
//! per-clip renders, the month separator cards, caption burns,
//! concatenation and the soundtrack operations. Higher-level crates decide
//! WHAT to render; this crate only knows HOW.

pub mod animated;
pub mod audio;
pub mod caption;
pub mod command;
pub mod concat;
pub mod error;
pub mod filters;
pub mod fsops;
pub mod normalize;
pub mod probe;
pub mod progress;
pub mod separator;
pub mod still;
pub mod trim;

pub use caption::CaptionStyle;
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use filters::CaptionCorner;
pub use probe::{get_duration, probe_creation_time, probe_media, MediaInfo};
pub use progress::FfmpegProgress;
pub use still::PanZoom;
