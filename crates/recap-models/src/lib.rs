//! Shared data models for the recap video generator.
//!
//! This crate holds the pure types the pipeline crates agree on:
//! - Media kinds and per-day assignment records
//! - File signatures for change detection
//! - Filename date extraction
//! - Video encoding configuration

pub mod dates;
pub mod encoding;
pub mod media;
pub mod signature;

pub use dates::{extract_filename_date, FILENAME_YEAR_MAX, FILENAME_YEAR_MIN};
pub use encoding::EncodingConfig;
pub use media::{is_supported_media, DateSource, MediaKind, MediaRecord};
pub use signature::FileSignature;
