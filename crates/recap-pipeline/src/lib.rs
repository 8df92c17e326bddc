//! Core pipeline of the recap video generator.
//!
//! Phases: incremental scan, date resolution, day assignment, per-month
//! rendering with a clip cache and checkpoint/resume, final concatenation,
//! and soundtrack assembly. All ffmpeg work is delegated to `recap-media`.

pub mod assign;
pub mod checkpoint;
pub mod clip_cache;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod reports;
pub mod resolve;
pub mod scan;
pub mod soundtrack;

pub use assign::AssignmentMap;
pub use checkpoint::{Checkpoint, Phase};
pub use clip_cache::ClipCache;
pub use config::RecapConfig;
pub use error::{PipelineError, PipelineResult};
pub use pipeline::{regenerate_months, run_assign, run_full, run_render};
pub use soundtrack::add_soundtrack;
