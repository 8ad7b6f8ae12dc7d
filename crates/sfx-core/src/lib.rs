//! Foundational low-level utilities shared across sfxbridge crates.
//!
//! Provides the wall-clock seam used by cooldown bookkeeping and the asset
//! path guard used when serving files from the audio directory.

pub mod asset_paths;
pub mod time_utils;

pub use asset_paths::resolve_asset_path;
pub use time_utils::{current_unix_timestamp, Clock, ManualClock, SystemClock};
