//! Viewer-facing HTTP surface for sfxbridge.
pub mod gateway_server;

pub use gateway_server::*;
