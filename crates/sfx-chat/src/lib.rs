//! Chat-event sources for sfxbridge.
//!
//! Defines the [`ChatSource`]/[`ChatSubscription`] capability consumed by the
//! dispatch session loop and a Twitch implementation on top of `twitch-irc`.
//! The `test-support` feature adds an in-process broadcast source for tests
//! that need to inject chat lines without a network connection.

#[cfg(any(test, feature = "test-support"))]
pub mod chat_broadcast;
pub mod chat_contract;
pub mod twitch_chat_client;

#[cfg(any(test, feature = "test-support"))]
pub use chat_broadcast::*;
pub use chat_contract::*;
pub use twitch_chat_client::*;
