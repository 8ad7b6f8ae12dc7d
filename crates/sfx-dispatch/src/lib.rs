//! Command dispatch gate for chat-triggered sound payloads.
//!
//! A chat line flows through the [`dispatch_matcher`], the cooldown rules in
//! [`dispatch_state`], the [`dispatch_payload`] loader and finally the
//! [`dispatch_emitter`], all orchestrated by [`dispatch_gate::DispatchGate`].
//! One gate is shared by every viewer connection so cooldowns are global.

pub mod dispatch_emitter;
pub mod dispatch_gate;
pub mod dispatch_matcher;
pub mod dispatch_payload;
pub mod dispatch_state;

pub use dispatch_emitter::*;
pub use dispatch_gate::*;
pub use dispatch_matcher::*;
pub use dispatch_payload::*;
pub use dispatch_state::*;
