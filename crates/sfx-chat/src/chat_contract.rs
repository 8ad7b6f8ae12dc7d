//! Chat message shape and the subscription capability.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One chat line observed on a channel.
pub struct ChatMessage {
    pub channel: String,
    pub sender: String,
    pub text: String,
}

impl ChatMessage {
    pub fn new(channel: &str, sender: &str, text: &str) -> Self {
        Self {
            channel: channel.to_string(),
            sender: sender.to_string(),
            text: text.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("invalid chat channel name '{0}'")]
    InvalidChannel(String),
    #[error("chat login rejected: {0}")]
    LoginRejected(String),
}

#[async_trait]
/// Opens chat subscriptions for a named channel.
pub trait ChatSource: Send + Sync {
    async fn subscribe(&self, channel: &str) -> Result<Box<dyn ChatSubscription>, ChatError>;
}

#[async_trait]
/// A lazy, non-restartable stream of chat messages.
///
/// `Ok(None)` marks a clean end of stream. Any `Err` is terminal for the
/// subscription.
pub trait ChatSubscription: Send {
    async fn next_message(&mut self) -> Result<Option<ChatMessage>, ChatError>;
}

/// Normalizes a configured channel into its lowercase IRC form without `#`.
pub fn normalize_channel_name(raw: &str) -> Result<String, ChatError> {
    let trimmed = raw.trim().trim_start_matches('#');
    if trimmed.is_empty()
        || !trimmed
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
    {
        return Err(ChatError::InvalidChannel(raw.to_string()));
    }
    Ok(trimmed.to_ascii_lowercase())
}
