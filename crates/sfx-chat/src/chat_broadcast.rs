//! In-process chat source fed through a `tokio::sync::broadcast` channel.
//!
//! Compiled only for tests and the `test-support` feature; the binary reads
//! chat from Twitch.

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::warn;

use crate::chat_contract::{
    normalize_channel_name, ChatError, ChatMessage, ChatSource, ChatSubscription,
};

const DEFAULT_BROADCAST_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
/// Chat source whose messages are published locally instead of read from a
/// chat network. Every subscription receives every message for its channel.
pub struct BroadcastChatSource {
    sender: broadcast::Sender<ChatMessage>,
}

impl Default for BroadcastChatSource {
    fn default() -> Self {
        Self::new(DEFAULT_BROADCAST_CAPACITY)
    }
}

impl BroadcastChatSource {
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes a message; returns how many live subscriptions saw it.
    pub fn publish(&self, channel: &str, sender: &str, text: &str) -> usize {
        let channel = channel.trim().trim_start_matches('#').to_ascii_lowercase();
        self.sender
            .send(ChatMessage::new(&channel, sender, text))
            .unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[async_trait]
impl ChatSource for BroadcastChatSource {
    async fn subscribe(&self, channel: &str) -> Result<Box<dyn ChatSubscription>, ChatError> {
        let channel = normalize_channel_name(channel)?;
        Ok(Box::new(BroadcastChatSubscription {
            channel,
            receiver: self.sender.subscribe(),
        }))
    }
}

struct BroadcastChatSubscription {
    channel: String,
    receiver: broadcast::Receiver<ChatMessage>,
}

#[async_trait]
impl ChatSubscription for BroadcastChatSubscription {
    async fn next_message(&mut self) -> Result<Option<ChatMessage>, ChatError> {
        loop {
            match self.receiver.recv().await {
                Ok(message) if message.channel == self.channel => return Ok(Some(message)),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(channel = %self.channel, skipped, "chat subscription lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return Ok(None),
            }
        }
    }
}
