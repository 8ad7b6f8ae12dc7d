//! Twitch chat subscription built on the `twitch-irc` client.
//!
//! The client owns the connection: login, PING/PONG keepalive, reconnects and
//! IRC parsing (including `/me` action unwrapping). This module only maps the
//! resulting [`ServerMessage`]s onto [`ChatMessage`]s for one channel.

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};
use twitch_irc::login::StaticLoginCredentials;
use twitch_irc::message::ServerMessage;
use twitch_irc::{ClientConfig, SecureWSTransport, TwitchIRCClient};

use crate::chat_contract::{
    normalize_channel_name, ChatError, ChatMessage, ChatSource, ChatSubscription,
};

const OAUTH_PREFIX: &str = "oauth:";

type TwitchClient = TwitchIRCClient<SecureWSTransport, StaticLoginCredentials>;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Optional authenticated login; anonymous read-only login otherwise.
pub struct TwitchCredentials {
    pub username: String,
    pub oauth_token: String,
}

impl TwitchCredentials {
    /// Lowercases the login and strips an `oauth:` prefix; the client adds its own.
    pub fn login_credentials(&self) -> StaticLoginCredentials {
        let token = self.oauth_token.trim();
        let token = token.strip_prefix(OAUTH_PREFIX).unwrap_or(token);
        StaticLoginCredentials::new(
            self.username.trim().to_ascii_lowercase(),
            Some(token.to_string()),
        )
    }
}

/// Notices Twitch sends when a login is refused.
pub fn is_login_failure_notice(text: &str) -> bool {
    let lowered = text.to_ascii_lowercase();
    lowered.contains("login authentication failed") || lowered.contains("improperly formatted auth")
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TwitchChatEvent {
    Message(ChatMessage),
    LoginRejected(String),
    Ignored,
}

fn classify_server_message(message: ServerMessage) -> TwitchChatEvent {
    match message {
        ServerMessage::Privmsg(privmsg) => TwitchChatEvent::Message(ChatMessage::new(
            &privmsg.channel_login,
            &privmsg.sender.login,
            &privmsg.message_text,
        )),
        ServerMessage::Notice(notice) if is_login_failure_notice(&notice.message_text) => {
            TwitchChatEvent::LoginRejected(notice.message_text)
        }
        _ => TwitchChatEvent::Ignored,
    }
}

#[derive(Debug, Clone, Default)]
/// Connects to Twitch chat over secure WebSocket, anonymously unless
/// credentials are supplied.
pub struct TwitchChatSource {
    credentials: Option<TwitchCredentials>,
}

impl TwitchChatSource {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_credentials(credentials: Option<TwitchCredentials>) -> Self {
        Self { credentials }
    }

    fn client_config(&self) -> ClientConfig<StaticLoginCredentials> {
        match &self.credentials {
            Some(credentials) => ClientConfig::new_simple(credentials.login_credentials()),
            None => ClientConfig::default(),
        }
    }
}

#[async_trait]
impl ChatSource for TwitchChatSource {
    async fn subscribe(&self, channel: &str) -> Result<Box<dyn ChatSubscription>, ChatError> {
        let channel = normalize_channel_name(channel)?;
        let (incoming, client) = TwitchClient::new(self.client_config());
        client
            .join(channel.clone())
            .map_err(|error| ChatError::InvalidChannel(format!("{channel}: {error}")))?;
        info!(
            channel = %channel,
            authenticated = self.credentials.is_some(),
            "joined twitch chat"
        );
        Ok(Box::new(TwitchChatSubscription::new(
            channel,
            incoming,
            Some(client),
        )))
    }
}

/// Live subscription to one Twitch channel.
pub struct TwitchChatSubscription {
    channel: String,
    incoming: UnboundedReceiver<ServerMessage>,
    // Dropping the client closes the connection.
    _client: Option<TwitchClient>,
}

impl TwitchChatSubscription {
    fn new(
        channel: String,
        incoming: UnboundedReceiver<ServerMessage>,
        client: Option<TwitchClient>,
    ) -> Self {
        Self {
            channel,
            incoming,
            _client: client,
        }
    }
}

#[async_trait]
impl ChatSubscription for TwitchChatSubscription {
    async fn next_message(&mut self) -> Result<Option<ChatMessage>, ChatError> {
        loop {
            let Some(message) = self.incoming.recv().await else {
                info!(channel = %self.channel, "twitch chat stream closed");
                return Ok(None);
            };
            match classify_server_message(message) {
                TwitchChatEvent::Message(message) if message.channel == self.channel => {
                    return Ok(Some(message));
                }
                TwitchChatEvent::Message(_) | TwitchChatEvent::Ignored => {}
                TwitchChatEvent::LoginRejected(text) => {
                    warn!(channel = %self.channel, notice = %text, "twitch chat login rejected");
                    return Err(ChatError::LoginRejected(text));
                }
            }
        }
    }
}
