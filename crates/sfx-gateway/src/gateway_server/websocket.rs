//! Viewer WebSocket sessions.
//!
//! Each connection opens its own chat subscription and runs the dispatch
//! session against the shared gate until the viewer leaves or chat fails.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use sfx_dispatch::{run_dispatch_session, PayloadTransport, TransportError};
use tracing::{info, warn};

use super::GatewayServerState;

/// Write half of a viewer socket.
pub(super) struct WebSocketTransport {
    sink: SplitSink<WebSocket, Message>,
}

impl WebSocketTransport {
    async fn close(mut self) {
        let _ = self.sink.send(Message::Close(None)).await;
        let _ = self.sink.close().await;
    }
}

#[async_trait]
impl PayloadTransport for WebSocketTransport {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        self.sink
            .send(Message::Text(text.into()))
            .await
            .map_err(|error| TransportError::Write(error.to_string()))
    }
}

async fn wait_for_viewer_close(source: &mut SplitStream<WebSocket>) {
    loop {
        match source.next().await {
            None | Some(Err(_)) | Some(Ok(Message::Close(_))) => return,
            Some(Ok(_)) => {}
        }
    }
}

pub(super) async fn run_viewer_socket(state: Arc<GatewayServerState>, socket: WebSocket) {
    let (sink, mut source) = socket.split();
    let mut transport = WebSocketTransport { sink };

    let mut subscription = match state.chat_source.subscribe(&state.config.channel).await {
        Ok(subscription) => subscription,
        Err(error) => {
            warn!(channel = %state.config.channel, error = %error, "failed to subscribe to chat");
            transport.close().await;
            return;
        }
    };
    info!(channel = %state.config.channel, "viewer connected");

    let session = run_dispatch_session(
        &state.gate,
        subscription.as_mut(),
        &mut transport,
        state.clock.as_ref(),
    );
    let session_result = tokio::select! {
        result = session => Some(result),
        () = wait_for_viewer_close(&mut source) => None,
    };

    match session_result {
        Some(Ok(report)) => info!(
            received = report.received_messages,
            dispatched = report.dispatched,
            rejected = report.cooldown_rejections,
            failed = report.failed_dispatches,
            "chat stream ended; closing viewer"
        ),
        Some(Err(error)) => warn!(
            channel = %state.config.channel,
            error = %error,
            "chat subscription failed; closing viewer"
        ),
        None => info!(channel = %state.config.channel, "viewer disconnected"),
    }
    drop(subscription);
    transport.close().await;
}
