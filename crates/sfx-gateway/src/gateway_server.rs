//! Axum server that pairs each viewer WebSocket with a chat subscription.
//!
//! | Path | Description |
//! |------|-------------|
//! | `/` | Viewer page listing the command table and playing received sounds |
//! | `/ws` | Viewer WebSocket; one `data:` URI text frame per dispatch |
//! | `/audio/{*path}` | Raw audio assets from the configured directory |
//! | `/healthz` | JSON status with cooldown state |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{ws::WebSocketUpgrade, Path as AxumPath, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use sfx_chat::ChatSource;
use sfx_core::Clock;
use sfx_dispatch::DispatchGate;
use tokio::net::TcpListener;
use tracing::info;

mod assets;
mod viewer_page;
mod websocket;

use assets::serve_audio_asset;
use viewer_page::render_viewer_page;
use websocket::run_viewer_socket;

pub const VIEWER_PAGE_ENDPOINT: &str = "/";
pub const VIEWER_WEBSOCKET_ENDPOINT: &str = "/ws";
pub const AUDIO_ASSET_ENDPOINT: &str = "/audio/{*path}";
pub const HEALTHZ_ENDPOINT: &str = "/healthz";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayServerConfig {
    pub bind: String,
    pub channel: String,
    pub audio_dir: PathBuf,
}

/// Shared handler state. The gate is shared by every viewer connection.
pub struct GatewayServerState {
    pub config: GatewayServerConfig,
    pub gate: Arc<DispatchGate>,
    pub chat_source: Arc<dyn ChatSource>,
    pub clock: Arc<dyn Clock>,
}

impl GatewayServerState {
    pub fn new(
        config: GatewayServerConfig,
        gate: Arc<DispatchGate>,
        chat_source: Arc<dyn ChatSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            gate,
            chat_source,
            clock,
        }
    }
}

/// Binds the configured address and serves until ctrl-c.
pub async fn run_gateway_server(state: GatewayServerState) -> Result<()> {
    let bind_addr = state
        .config
        .bind
        .parse::<SocketAddr>()
        .with_context(|| format!("invalid bind address '{}'", state.config.bind))?;
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind sfxbridge server on {bind_addr}"))?;
    let local_addr = listener
        .local_addr()
        .context("failed to resolve bound server address")?;

    info!(
        addr = %local_addr,
        channel = %state.config.channel,
        audio_dir = %state.config.audio_dir.display(),
        "sfxbridge server listening"
    );

    let app = build_gateway_router(Arc::new(state));
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("sfxbridge shutdown requested");
        })
        .await
        .context("sfxbridge server exited unexpectedly")
}

pub fn build_gateway_router(state: Arc<GatewayServerState>) -> Router {
    Router::new()
        .route(VIEWER_PAGE_ENDPOINT, get(handle_viewer_page))
        .route(VIEWER_WEBSOCKET_ENDPOINT, get(handle_viewer_websocket))
        .route(AUDIO_ASSET_ENDPOINT, get(handle_audio_asset))
        .route(HEALTHZ_ENDPOINT, get(handle_healthz))
        .with_state(state)
}

async fn handle_viewer_page(State(state): State<Arc<GatewayServerState>>) -> Html<String> {
    let snapshot = state.gate.snapshot();
    Html(render_viewer_page(
        &state.config.channel,
        &snapshot.commands,
        VIEWER_WEBSOCKET_ENDPOINT,
    ))
}

async fn handle_viewer_websocket(
    ws: WebSocketUpgrade,
    State(state): State<Arc<GatewayServerState>>,
) -> Response {
    ws.on_upgrade(move |socket| run_viewer_socket(state, socket))
}

async fn handle_audio_asset(
    State(state): State<Arc<GatewayServerState>>,
    AxumPath(path): AxumPath<String>,
) -> Response {
    match serve_audio_asset(&state.config.audio_dir, &path).await {
        Ok((media_type, bytes)) => ([(header::CONTENT_TYPE, media_type)], bytes).into_response(),
        Err(status) => status.into_response(),
    }
}

async fn handle_healthz(State(state): State<Arc<GatewayServerState>>) -> Response {
    let snapshot = state.gate.snapshot();
    let commands = snapshot
        .commands
        .iter()
        .map(|command| {
            json!({
                "name": command.name,
                "trigger": command.trigger,
                "cooldown_seconds": command.cooldown_seconds,
                "expires_at": command.expires_at,
            })
        })
        .collect::<Vec<_>>();
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "channel": state.config.channel,
            "trigger_prefix": state.gate.trigger_prefix(),
            "global_cooldown_seconds": snapshot.global_cooldown_seconds,
            "last_dispatch_at": snapshot.last_dispatch_at,
            "commands": commands,
        })),
    )
        .into_response()
}
