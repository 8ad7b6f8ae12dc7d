use std::{
    collections::VecDeque,
    net::SocketAddr,
    path::Path,
    sync::{Arc, Mutex},
    time::Duration,
};

use futures_util::StreamExt;
use serde_json::Value;
use sfx_chat::{BroadcastChatSource, ChatSource};
use sfx_core::{Clock, ManualClock};
use sfx_dispatch::{CommandSpec, DispatchGate, DispatchGateConfig, FsPayloadLoader};
use sfx_gateway::{build_gateway_router, GatewayServerConfig, GatewayServerState};
use tempfile::{tempdir, TempDir};
use tokio::net::TcpListener;
use tokio_tungstenite::{
    connect_async, tungstenite::Message as WsMessage, MaybeTlsStream, WebSocketStream,
};

type ViewerSocket = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Returns one scripted timestamp per read, repeating the last one when the
/// script runs out.
struct ScriptedClock {
    ticks: Mutex<VecDeque<u64>>,
    last: Mutex<u64>,
}

impl ScriptedClock {
    fn new(ticks: &[u64]) -> Self {
        Self {
            ticks: Mutex::new(ticks.iter().copied().collect()),
            last: Mutex::new(0),
        }
    }
}

impl Clock for ScriptedClock {
    fn now_unix_seconds(&self) -> u64 {
        let mut last = self.last.lock().expect("last tick lock");
        if let Some(next) = self.ticks.lock().expect("ticks lock").pop_front() {
            *last = next;
        }
        *last
    }
}

fn wav_bytes() -> Vec<u8> {
    let mut bytes = b"RIFF".to_vec();
    bytes.extend_from_slice(&36u32.to_le_bytes());
    bytes.extend_from_slice(b"WAVEfmt ");
    bytes.extend_from_slice(&[0u8; 24]);
    bytes
}

fn write_audio_fixtures() -> TempDir {
    let temp = tempdir().expect("tempdir");
    std::fs::create_dir_all(temp.path().join("audio")).expect("audio dir");
    std::fs::write(temp.path().join("audio/horn.wav"), wav_bytes()).expect("horn");
    std::fs::write(temp.path().join("audio/drum.wav"), wav_bytes()).expect("drum");
    temp
}

fn gateway_state(
    root: &Path,
    chat_source: Arc<dyn ChatSource>,
    clock: Arc<dyn Clock>,
) -> GatewayServerState {
    let gate = DispatchGate::new(
        DispatchGateConfig {
            global_cooldown_seconds: 5,
            commands: vec![
                CommandSpec::new("Horn", "!horn", "audio/horn.wav", 30),
                CommandSpec::new("Drum", "!drum", "audio/drum.wav", 0),
            ],
            ..DispatchGateConfig::default()
        },
        Arc::new(FsPayloadLoader::new(root)),
    );
    GatewayServerState::new(
        GatewayServerConfig {
            bind: "127.0.0.1:0".to_string(),
            channel: "chan".to_string(),
            audio_dir: root.join("audio"),
        },
        Arc::new(gate),
        chat_source,
        clock,
    )
}

async fn spawn_gateway(state: GatewayServerState) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let app = build_gateway_router(Arc::new(state));
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve gateway");
    });
    addr
}

async fn next_text_frame(viewer: &mut ViewerSocket, wait: Duration) -> Option<String> {
    match tokio::time::timeout(wait, viewer.next()).await {
        Ok(Some(Ok(WsMessage::Text(text)))) => Some(text.as_str().to_string()),
        _ => None,
    }
}

async fn fetch_health(addr: SocketAddr) -> Value {
    reqwest::get(format!("http://{addr}/healthz"))
        .await
        .expect("health request")
        .json()
        .await
        .expect("health json")
}

async fn wait_for_last_dispatch(addr: SocketAddr, expected: u64) {
    for _ in 0..200 {
        if fetch_health(addr).await["last_dispatch_at"] == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("last_dispatch_at never reached {expected}");
}

async fn wait_for_subscribers(source: &BroadcastChatSource, expected: usize) {
    for _ in 0..200 {
        if source.subscriber_count() == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("expected {expected} chat subscribers");
}

/// Counts how many of the two viewers received a frame in a short window.
async fn count_frames(first: &mut ViewerSocket, second: &mut ViewerSocket) -> usize {
    let (first, second) = tokio::join!(
        next_text_frame(first, Duration::from_millis(300)),
        next_text_frame(second, Duration::from_millis(300))
    );
    usize::from(first.is_some()) + usize::from(second.is_some())
}

#[tokio::test]
async fn integration_chat_triggers_reach_viewer_within_cooldowns() {
    let fixtures = write_audio_fixtures();
    let chat = Arc::new(BroadcastChatSource::default());
    let clock = ScriptedClock::new(&[100, 100, 110, 131]);
    let addr = spawn_gateway(gateway_state(fixtures.path(), chat.clone(), Arc::new(clock))).await;

    let (mut viewer, _response) = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("connect viewer");
    wait_for_subscribers(&chat, 1).await;

    chat.publish("#chan", "viewer", "hello");
    chat.publish("#chan", "viewer", "!horn");
    chat.publish("#chan", "viewer", "!horn");
    chat.publish("#chan", "viewer", "!horn  ");

    let first = next_text_frame(&mut viewer, Duration::from_secs(5))
        .await
        .expect("first dispatch");
    assert!(first.starts_with("data:audio/wav;base64,UklGR"));

    let second = next_text_frame(&mut viewer, Duration::from_secs(5))
        .await
        .expect("second dispatch after cooldowns");
    assert_eq!(second, first);
    wait_for_last_dispatch(addr, 131).await;

    let health = fetch_health(addr).await;
    assert_eq!(health["commands"][0]["expires_at"], 161);
    assert!(next_text_frame(&mut viewer, Duration::from_millis(200))
        .await
        .is_none());
}

#[tokio::test]
async fn integration_viewers_share_one_cooldown_state() {
    let fixtures = write_audio_fixtures();
    let chat = Arc::new(BroadcastChatSource::default());
    let clock = Arc::new(ManualClock::new(100));
    let addr = spawn_gateway(gateway_state(fixtures.path(), chat.clone(), clock.clone())).await;

    let (mut first_viewer, _) = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("connect first viewer");
    let (mut second_viewer, _) = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("connect second viewer");
    wait_for_subscribers(&chat, 2).await;

    assert_eq!(chat.publish("chan", "viewer", "!horn"), 2);
    assert_eq!(count_frames(&mut first_viewer, &mut second_viewer).await, 1);
    wait_for_last_dispatch(addr, 100).await;

    clock.set(103);
    chat.publish("chan", "viewer", "!drum");
    assert_eq!(count_frames(&mut first_viewer, &mut second_viewer).await, 0);

    clock.set(106);
    chat.publish("chan", "viewer", "!drum");
    assert_eq!(count_frames(&mut first_viewer, &mut second_viewer).await, 1);
    wait_for_last_dispatch(addr, 106).await;
}
