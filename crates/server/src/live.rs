use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use tracing::debug;

use teamboard_core::Site;

use crate::state::AppState;

// ── WebSocket Messages ──────────────────────────────────────────

#[derive(Serialize)]
struct WsMessage<T: Serialize> {
    #[serde(rename = "type")]
    msg_type: &'static str,
    data: T,
}

pub fn ws_json<T: Serialize>(msg_type: &'static str, data: T) -> String {
    serde_json::to_string(&WsMessage { msg_type, data }).unwrap_or_default()
}

/// Message type a site's results are pushed under.
pub fn topic(site: Site) -> &'static str {
    match site {
        Site::Task => "tasks",
        Site::Vacation => "vacations",
    }
}

// ── WebSocket Handler ───────────────────────────────────────────

pub async fn ws_upgrade(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

async fn handle_ws(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.dashboard.broadcast.subscribe();

    // Current snapshots first, so a fresh client never waits for a cycle.
    for message in snapshot_messages(&state).await {
        if sender.send(Message::Text(message.into())).await.is_err() {
            return;
        }
    }

    // Forward broadcast messages to this client.
    let send_task = tokio::spawn(async move {
        while let Ok(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    // Consume incoming messages (pings, close frames) but ignore content.
    let recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if matches!(msg, Message::Close(_)) {
                break;
            }
        }
    });

    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }
    debug!("websocket client disconnected");
}

async fn snapshot_messages(state: &AppState) -> Vec<String> {
    let mut messages = Vec::new();
    for site in [Site::Task, Site::Vacation] {
        if let Some(result) = state.dashboard.snapshot(site).await {
            messages.push(ws_json(topic(site), &*result));
        }
    }
    messages
}
