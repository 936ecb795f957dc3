//! WebSocket endpoint for live QA dashboard updates
//!
//! This module provides the `/ws/dashboard` endpoint. Each client receives a
//! `connected` greeting, then the latest snapshot (or `no_data`), then every
//! snapshot published after a completed cycle. Sending the text message
//! `request_update` makes the server resend the latest snapshot.

use axum::extract::ws::{Message, WebSocket};
use axum::{
    extract::{State, WebSocketUpgrade},
    response::IntoResponse,
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::{broadcast::error::RecvError, mpsc};
use tracing::{debug, warn};

use crate::events::{LiveMessage, SharedSnapshotBus};
use crate::snapshot::SnapshotStore;
use crate::types::ResultSnapshot;

/// Client text message requesting a resend of the latest snapshot
pub const REQUEST_UPDATE: &str = "request_update";

const CONNECTED_MESSAGE: &str = "Connected to QA dashboard";

/// WebSocket upgrade handler for dashboard updates
pub async fn dashboard_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<crate::AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.snapshots.clone(), state.bus.clone()))
}

fn snapshot_message(snapshot: Option<&ResultSnapshot>) -> Option<String> {
    let message = match snapshot {
        Some(snapshot) => LiveMessage::Update(snapshot),
        None => LiveMessage::NoData,
    };
    match message.to_json() {
        Ok(json) => Some(json),
        Err(e) => {
            warn!("Failed to serialize snapshot: {}", e);
            None
        }
    }
}

async fn send_text(sender: &mut SplitSink<WebSocket, Message>, text: String) -> bool {
    match sender.send(Message::Text(text.into())).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to send dashboard message: {}", e);
            false
        }
    }
}

async fn handle_socket(socket: WebSocket, snapshots: SnapshotStore, bus: SharedSnapshotBus) {
    let (mut sender, mut receiver) = socket.split();
    // subscribe before reading the latest snapshot so no cycle is missed in between
    let mut snapshot_rx = bus.subscribe();

    debug!("Dashboard WebSocket client connected");

    let welcome = LiveMessage::Connected {
        message: CONNECTED_MESSAGE,
    };
    let Ok(welcome) = welcome.to_json() else {
        return;
    };
    if !send_text(&mut sender, welcome).await {
        return;
    }

    let latest = snapshots.latest().await;
    if let Some(json) = snapshot_message(latest.as_deref()) {
        if !send_text(&mut sender, json).await {
            return;
        }
    }

    let (refresh_tx, mut refresh_rx) = mpsc::channel::<()>(4);

    // Spawn task to handle incoming messages (refresh requests, close)
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => break,
                Ok(Message::Text(text)) if text.as_str().trim() == REQUEST_UPDATE => {
                    // a full queue already has a pending refresh
                    let _ = refresh_tx.try_send(());
                }
                Ok(Message::Text(text)) => {
                    debug!("Ignoring dashboard message: {}", text.as_str());
                }
                Err(e) => {
                    warn!("WebSocket receive error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    });

    loop {
        tokio::select! {
            _ = &mut recv_task => {
                debug!("Dashboard WebSocket client disconnected");
                break;
            }
            Some(()) = refresh_rx.recv() => {
                let latest = snapshots.latest().await;
                if let Some(json) = snapshot_message(latest.as_deref()) {
                    if !send_text(&mut sender, json).await {
                        break;
                    }
                }
            }
            result = snapshot_rx.recv() => {
                match result {
                    Ok(snapshot) => {
                        if let Some(json) = snapshot_message(Some(&snapshot)) {
                            if !send_text(&mut sender, json).await {
                                break;
                            }
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        warn!("Dashboard WebSocket lagged by {} snapshots", n);
                        // the next received snapshot supersedes the skipped ones
                    }
                    Err(RecvError::Closed) => {
                        debug!("Snapshot bus closed");
                        break;
                    }
                }
            }
        }
    }

    recv_task.abort();
}
