//! WebSocket handler — realtime canvas feed.
//!
//! DESIGN
//! ======
//! On upgrade, generates a client ID, queues the `initial` snapshot on the
//! client's channel and registers it with the broadcaster, then enters a
//! `select!` loop:
//! - Broadcast events from placements → forward to client
//! - Incoming client messages → ignored, except close
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → `initial` with the full canvas (exactly once)
//! 2. Every successful placement → `update`
//! 3. Close or send failure → unsubscribe. Reconnecting starts over at 1.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::event::Event;
use crate::services::broadcast;
use crate::state::AppState;

/// Per-viewer buffer of pending events before updates start being dropped.
const CLIENT_BUFFER: usize = 256;

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let client_id = Uuid::new_v4();
    let (client_tx, mut client_rx) = mpsc::channel::<Event>(CLIENT_BUFFER);

    if !broadcast::connect(&state, client_id, client_tx).await {
        warn!(%client_id, "ws: failed to queue initial snapshot");
        return;
    }

    loop {
        tokio::select! {
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
            Some(event) = client_rx.recv() => {
                if send_event(&mut socket, &event).await.is_err() {
                    break;
                }
            }
        }
    }

    state.broadcaster.unsubscribe(client_id).await;
    info!(%client_id, "ws: client disconnected");
}

async fn send_event(socket: &mut WebSocket, event: &Event) -> Result<(), ()> {
    let json = match event.to_json() {
        Ok(j) => j,
        Err(e) => {
            warn!(error = %e, event = event.name(), "ws: failed to serialize event");
            return Err(());
        }
    };
    socket.send(Message::Text(json.into())).await.map_err(|_| ())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
