//! Broadcast service — viewer registry, connect snapshots, update fan-out.
//!
//! DESIGN
//! ======
//! Each connected viewer owns an `mpsc` channel drained by its websocket
//! task. Publishing uses `try_send`, so a placement never waits on a slow
//! socket; a viewer whose buffer is full simply misses that update.
//!
//! CONSISTENCY
//! ===========
//! `connect` holds the grid read lock while it snapshots and registers the
//! viewer. Placements hold the grid write lock while committing and
//! publishing. A new viewer therefore sees each placement exactly once:
//! either inside its `initial` snapshot or as a later `update`.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::event::Event;
use crate::state::AppState;

/// Outgoing side of a viewer's event channel.
pub type ClientTx = mpsc::Sender<Event>;

#[derive(Clone, Default)]
pub struct Broadcaster {
    clients: Arc<RwLock<HashMap<Uuid, ClientTx>>>,
}

impl Broadcaster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn subscribe(&self, client_id: Uuid, tx: ClientTx) {
        self.clients.write().await.insert(client_id, tx);
    }

    pub async fn unsubscribe(&self, client_id: Uuid) {
        let mut clients = self.clients.write().await;
        clients.remove(&client_id);
        info!(%client_id, remaining = clients.len(), "viewer unsubscribed");
    }

    /// Send `event` to every subscribed viewer without waiting.
    /// Returns how many viewers accepted it.
    pub async fn publish(&self, event: &Event) -> usize {
        let clients = self.clients.read().await;
        let mut delivered = 0;
        for (client_id, tx) in clients.iter() {
            // Best-effort: a full or closed channel drops this event.
            if tx.try_send(event.clone()).is_ok() {
                delivered += 1;
            } else {
                debug!(%client_id, event = event.name(), "viewer dropped event");
            }
        }
        delivered
    }

    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }
}

/// Seed a new viewer with the full canvas and subscribe it to updates.
///
/// Returns `false` if the `initial` event could not be queued, in which
/// case the viewer is not subscribed.
pub async fn connect(state: &AppState, client_id: Uuid, tx: ClientTx) -> bool {
    let grid = state.grid.read().await;
    let initial = Event::Initial { size: grid.size(), cells: grid.snapshot() };
    let cells = grid.len();

    if tx.try_send(initial).is_err() {
        return false;
    }
    state.broadcaster.subscribe(client_id, tx).await;
    drop(grid);

    info!(%client_id, cells, "viewer connected");
    true
}

#[cfg(test)]
#[path = "broadcast_test.rs"]
mod tests;
