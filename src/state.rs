//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It owns every store for the lifetime of the process: sessions, the
//! pixel grid and the viewer registry. Nothing is persisted; a restart
//! starts from an empty canvas with no sessions.
//!
//! LOCK ORDER
//! ==========
//! `identity` before `grid` before the broadcaster's client map. Every
//! path that takes more than one of these takes them in that order.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::Config;
use crate::services::broadcast::Broadcaster;
use crate::services::grid::GridStore;
use crate::services::identity::IdentityStore;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub identity: Arc<RwLock<IdentityStore>>,
    pub grid: Arc<RwLock<GridStore>>,
    pub broadcaster: Broadcaster,
    /// Shared client for identity provider calls.
    pub http: reqwest::Client,
}

impl AppState {
    #[must_use]
    pub fn new(config: Config) -> Self {
        let grid = GridStore::new(config.canvas_size);
        Self {
            config: Arc::new(config),
            identity: Arc::new(RwLock::new(IdentityStore::new())),
            grid: Arc::new(RwLock::new(grid)),
            broadcaster: Broadcaster::new(),
            http: reqwest::Client::new(),
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
