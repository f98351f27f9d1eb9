//! Event — server-to-viewer messages on the realtime socket.
//!
//! ARCHITECTURE
//! ============
//! Each websocket connection receives exactly one `initial` event followed
//! by zero or more `update` events. Both are JSON text messages shaped as
//! `{"event": "<name>", "data": {...}}`. Viewers never send anything the
//! server acts on.

use serde::{Deserialize, Serialize};

use crate::services::grid::Pixel;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "lowercase")]
pub enum Event {
    /// Full canvas state, sent once when a viewer connects.
    Initial { size: u32, cells: Vec<Pixel> },
    /// One committed placement, sent to every viewer.
    Update(Pixel),
}

impl Event {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initial { .. } => "initial",
            Self::Update(_) => "update",
        }
    }

    /// Serialize for a websocket text message.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
#[path = "event_test.rs"]
mod tests;
