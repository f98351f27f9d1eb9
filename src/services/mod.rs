//! Domain services used by websocket and HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the stores and the rules around them so route
//! handlers can stay focused on query parsing and response shaping.

pub mod broadcast;
pub mod grid;
pub mod identity;
pub mod oauth;
pub mod placement;
