//! Identity store — session tokens and the external identities behind them.
//!
//! DESIGN
//! ======
//! Sessions live in memory for the lifetime of the process. A token is
//! issued per login and stays valid until the same external identity logs
//! in again, at which point the old token is removed. There is no expiry
//! and no logout.
//!
//! The `by_identity` index keeps re-login eviction O(1) instead of scanning
//! every live session.

use std::collections::HashMap;
use std::fmt::{self, Write};
use std::time::Instant;

use rand::Rng;

// =============================================================================
// TYPES
// =============================================================================

/// Who a session belongs to outside this service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExternalIdentity {
    /// Self-chosen display name (`/create-account`).
    DisplayName(String),
    /// Discord account id resolved through OAuth (`/token`).
    Discord { user_id: String },
}

impl fmt::Display for ExternalIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DisplayName(name) => write!(f, "name:{name}"),
            Self::Discord { user_id } => write!(f, "discord:{user_id}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub identity: ExternalIdentity,
    /// Shown to other viewers as the owner of placed pixels.
    pub name: String,
    /// `None` until the first successful placement.
    pub last_placement: Option<Instant>,
}

// =============================================================================
// STORE
// =============================================================================

#[derive(Debug, Default)]
pub struct IdentityStore {
    sessions: HashMap<String, Session>,
    by_identity: HashMap<ExternalIdentity, String>,
}

impl IdentityStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh token for `identity`, evicting any session it already holds.
    pub fn create_session(&mut self, identity: ExternalIdentity, name: impl Into<String>) -> String {
        if let Some(previous) = self.by_identity.remove(&identity) {
            self.sessions.remove(&previous);
        }

        let mut token = generate_token();
        while self.sessions.contains_key(&token) {
            token = generate_token();
        }

        self.by_identity.insert(identity.clone(), token.clone());
        self.sessions.insert(
            token.clone(),
            Session { token: token.clone(), identity, name: name.into(), last_placement: None },
        );
        token
    }

    #[must_use]
    pub fn lookup(&self, token: &str) -> Option<&Session> {
        self.sessions.get(token)
    }

    /// Mutable access is reserved for the placement path, which owns
    /// `last_placement`.
    pub(crate) fn lookup_mut(&mut self, token: &str) -> Option<&mut Session> {
        self.sessions.get_mut(token)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

// =============================================================================
// TOKENS
// =============================================================================

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

#[cfg(test)]
#[path = "identity_test.rs"]
mod tests;
