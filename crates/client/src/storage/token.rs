//! Persisted bearer-token store and session lifecycle.

use std::sync::Arc;

use crate::error::StoreError;
use crate::events::{EventHub, SessionEvent};
use crate::storage::{StateDir, TOKEN_KEY};

/// Wraps persisted-credential read/write/clear.
///
/// Reads always hit the backing file so that a token written or cleared by
/// another process is picked up on the next request, best-effort. Session
/// state is derived purely from token presence.
#[derive(Debug, Clone)]
pub struct TokenStore {
    state: StateDir,
    events: Arc<EventHub>,
}

impl TokenStore {
    #[must_use]
    pub const fn new(state: StateDir, events: Arc<EventHub>) -> Self {
        Self { state, events }
    }

    /// Current token, or `None` when anonymous.
    ///
    /// Read failures are logged and treated as absent; a broken state
    /// directory must not take down a catalog request.
    #[must_use]
    pub fn get(&self) -> Option<String> {
        match self.state.read(TOKEN_KEY) {
            Ok(token) => token.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read token, treating session as anonymous");
                None
            }
        }
    }

    /// Whether a token is currently stored.
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.get().is_some()
    }

    /// Store a token and broadcast the session change.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the token file cannot be written.
    pub fn set(&self, token: &str) -> Result<(), StoreError> {
        self.state.write(TOKEN_KEY, token)?;
        self.events.session_changed(SessionEvent::SignedIn);
        Ok(())
    }

    /// Clear the token. Broadcasts a session change only if a token was
    /// actually stored, so repeated teardowns stay quiet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the token file cannot be removed.
    pub fn clear(&self) -> Result<(), StoreError> {
        let had_token = self.is_present();
        self.state.remove(TOKEN_KEY)?;
        if had_token {
            self.events.session_changed(SessionEvent::SignedOut);
        }
        Ok(())
    }
}
