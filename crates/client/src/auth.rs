//! Login, registration, and logout.
//!
//! These calls bypass the authenticated gateway path: no bearer header is
//! attached and a 401 maps to "wrong credentials" rather than tearing down
//! whatever session might exist.

use tracing::instrument;

use clementine_core::Credentials;

use crate::error::{ApiResult, StoreError};
use crate::http::ApiClient;
use crate::storage::TokenStore;

/// Client for the authentication endpoints.
#[derive(Clone)]
pub struct AuthClient {
    api: ApiClient,
    tokens: TokenStore,
}

impl AuthClient {
    #[must_use]
    pub const fn new(api: ApiClient, tokens: TokenStore) -> Self {
        Self { api, tokens }
    }

    /// Log in. On success the backend returns the bearer token as the
    /// response body; it is stored immediately, flipping the session to
    /// authenticated and broadcasting the change.
    ///
    /// # Errors
    ///
    /// [`ApiError::Auth`](crate::ApiError::Auth) on rejected credentials,
    /// the usual taxonomy otherwise. A token that cannot be persisted
    /// surfaces as [`ApiError::State`](crate::ApiError::State).
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<()> {
        let token = self.api.post_json_raw("auth/login", credentials).await?;
        self.tokens.set(token.trim())?;
        Ok(())
    }

    /// Register a new account. Returns the backend's confirmation message.
    /// Registration does not log the user in.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn register(&self, credentials: &Credentials) -> ApiResult<String> {
        self.api.post_json_raw("auth/register", credentials).await
    }

    /// Log out: clear the stored token and broadcast the session change.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the token file cannot be removed.
    pub fn logout(&self) -> Result<(), StoreError> {
        self.tokens.clear()
    }

    /// Whether a token is currently stored.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.tokens.is_present()
    }
}
