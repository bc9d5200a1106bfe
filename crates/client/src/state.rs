//! The wired-up client, shared across views by injection.

use std::sync::Arc;

use thiserror::Error;

use crate::auth::AuthClient;
use crate::cart::CartStore;
use crate::catalog::CatalogClient;
use crate::config::ClientConfig;
use crate::error::{ApiError, StoreError};
use crate::events::EventHub;
use crate::http::ApiClient;
use crate::images::ImageCache;
use crate::storage::{Preferences, StateDir, TokenStore};

/// Error wiring up the client.
#[derive(Debug, Error)]
pub enum StorefrontInitError {
    #[error("Cannot open state directory: {0}")]
    State(#[from] StoreError),
    #[error("Cannot build HTTP client: {0}")]
    Http(#[from] ApiError),
}

/// Everything a frontend needs, built once and passed by reference to the
/// views that consume it. Replaces the ambient global-context pattern:
/// views get read snapshots and mutation methods, and register observers
/// through [`EventHub`] or [`CartStore::subscribe`].
#[derive(Clone)]
pub struct Storefront {
    pub events: Arc<EventHub>,
    pub tokens: TokenStore,
    pub auth: AuthClient,
    pub catalog: CatalogClient,
    pub cart: Arc<CartStore>,
    pub images: ImageCache,
    pub prefs: Preferences,
}

impl Storefront {
    /// Wire up all components from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontInitError`] if the state directory cannot be
    /// created or the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, StorefrontInitError> {
        let state = StateDir::open(&config.state_dir)?;
        let events = Arc::new(EventHub::new());

        let tokens = TokenStore::new(state.clone(), Arc::clone(&events));
        let api = ApiClient::new(config, tokens.clone(), Arc::clone(&events))?;
        let catalog = CatalogClient::new(api.clone());

        Ok(Self {
            events,
            auth: AuthClient::new(api, tokens.clone()),
            tokens,
            images: ImageCache::new(catalog.clone()),
            catalog,
            cart: Arc::new(CartStore::open(state.clone())),
            prefs: Preferences::new(state),
        })
    }
}
