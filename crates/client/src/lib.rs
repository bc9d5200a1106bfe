//! Clementine storefront client.
//!
//! Everything stateful lives here: the REST gateway to the backend, the
//! persistent cart store, the token/session lifecycle, and the per-session
//! image cache. The [`state::Storefront`] facade wires the pieces together
//! and is what frontends (the CLI, a future GUI) inject into their views.
//!
//! # Architecture
//!
//! - [`config`] - environment-driven configuration
//! - [`error`] - the error taxonomy shared by all gateway calls
//! - [`events`] - session-changed and user-notice broadcasts
//! - [`storage`] - file-backed state directory (`token`, `cart.json`, `theme`)
//! - [`http`] - single outbound gateway attaching bearer tokens, 401 handling
//! - [`catalog`] - typed product CRUD, search, and image fetch
//! - [`auth`] - login/register/logout over the raw (uninterception) path
//! - [`cart`] - persistent cart store with change subscriptions
//! - [`images`] - `moka`-backed per-session image cache

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod http;
pub mod images;
pub mod state;
pub mod storage;

pub use auth::AuthClient;
pub use cart::{CartEvent, CartStore, CartStoreError, CheckoutOutcome};
pub use catalog::{CatalogClient, ProductImage};
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, ApiResult, StoreError};
pub use events::{EventHub, Notice, SessionEvent};
pub use http::ApiClient;
pub use images::ImageCache;
pub use state::Storefront;
pub use storage::{Preferences, StateDir, TokenStore};
