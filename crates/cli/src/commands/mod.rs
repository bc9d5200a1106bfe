//! CLI command implementations.

pub mod auth;
pub mod cart;
pub mod products;
pub mod theme;

use std::path::PathBuf;

use thiserror::Error;

use clementine_client::{ApiError, CartStoreError, StoreError};
use clementine_core::ThemeParseError;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A gateway call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A cart mutation failed.
    #[error(transparent)]
    Cart(#[from] CartStoreError),

    /// Local state persistence failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Reading a local input file failed.
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A product metadata file did not parse.
    #[error("Invalid product file {path}: {source}")]
    InvalidDraft {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Unrecognized theme name.
    #[error(transparent)]
    Theme(#[from] ThemeParseError),
}
