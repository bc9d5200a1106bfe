//! Clementine Core - Shared types library.
//!
//! This crate provides common types used across all Clementine components:
//! - `client` - REST gateway, cart store, session and image cache
//! - `cli` - Command-line storefront frontend
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Products, cart lines, credentials, and the theme preference

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
