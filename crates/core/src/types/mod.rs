//! Core types for Clementine.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod credentials;
pub mod id;
pub mod product;
pub mod theme;

pub use cart::{Cart, CartError, CartLine};
pub use credentials::Credentials;
pub use id::ProductId;
pub use product::{Product, ProductDraft};
pub use theme::{Theme, ThemeParseError};
