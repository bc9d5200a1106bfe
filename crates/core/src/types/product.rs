//! Product catalog types.
//!
//! Wire format is the backend's camelCase JSON. The backend also embeds the
//! raw image bytes in its product documents; those never travel to the
//! client, images are fetched through the dedicated image endpoint instead.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;

/// A catalog product as returned by the backend.
///
/// Immutable from the client's perspective except via explicit update calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub brand: String,
    pub price: Decimal,
    #[serde(default)]
    pub category: String,
    /// Wire format `yyyy-MM-dd`.
    pub release_date: NaiveDate,
    #[serde(default)]
    pub available: bool,
    pub stock_quantity: u32,
    #[serde(default)]
    pub image_name: Option<String>,
    #[serde(default)]
    pub image_type: Option<String>,
}

impl Product {
    /// Build the mutable payload for a create or update call.
    #[must_use]
    pub fn to_draft(&self) -> ProductDraft {
        ProductDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            brand: self.brand.clone(),
            price: self.price,
            category: self.category.clone(),
            release_date: self.release_date,
            available: self.available,
            stock_quantity: self.stock_quantity,
        }
    }
}

/// The metadata payload sent in the `product` multipart part of create and
/// update calls. The id is never part of the payload: the backend assigns it
/// on create and takes it from the path on update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub brand: String,
    pub price: Decimal,
    #[serde(default)]
    pub category: String,
    pub release_date: NaiveDate,
    #[serde(default)]
    pub available: bool,
    pub stock_quantity: u32,
}

impl ProductDraft {
    /// Same draft with a different stock level (checkout decrements).
    #[must_use]
    pub const fn with_stock(mut self, stock_quantity: u32) -> Self {
        self.stock_quantity = stock_quantity;
        self
    }
}
