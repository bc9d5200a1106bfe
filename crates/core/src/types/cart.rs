//! Cart value types.
//!
//! [`Cart`] is a pure value, no persistence or change notification here.
//! The client crate wraps it in a store that handles hydration, snapshot
//! writes, and subscriptions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::id::ProductId;
use crate::types::product::Product;

/// Errors from cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The requested quantity would exceed the line's known stock.
    #[error("Cannot add more of product {id}: only {stock} in stock")]
    InsufficientStock { id: ProductId, stock: u32 },

    /// No cart line exists for this product.
    #[error("Product {0} is not in the cart")]
    UnknownLine(ProductId),
}

/// One product entry with quantity in the shopping cart.
///
/// On the wire and in the persisted snapshot this is the product object with
/// a `quantity` field spliced in, hence the flatten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    /// Subtotal for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// An ordered collection of cart lines, one per product id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Read view over the lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product.id == *id)
    }

    /// Add one unit of `product`.
    ///
    /// An existing line for the same product id is incremented; otherwise a
    /// new line with quantity 1 is appended. Incrementing past the known
    /// stock is rejected and the line stays unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InsufficientStock`] when the product is out of
    /// stock or the line already holds the full stock.
    pub fn add(&mut self, product: &Product) -> Result<(), CartError> {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.product.id == product.id)
        {
            if line.quantity >= line.product.stock_quantity {
                return Err(CartError::InsufficientStock {
                    id: product.id.clone(),
                    stock: line.product.stock_quantity,
                });
            }
            line.quantity += 1;
            return Ok(());
        }

        if product.stock_quantity == 0 {
            return Err(CartError::InsufficientStock {
                id: product.id.clone(),
                stock: 0,
            });
        }
        self.lines.push(CartLine {
            product: product.clone(),
            quantity: 1,
        });
        Ok(())
    }

    /// Drop the line for `id`. Removing a nonexistent id is a no-op.
    pub fn remove(&mut self, id: &ProductId) {
        self.lines.retain(|line| line.product.id != *id);
    }

    /// Increment the quantity of an existing line by one, clamped to stock.
    ///
    /// # Errors
    ///
    /// [`CartError::UnknownLine`] if no line exists for `id`;
    /// [`CartError::InsufficientStock`] if the line is already at stock,
    /// in which case the line stays unchanged.
    pub fn increase(&mut self, id: &ProductId) -> Result<(), CartError> {
        let line = self
            .lines
            .iter_mut()
            .find(|line| line.product.id == *id)
            .ok_or_else(|| CartError::UnknownLine(id.clone()))?;
        if line.quantity >= line.product.stock_quantity {
            return Err(CartError::InsufficientStock {
                id: id.clone(),
                stock: line.product.stock_quantity,
            });
        }
        line.quantity += 1;
        Ok(())
    }

    /// Decrement the quantity of an existing line by one, floored at 1.
    ///
    /// # Errors
    ///
    /// [`CartError::UnknownLine`] if no line exists for `id`.
    pub fn decrease(&mut self, id: &ProductId) -> Result<(), CartError> {
        let line = self
            .lines
            .iter_mut()
            .find(|line| line.product.id == *id)
            .ok_or_else(|| CartError::UnknownLine(id.clone()))?;
        line.quantity = line.quantity.saturating_sub(1).max(1);
        Ok(())
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Drop lines whose product id is not in `live_ids`.
    ///
    /// Used before checkout to discard lines for products that were deleted
    /// on the backend since the snapshot was taken.
    pub fn retain_ids<'a>(&mut self, live_ids: impl IntoIterator<Item = &'a ProductId>) {
        let live: std::collections::HashSet<&ProductId> = live_ids.into_iter().collect();
        self.lines.retain(|line| live.contains(&line.product.id));
    }

    /// Grand total across all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }
}
