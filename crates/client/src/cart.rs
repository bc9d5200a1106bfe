//! Persistent cart store.
//!
//! Wraps the [`Cart`] value type with hydration, synchronous snapshot
//! persistence, and change subscriptions. The store is the single owner of
//! the in-memory cart; views read snapshots and call mutation methods,
//! they never hold the cart itself.
//!
//! Every mutation re-reads the persisted snapshot before merging, so rapid
//! overlapping mutations (two views clicking at once, or a second process
//! on the same state directory) resolve deterministically: last write wins
//! per product id, and the full snapshot is written back synchronously
//! before the mutation returns.

use std::sync::{Mutex, PoisonError};

use rust_decimal::Decimal;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{instrument, warn};

use clementine_core::{Cart, CartError, Product, ProductId};

use crate::catalog::CatalogClient;
use crate::error::{ApiError, StoreError};
use crate::storage::{CART_KEY, StateDir};

const CHANNEL_CAPACITY: usize = 16;

/// Errors from cart store operations.
#[derive(Debug, Error)]
pub enum CartStoreError {
    /// The mutation itself was invalid (stock exceeded, unknown line).
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Persisting the snapshot failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Change notification from the cart store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartEvent {
    Changed,
}

/// Result of a checkout pass over the cart.
///
/// There is deliberately no rollback: stock decrements already committed
/// on the backend stay committed, and the corresponding lines are removed
/// from the cart. A failure stops the loop and is reported alongside the
/// committed ids so the caller can tell the user exactly where it stopped.
#[derive(Debug)]
pub struct CheckoutOutcome {
    /// Lines whose stock decrement was accepted by the backend.
    pub committed: Vec<ProductId>,
    /// First failure, if any; lines from here on are still in the cart.
    pub failed: Option<(ProductId, ApiError)>,
}

impl CheckoutOutcome {
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.failed.is_none()
    }
}

/// Shared cart store backed by the `cart.json` snapshot.
pub struct CartStore {
    state: StateDir,
    cart: Mutex<Cart>,
    changes: broadcast::Sender<CartEvent>,
}

impl CartStore {
    /// Open the store, hydrating from the persisted snapshot. An absent or
    /// corrupt snapshot hydrates empty; corruption is logged, never fatal.
    #[must_use]
    pub fn open(state: StateDir) -> Self {
        let cart = Self::load(&state);
        let (changes, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            state,
            cart: Mutex::new(cart),
            changes,
        }
    }

    /// Register for change notifications; drop the receiver to unregister.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.changes.subscribe()
    }

    /// Read snapshot of the current cart.
    #[must_use]
    pub fn snapshot(&self) -> Cart {
        self.cart
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Grand total of the current cart.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.snapshot().total()
    }

    /// Add one unit of `product` (new line, or increment capped at stock).
    ///
    /// # Errors
    ///
    /// [`CartStoreError::Cart`] when stock would be exceeded (the line
    /// stays unchanged), [`CartStoreError::Store`] if persisting fails.
    pub fn add(&self, product: &Product) -> Result<(), CartStoreError> {
        self.mutate(|cart| cart.add(product).map_err(Into::into))
    }

    /// Drop the line for `id`; a nonexistent id is a no-op.
    ///
    /// # Errors
    ///
    /// [`CartStoreError::Store`] if persisting fails.
    pub fn remove(&self, id: &ProductId) -> Result<(), CartStoreError> {
        self.mutate(|cart| {
            cart.remove(id);
            Ok(())
        })
    }

    /// Increment an existing line's quantity, clamped to its stock.
    ///
    /// # Errors
    ///
    /// As [`Cart::increase`], plus [`CartStoreError::Store`].
    pub fn increase(&self, id: &ProductId) -> Result<(), CartStoreError> {
        self.mutate(|cart| cart.increase(id).map_err(Into::into))
    }

    /// Decrement an existing line's quantity, floored at 1.
    ///
    /// # Errors
    ///
    /// As [`Cart::decrease`], plus [`CartStoreError::Store`].
    pub fn decrease(&self, id: &ProductId) -> Result<(), CartStoreError> {
        self.mutate(|cart| cart.decrease(id).map_err(Into::into))
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// [`CartStoreError::Store`] if persisting fails.
    pub fn clear(&self) -> Result<(), CartStoreError> {
        self.mutate(|cart| {
            cart.clear();
            Ok(())
        })
    }

    /// Drop lines for products no longer present in the live catalog.
    ///
    /// # Errors
    ///
    /// [`CartStoreError::Store`] if persisting fails.
    pub fn prune(&self, live: &[Product]) -> Result<(), CartStoreError> {
        self.mutate(|cart| {
            cart.retain_ids(live.iter().map(|p| &p.id));
            Ok(())
        })
    }

    /// Walk the cart, decrementing backend stock line by line.
    ///
    /// Lines are validated against the live catalog first (deleted
    /// products are pruned). Each accepted decrement removes the line; the
    /// first failure stops the loop, leaving the failed and remaining
    /// lines in the cart. See [`CheckoutOutcome`].
    ///
    /// # Errors
    ///
    /// [`CartStoreError::Store`] if a snapshot write fails mid-walk. The
    /// per-line backend failure is part of the outcome, not an `Err`.
    #[instrument(skip(self, catalog))]
    pub async fn checkout(&self, catalog: &CatalogClient) -> Result<CheckoutOutcome, CartStoreError> {
        if let Ok(live) = catalog.list_products().await {
            self.prune(&live)?;
        }

        let lines = self.snapshot();
        let mut committed = Vec::new();

        for line in lines.lines() {
            let remaining = line.product.stock_quantity.saturating_sub(line.quantity);
            let draft = line.product.to_draft().with_stock(remaining);

            match catalog.update_product(&line.product.id, &draft, None).await {
                Ok(_) => {
                    self.remove(&line.product.id)?;
                    committed.push(line.product.id.clone());
                }
                Err(e) => {
                    warn!(id = %line.product.id, error = %e, "Checkout stopped at line");
                    return Ok(CheckoutOutcome {
                        committed,
                        failed: Some((line.product.id.clone(), e)),
                    });
                }
            }
        }

        Ok(CheckoutOutcome {
            committed,
            failed: None,
        })
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Apply a mutation under the lock: reload the persisted snapshot,
    /// merge, apply, persist, broadcast.
    fn mutate<R>(
        &self,
        f: impl FnOnce(&mut Cart) -> Result<R, CartStoreError>,
    ) -> Result<R, CartStoreError> {
        let mut cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        *cart = Self::load(&self.state);
        let result = f(&mut cart)?;
        self.persist(&cart)?;
        let _ = self.changes.send(CartEvent::Changed);
        Ok(result)
    }

    fn load(state: &StateDir) -> Cart {
        match state.read(CART_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Corrupt cart snapshot, starting empty");
                Cart::new()
            }),
            Ok(None) => Cart::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read cart snapshot, starting empty");
                Cart::new()
            }
        }
    }

    fn persist(&self, cart: &Cart) -> Result<(), StoreError> {
        let raw = serde_json::to_string(cart).map_err(|source| StoreError::Corrupt {
            path: self.state.path(CART_KEY),
            source,
        })?;
        self.state.write(CART_KEY, &raw)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn product(id: &str, price: i64, stock: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            brand: "Acme".to_string(),
            price: Decimal::from(price),
            category: "misc".to_string(),
            release_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            available: true,
            stock_quantity: stock,
            image_name: None,
            image_type: None,
        }
    }

    fn open_store(dir: &tempfile::TempDir) -> CartStore {
        CartStore::open(StateDir::open(dir.path()).unwrap())
    }

    #[test]
    fn test_add_twice_merges_into_one_line() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);

        store.add(&product("1", 10, 5)).unwrap();
        store.add(&product("1", 10, 5)).unwrap();

        let cart = store.snapshot();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(&ProductId::new("1")).unwrap().quantity, 2);
        assert_eq!(store.total(), Decimal::from(20));
    }

    #[test]
    fn test_snapshot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = open_store(&dir);
            store.add(&product("1", 10, 5)).unwrap();
            store.add(&product("2", 3, 9)).unwrap();
        }

        let reopened = open_store(&dir);
        let cart = reopened.snapshot();
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.total(), Decimal::from(13));
    }

    #[test]
    fn test_corrupt_snapshot_hydrates_empty() {
        let dir = tempfile::tempdir().unwrap();
        let state = StateDir::open(dir.path()).unwrap();
        state.write(CART_KEY, "{not json").unwrap();

        let store = CartStore::open(state);
        assert!(store.snapshot().is_empty());

        // And the next mutation writes a clean snapshot over it
        store.add(&product("1", 10, 5)).unwrap();
        let reopened = open_store(&dir);
        assert_eq!(reopened.snapshot().len(), 1);
    }

    #[test]
    fn test_remove_nonexistent_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        store.add(&product("1", 10, 5)).unwrap();

        store.remove(&ProductId::new("ghost")).unwrap();
        assert_eq!(store.snapshot().len(), 1);
    }

    #[test]
    fn test_increase_beyond_stock_rejected_and_unpersisted() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        store.add(&product("1", 10, 1)).unwrap();

        let err = store.increase(&ProductId::new("1")).unwrap_err();
        assert!(matches!(
            err,
            CartStoreError::Cart(CartError::InsufficientStock { .. })
        ));

        let reopened = open_store(&dir);
        assert_eq!(reopened.snapshot().get(&ProductId::new("1")).unwrap().quantity, 1);
    }

    #[test]
    fn test_two_stores_on_same_dir_merge_last_write_wins() {
        let dir = tempfile::tempdir().unwrap();
        let a = open_store(&dir);
        let b = open_store(&dir);

        a.add(&product("1", 10, 5)).unwrap();
        // b reloads the persisted snapshot before merging its own change
        b.add(&product("2", 3, 9)).unwrap();

        assert_eq!(b.snapshot().len(), 2);
        let reopened = open_store(&dir);
        assert_eq!(reopened.snapshot().len(), 2);
    }

    #[test]
    fn test_mutations_broadcast_changes() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        let mut rx = store.subscribe();

        store.add(&product("1", 10, 5)).unwrap();
        assert_eq!(rx.try_recv().unwrap(), CartEvent::Changed);
    }

    #[test]
    fn test_clear_empties_store_and_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        store.add(&product("1", 10, 5)).unwrap();

        store.clear().unwrap();
        assert!(store.snapshot().is_empty());
        assert!(open_store(&dir).snapshot().is_empty());
    }

    #[test]
    fn test_prune_drops_dead_products() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        store.add(&product("1", 10, 5)).unwrap();
        store.add(&product("2", 3, 9)).unwrap();

        store.prune(&[product("2", 3, 9)]).unwrap();
        let cart = store.snapshot();
        assert_eq!(cart.len(), 1);
        assert!(cart.get(&ProductId::new("2")).is_some());
    }
}
