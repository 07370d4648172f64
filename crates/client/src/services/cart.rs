//! Cart store: durable, locally computed shopping cart.
//!
//! The backend never sees the cart until checkout; every mutation is
//! resolved, recomputed, and persisted on the client. Mutations are
//! all-or-nothing: a failed catalog lookup or an unknown line ID leaves the
//! cart exactly as it was. A failed storage write does NOT roll back the
//! in-memory mutation - durability is best-effort, the current session's
//! view stays authoritative.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tracing::instrument;

use wealthproxies_core::{CartItemId, ProductId, VariantId};

use crate::error::{ClientError, Result};
use crate::models::{Cart, CartItem, CreateOrderRequest};
use crate::services::catalog::VariantResolver;
use crate::storage::{Storage, StorageExt, keys};

/// Client-side shopping cart.
///
/// Generic over the catalog collaborator so tests can resolve variants
/// without a backend. State changes are published through a `watch` channel
/// with replay-latest semantics.
pub struct CartStore<C> {
    catalog: C,
    storage: Arc<dyn Storage>,
    state: Mutex<Cart>,
    cart_tx: watch::Sender<Cart>,
}

impl<C: VariantResolver> CartStore<C> {
    /// Create the store, loading any persisted cart from storage.
    ///
    /// A missing or corrupt snapshot degrades to a fresh empty cart.
    #[must_use]
    pub fn new(catalog: C, storage: Arc<dyn Storage>) -> Self {
        let cart: Cart = storage.get_json(keys::CART).unwrap_or_else(Cart::empty);
        let (cart_tx, _) = watch::channel(cart.clone());

        Self {
            catalog,
            storage,
            state: Mutex::new(cart),
            cart_tx,
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Synchronous snapshot of the current cart. No network access.
    #[must_use]
    pub fn current_cart(&self) -> Cart {
        self.lock_state().clone()
    }

    /// Total number of items across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lock_state().total_items
    }

    /// Subscribe to cart changes.
    ///
    /// The receiver immediately holds the current snapshot; every change is
    /// observed as the most recent value.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.cart_tx.subscribe()
    }

    /// One-shot order request built from the current snapshot, for checkout.
    #[must_use]
    pub fn checkout_request(&self) -> CreateOrderRequest {
        self.lock_state().to_order_request()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `quantity` units of a variant to the cart.
    ///
    /// If a line for this exact (product, variant) pair already exists its
    /// quantity is incremented (saturating at `u32::MAX`); otherwise a new
    /// line is appended with a fresh ID and denormalized snapshots of
    /// product and variant.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if the product or variant does not
    /// resolve, or `ClientError::Api` if the catalog fetch fails. The cart
    /// is not modified on error.
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        product_id: &ProductId,
        variant_id: &VariantId,
        quantity: u32,
    ) -> Result<Cart> {
        // Resolve before taking the lock; the lock is never held across an
        // await.
        let (product, variant) = self.catalog.resolve(product_id, variant_id).await?;

        let mut cart = self.lock_state();
        match cart.position_of_pair(product_id, variant_id) {
            Some(index) => {
                if let Some(line) = cart.items.get_mut(index) {
                    line.quantity = line.quantity.saturating_add(quantity);
                }
            }
            None => cart.items.push(CartItem::new(product, variant, quantity)),
        }

        Ok(self.commit(cart))
    }

    /// Set a line's quantity to exactly `quantity` (not additive).
    ///
    /// A quantity of zero removes the line, equivalent to
    /// [`remove_item`](Self::remove_item).
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if no line has this ID.
    #[instrument(skip(self))]
    pub fn update_item(&self, item_id: &CartItemId, quantity: u32) -> Result<Cart> {
        let mut cart = self.lock_state();
        let index = cart
            .position_of(item_id)
            .ok_or_else(|| ClientError::NotFound(format!("cart item {item_id}")))?;

        if quantity == 0 {
            cart.items.remove(index);
        } else if let Some(line) = cart.items.get_mut(index) {
            line.quantity = quantity;
        }

        Ok(self.commit(cart))
    }

    /// Delete a line.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if no line has this ID.
    #[instrument(skip(self))]
    pub fn remove_item(&self, item_id: &CartItemId) -> Result<Cart> {
        let mut cart = self.lock_state();
        let index = cart
            .position_of(item_id)
            .ok_or_else(|| ClientError::NotFound(format!("cart item {item_id}")))?;
        cart.items.remove(index);

        Ok(self.commit(cart))
    }

    /// Replace the cart with an empty one and persist it.
    pub fn clear(&self) -> Cart {
        let mut cart = self.lock_state();
        *cart = Cart::empty();
        self.commit(cart)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn lock_state(&self) -> MutexGuard<'_, Cart> {
        self.state.lock().expect("cart state lock poisoned")
    }

    /// Recompute totals, persist, publish, and return the new snapshot.
    ///
    /// The publish happens while the state lock is still held, so publish
    /// order matches commit order and the watch channel can never be left
    /// holding an older snapshot than the mutex.
    fn commit(&self, mut cart: MutexGuard<'_, Cart>) -> Cart {
        cart.recompute_totals();

        if let Err(e) = self.storage.set_json(keys::CART, &*cart) {
            tracing::error!(error = %e, "Failed to persist cart");
        }

        let snapshot = cart.clone();
        self.cart_tx.send_replace(snapshot.clone());
        drop(cart);
        snapshot
    }
}
