//! Cart domain model.
//!
//! The cart never leaves the client until checkout; the backend only sees a
//! one-shot order built from its snapshot. Each line denormalizes the full
//! product and variant at the time of adding so the cart stays renderable
//! without the catalog (the price shown is the price at add time, by
//! contract).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wealthproxies_core::{CartItemId, Price, ProductId, VariantId};

use super::order::{CreateOrderRequest, OrderItem};
use super::product::{Product, ProductVariant};

/// A single cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Synthetic client-side line ID.
    pub id: CartItemId,
    /// Referenced product.
    pub product_id: ProductId,
    /// Referenced variant.
    pub variant_id: VariantId,
    /// Units of the variant.
    pub quantity: u32,
    /// Product snapshot at add time.
    pub product: Product,
    /// Variant snapshot at add time.
    pub variant: ProductVariant,
    /// When the line was first added.
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// Build a new line with a fresh ID and denormalized snapshots.
    #[must_use]
    pub fn new(product: Product, variant: ProductVariant, quantity: u32) -> Self {
        Self {
            id: CartItemId::generate(),
            product_id: product.id.clone(),
            variant_id: variant.id.clone(),
            quantity,
            product,
            variant,
            added_at: Utc::now(),
        }
    }

    /// Line subtotal: unit price at add time times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.variant.price.times(self.quantity)
    }
}

/// The shopping cart, persisted as `wealthproxies_cart`.
///
/// `total_items` and `total_amount` are derived fields; they are recomputed
/// from the lines after every mutation and never edited independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Cart lines, at most one per (product, variant) pair.
    pub items: Vec<CartItem>,
    /// Sum of all line quantities.
    pub total_items: u32,
    /// Sum of line subtotals, in minor currency units.
    pub total_amount: Price,
    /// ISO 4217 currency code.
    pub currency: String,
}

impl Cart {
    /// An empty cart with zero totals.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_items: 0,
            total_amount: Price::ZERO,
            currency: "USD".to_string(),
        }
    }

    /// Recompute the derived totals from the current lines.
    ///
    /// Idempotent: calling it twice yields the same totals.
    pub fn recompute_totals(&mut self) {
        self.total_items = self.items.iter().map(|item| item.quantity).sum();
        self.total_amount = self.items.iter().map(CartItem::line_total).sum();
    }

    /// Position of the line for a (product, variant) pair, if one exists.
    #[must_use]
    pub fn position_of_pair(
        &self,
        product_id: &ProductId,
        variant_id: &VariantId,
    ) -> Option<usize> {
        self.items
            .iter()
            .position(|item| &item.product_id == product_id && &item.variant_id == variant_id)
    }

    /// Position of a line by its synthetic ID.
    #[must_use]
    pub fn position_of(&self, item_id: &CartItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == item_id)
    }

    /// Build the one-shot order request sent to the backend at checkout.
    #[must_use]
    pub fn to_order_request(&self) -> CreateOrderRequest {
        CreateOrderRequest {
            items: self
                .items
                .iter()
                .map(|item| OrderItem {
                    variant_id: item.variant_id.clone(),
                    quantity: item.quantity,
                })
                .collect(),
        }
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::empty()
    }
}
