//! Order submission wire models.
//!
//! Checkout is a one-shot request built from the cart snapshot; the backend
//! answers with a payment-redirect URL. Unlike the rest of the API this
//! endpoint takes snake_case fields.

use serde::{Deserialize, Serialize};

use wealthproxies_core::VariantId;

/// One line of an order request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub variant_id: VariantId,
    pub quantity: u32,
}

/// Body of `POST /api/order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItem>,
}

/// Response of `POST /api/order`: where to send the browser to pay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    pub url: String,
}
