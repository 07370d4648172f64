//! Wire and domain models.
//!
//! The backend speaks camelCase JSON; every type here carries
//! `#[serde(rename_all = "camelCase")]` unless the endpoint contract says
//! otherwise (order submission uses snake_case).

pub mod cart;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{Cart, CartItem};
pub use order::{CreateOrderRequest, CreateOrderResponse, OrderItem};
pub use product::{Product, ProductType, ProductVariant};
pub use user::{AuthResponse, LoginRequest, OauthProvider, RegisterRequest, Session, User};
