//! Client-side services: the session and cart stores plus the product
//! catalog they collaborate with.

mod cart;
mod catalog;
mod session;

pub use cart::CartStore;
pub use catalog::{ProductCatalog, VariantResolver};
pub use session::SessionStore;
