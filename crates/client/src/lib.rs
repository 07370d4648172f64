//! Client-side state management for the Wealth Proxies storefront.
//!
//! The storefront backend owns authentication, payments, and bandwidth
//! accounting; this crate owns the two pieces of state that live on the
//! client: the authenticated session and the locally persisted shopping
//! cart.
//!
//! # Architecture
//!
//! - [`services::SessionStore`] - single source of truth for "who is logged
//!   in", synchronized between memory and durable storage
//! - [`services::CartStore`] - locally persisted cart with derived totals,
//!   recomputed on every mutation
//! - [`api::ApiClient`] - typed wrapper over the backend REST API
//! - [`services::ProductCatalog`] - cached product list used to denormalize
//!   cart lines
//! - [`storage`] - durable key-value storage, the `localStorage` analog
//!
//! Both stores publish their state through `tokio::sync::watch` channels, so
//! subscribers always observe the most recent value and late subscribers
//! receive the current snapshot immediately.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use wealthproxies_client::{ApiClient, ClientConfig, SessionStore};
//! use wealthproxies_client::storage::FileStorage;
//!
//! let config = ClientConfig::from_env()?;
//! let storage = Arc::new(FileStorage::new(&config.storage_dir)?);
//! let api = ApiClient::new(&config, storage.clone());
//! let session = SessionStore::new(api.clone(), storage.clone());
//!
//! // Must complete before any route guard runs.
//! session.initialize();
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use services::{CartStore, ProductCatalog, SessionStore, VariantResolver};
