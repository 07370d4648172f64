//! Durable key-value storage, the `localStorage` analog.
//!
//! Storage is scoped to a directory (the "origin") and shared mutable state:
//! two processes pointed at the same directory can overwrite each other's
//! values, and no cross-process locking exists. The stores treat durability
//! as best-effort; a failed write never rolls back in-memory state.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Well-known storage keys.
pub mod keys {
    /// Opaque bearer token.
    pub const AUTH_TOKEN: &str = "auth_token";
    /// JSON snapshot of the signed-in user.
    pub const AUTH_USER: &str = "auth_user";
    /// JSON snapshot of the session record.
    pub const AUTH_SESSION: &str = "auth_session";
    /// JSON snapshot of the cart.
    pub const CART: &str = "wealthproxies_cart";
}

/// Errors that can occur when writing to durable storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Value could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Backend refused the write (used by test doubles).
    #[error("Write rejected: {0}")]
    Rejected(String),
}

/// Durable key-value storage.
///
/// Reads are infallible from the caller's point of view: a missing key and
/// an unreadable value both come back as `None`.
pub trait Storage: Send + Sync {
    /// Read the raw value for a key.
    fn get(&self, key: &str) -> Option<String>;

    /// Write the raw value for a key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value could not be made durable.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key. Removing an absent key is not an error.
    fn remove(&self, key: &str);
}

/// JSON convenience methods available on every [`Storage`].
pub trait StorageExt: Storage {
    /// Read and deserialize a JSON value.
    ///
    /// Corrupt JSON is logged and treated as absent, so a damaged snapshot
    /// degrades to "not persisted" instead of wedging the store.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding corrupt stored value");
                None
            }
        }
    }

    /// Serialize and write a JSON value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if serialization or the underlying write fails.
    fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value)?;
        self.set(key, &raw)
    }
}

impl<S: Storage + ?Sized> StorageExt for S {}
