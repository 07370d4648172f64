//! Unified error handling for the client.
//!
//! Store operations return `Result<T, ClientError>`. Network and lookup
//! failures are never swallowed; they surface to the caller for display.
//! The two deliberate exceptions are logout (always performs local cleanup)
//! and storage writes (logged, in-memory state stays authoritative).

use thiserror::Error;

use crate::api::ApiError;
use crate::storage::StorageError;

/// Application-level error type for the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Backend API operation failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Referenced cart line, product, or variant is absent.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Durable storage operation failed.
    ///
    /// Stores swallow write failures themselves; this variant only surfaces
    /// from explicit storage setup (e.g., creating the storage directory).
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;
