//! Store error types.

use gomarket_core::CoreError;
use thiserror::Error;

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Cart accessed outside a [`CartScope`](crate::CartScope).
    #[error("{0}")]
    Scope(String),

    /// Durable storage read or write failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Persisted cart snapshot could not be parsed.
    #[error("Malformed cart snapshot: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Cart item rejected by validation.
    #[error("Invalid item: {0}")]
    InvalidItem(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Returns true if the in-memory cart is still usable after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, StoreError::Storage(_) | StoreError::Io(_))
    }
}

impl From<CoreError> for StoreError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Io(e) => StoreError::Io(e),
            CoreError::Serialization(e) => StoreError::Serialization(e),
            CoreError::InvalidItem(msg) => StoreError::InvalidItem(msg),
            other => StoreError::Storage(other.to_string()),
        }
    }
}
