//! Core error types for GoMarket.

use thiserror::Error;

/// Core error type for GoMarket operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Durable storage backend failed to read or write.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Cart item failed validation.
    #[error("Invalid item: {0}")]
    InvalidItem(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}
