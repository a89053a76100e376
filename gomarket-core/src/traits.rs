//! Trait definitions for GoMarket.
//!
//! This module defines the storage boundary the cart persists through.

use async_trait::async_trait;

use crate::error::CoreError;

/// Durable key-value storage addressed by string keys.
///
/// Implementors are responsible for:
/// - Surviving process restarts (for durable backends)
/// - Reporting read/write failures as [`CoreError::Storage`] or [`CoreError::Io`]
///
/// Values are opaque strings; the cart stores a JSON snapshot under a single key.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`.
    ///
    /// # Returns
    /// * `Ok(Some(value))` - Value found
    /// * `Ok(None)` - Nothing stored under this key
    /// * `Err(e)` - Backend failure
    async fn get(&self, key: &str) -> Result<Option<String>, CoreError>;

    /// Stores `value` under `key`, overwriting any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), CoreError>;

    /// Removes the value stored under `key`. Missing keys are not an error.
    async fn remove(&self, key: &str) -> Result<(), CoreError>;

    /// Checks if a value exists under `key`.
    async fn contains(&self, key: &str) -> bool {
        matches!(self.get(key).await, Ok(Some(_)))
    }
}
