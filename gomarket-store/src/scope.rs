//! Task-scoped access to a cart.
//!
//! [`CartScope::run`] installs a [`CartStore`] for the duration of a future;
//! code running inside it reaches the cart with [`use_cart`]. Calling
//! [`use_cart`] anywhere else is a programming error and fails immediately.
//!
//! The scope is task-local: tasks spawned from inside a scope do not inherit
//! it. Hand those tasks a cloned [`CartStore`] instead.
//!
//! ```ignore
//! let store = CartStore::open(storage, &config).await?;
//! CartScope::run(store, async {
//!     let cart = use_cart()?;
//!     cart.increment("42").await
//! })
//! .await?;
//! ```

use std::future::Future;

use crate::cart_store::CartStore;
use crate::error::StoreError;

tokio::task_local! {
    static CURRENT_CART: CartStore;
}

/// Message carried by [`StoreError::Scope`].
pub const OUTSIDE_SCOPE_MESSAGE: &str = "use_cart must be used within a CartScope";

/// Installs a cart for a future or closure.
#[derive(Debug, Clone, Copy)]
pub struct CartScope;

impl CartScope {
    /// Runs `fut` with `store` available through [`use_cart`].
    pub async fn run<F>(store: CartStore, fut: F) -> F::Output
    where
        F: Future,
    {
        CURRENT_CART.scope(store, fut).await
    }

    /// Runs `f` synchronously with `store` available through [`use_cart`].
    pub fn run_sync<R>(store: CartStore, f: impl FnOnce() -> R) -> R {
        CURRENT_CART.sync_scope(store, f)
    }
}

/// Returns the cart installed by the enclosing [`CartScope`].
///
/// # Errors
///
/// Returns [`StoreError::Scope`] when no scope is active.
pub fn use_cart() -> Result<CartStore, StoreError> {
    CURRENT_CART
        .try_with(CartStore::clone)
        .map_err(|_| StoreError::Scope(OUTSIDE_SCOPE_MESSAGE.to_string()))
}
