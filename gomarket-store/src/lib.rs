// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # GoMarket Store
//!
//! Persistent shopping-cart state for the GoMarket client.
//!
//! This crate provides:
//!
//! - **CartStore**: Ordered cart with add/increment/decrement, written to
//!   storage after every change and observable via a watch channel
//! - **CartScope**: Task-scoped access to a cart through [`use_cart`]
//! - **Storage**: In-memory and JSON-file key-value backends
//! - **Persistence**: File I/O helpers for JSON data
//!
//! ## Usage
//!
//! ```ignore
//! use gomarket_core::NewCartItem;
//! use gomarket_store::{CartStore, JsonFileStorage, StoreConfig};
//! use std::sync::Arc;
//!
//! let config = StoreConfig::default();
//! let storage = Arc::new(JsonFileStorage::new(&config.storage_path));
//! let cart = CartStore::open(storage, &config).await?;
//!
//! cart.add_to_cart(NewCartItem::new("42", "Shirt", "https://img/42.png", 49.9)).await?;
//! cart.increment("42").await?;
//!
//! let mut rx = cart.subscribe();
//! while rx.changed().await.is_ok() {
//!     println!("Cart now has {} items", cart.total_quantity().await);
//! }
//! ```

pub mod cart_store;
pub mod config;
pub mod error;
pub mod persistence;
pub mod scope;
pub mod storage;

pub use cart_store::CartStore;
pub use config::{CART_STORAGE_KEY, LOG_LEVELS, STORAGE_PATH_ENV, StoreConfig};
pub use error::StoreError;
pub use persistence::{
    default_config_dir, default_config_path, default_storage_path, load_json, load_json_if_exists,
    save_json,
};
pub use scope::{CartScope, use_cart};
pub use storage::{JsonFileStorage, MemoryStorage};
