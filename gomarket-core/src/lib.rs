// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # GoMarket Core
//!
//! Core types and traits for the GoMarket shopping cart.
//!
//! This crate provides the foundational abstractions used by the other
//! GoMarket crates:
//!
//! - Domain models (cart items and add-to-cart candidates)
//! - Error types
//! - The durable key-value storage trait
//!
//! ## Key Types
//!
//! - [`CartItem`] - A product in the cart with its quantity
//! - [`NewCartItem`] - A product about to be added, quantity not yet assigned
//! - [`KeyValueStore`] - Async string key-value persistence boundary
//! - [`CoreError`] - Errors raised by models and storage backends

pub mod error;
pub mod models;
pub mod traits;

pub use error::CoreError;
pub use models::{CartItem, NewCartItem};
pub use traits::KeyValueStore;
