//! Domain models for GoMarket.
//!
//! ## Submodules
//!
//! - [`cart`] - Cart line items (CartItem, NewCartItem)

mod cart;

pub use cart::{CartItem, NewCartItem};
#[cfg(test)]
mod serde_tests;
