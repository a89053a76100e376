//! Cart line-item types.
//!
//! - [`CartItem`] - A product in the cart together with its quantity
//! - [`NewCartItem`] - A product handed to add-to-cart, quantity not yet assigned

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ============================================================================
// Cart Item
// ============================================================================

/// One product in the cart.
///
/// The JSON shape (`id`, `title`, `image_url`, `price`, `quantity`) is the
/// persisted snapshot format; field names must stay stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product identifier, unique within a cart.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Product image URL.
    pub image_url: String,
    /// Unit price.
    pub price: f64,
    /// Number of units in the cart.
    pub quantity: u32,
}

impl CartItem {
    /// Builds a cart item from an add-to-cart candidate.
    pub fn from_new(item: NewCartItem, quantity: u32) -> Self {
        Self {
            id: item.id,
            title: item.title,
            image_url: item.image_url,
            price: item.price,
            quantity,
        }
    }

    /// Returns a copy with the quantity replaced.
    #[must_use]
    pub fn with_quantity(&self, quantity: u32) -> Self {
        Self {
            quantity,
            ..self.clone()
        }
    }

    /// Validates the item.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidItem`] for an empty id or a price that is
    /// negative or not finite.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_fields(&self.id, self.price)
    }
}

// ============================================================================
// New Cart Item
// ============================================================================

/// A product about to be added to the cart.
///
/// Carries every [`CartItem`] field except `quantity`, which the cart assigns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCartItem {
    /// Product identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Product image URL.
    pub image_url: String,
    /// Unit price.
    pub price: f64,
}

impl NewCartItem {
    /// Creates a new candidate item.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }

    /// Converts into a cart item with the given quantity.
    pub fn into_cart_item(self, quantity: u32) -> CartItem {
        CartItem::from_new(self, quantity)
    }

    /// Validates the candidate.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidItem`] for an empty id or a price that is
    /// negative or not finite.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_fields(&self.id, self.price)
    }
}

impl From<CartItem> for NewCartItem {
    fn from(item: CartItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            image_url: item.image_url,
            price: item.price,
        }
    }
}

fn validate_fields(id: &str, price: f64) -> Result<(), CoreError> {
    if id.trim().is_empty() {
        return Err(CoreError::InvalidItem("id must not be empty".to_string()));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(CoreError::InvalidItem(format!(
            "price must be a non-negative number, got {price}"
        )));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewCartItem {
        NewCartItem::new("1", "Camiseta", "https://img/1.png", 49.9)
    }

    #[test]
    fn test_into_cart_item_assigns_quantity() {
        let item = sample().into_cart_item(3);
        assert_eq!(item.id, "1");
        assert_eq!(item.title, "Camiseta");
        assert_eq!(item.quantity, 3);
    }

    #[test]
    fn test_with_quantity_keeps_other_fields() {
        let item = sample().into_cart_item(1);
        let bumped = item.with_quantity(5);
        assert_eq!(bumped.quantity, 5);
        assert_eq!(bumped.title, item.title);
        assert_eq!(bumped.price, item.price);
    }

    #[test]
    fn test_validate_rejects_empty_id() {
        let item = NewCartItem::new("  ", "x", "", 1.0);
        assert!(matches!(item.validate(), Err(CoreError::InvalidItem(_))));
    }

    #[test]
    fn test_validate_rejects_bad_price() {
        assert!(NewCartItem::new("a", "x", "", -1.0).validate().is_err());
        assert!(NewCartItem::new("a", "x", "", f64::NAN).validate().is_err());
        assert!(NewCartItem::new("a", "x", "", 0.0).validate().is_ok());
    }

    #[test]
    fn test_new_item_from_cart_item_drops_quantity() {
        let item = sample().into_cart_item(7);
        let candidate = NewCartItem::from(item);
        assert_eq!(candidate, sample());
    }
}
