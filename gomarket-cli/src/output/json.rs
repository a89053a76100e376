//! JSON output formatting.

use anyhow::Result;
use gomarket_core::CartItem;
use serde::Serialize;

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for the whole cart.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartOutput<'a> {
    pub storage_key: &'a str,
    pub item_count: usize,
    pub total_quantity: u64,
    pub items: Vec<ItemOutput<'a>>,
}

/// A single cart line.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemOutput<'a> {
    pub id: &'a str,
    pub title: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub image_url: &'a str,
    pub price: f64,
    pub quantity: u32,
}

impl<'a> From<&'a CartItem> for ItemOutput<'a> {
    fn from(item: &'a CartItem) -> Self {
        Self {
            id: &item.id,
            title: &item.title,
            image_url: &item.image_url,
            price: item.price,
            quantity: item.quantity,
        }
    }
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats the cart.
    pub fn format_cart(&self, storage_key: &str, items: &[CartItem]) -> Result<String> {
        let output = CartOutput {
            storage_key,
            item_count: items.len(),
            total_quantity: items.iter().map(|p| u64::from(p.quantity)).sum(),
            items: items.iter().map(ItemOutput::from).collect(),
        };
        self.format(&output)
    }
}
