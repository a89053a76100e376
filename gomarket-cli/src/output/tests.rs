//! CLI output formatting tests.
//!
//! These tests verify that CLI output is correctly formatted for both
//! text and JSON output modes.

#[cfg(test)]
mod text_formatter_tests {
    use super::super::text::{truncate, TextFormatter};
    use gomarket_core::{CartItem, NewCartItem};

    fn item(id: &str, title: &str, quantity: u32) -> CartItem {
        NewCartItem::new(id, title, "", 12.5).into_cart_item(quantity)
    }

    #[test]
    fn test_empty_cart() {
        let formatter = TextFormatter::new(false);
        assert_eq!(formatter.format_cart(&[]), "Cart is empty");
    }

    #[test]
    fn test_cart_lines_and_summary() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_cart(&[item("1", "Shirt", 2), item("2", "Cap", 1)]);

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[2].contains("Shirt"));
        assert!(lines[2].contains("12.50"));
        assert!(lines[3].trim_start().starts_with('1'));
        assert_eq!(lines[5], "3 units (2 products)");
    }

    #[test]
    fn test_singular_summary() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_cart(&[item("1", "Shirt", 1)]);
        assert!(output.ends_with("1 unit (1 product)"));
    }

    #[test]
    fn test_colors_only_when_enabled() {
        let plain = TextFormatter::new(false).format_line(&item("1", "Shirt", 1));
        let colored = TextFormatter::new(true).format_line(&item("1", "Shirt", 1));

        assert!(!plain.contains("\x1b["));
        assert!(colored.contains("\x1b[36m"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly10!", 10), "exactly10!");
        assert_eq!(truncate("much longer title", 8), "much lo…");
    }

    #[test]
    fn test_long_title_is_truncated_in_line() {
        let formatter = TextFormatter::new(false).with_title_width(6);
        let line = formatter.format_line(&item("1", "Very long product", 1));
        assert!(line.contains("Very …"));
    }
}

#[cfg(test)]
mod json_formatter_tests {
    use super::super::json::JsonFormatter;
    use gomarket_core::{CartItem, NewCartItem};

    fn cart() -> Vec<CartItem> {
        vec![
            NewCartItem::new("1", "Shirt", "https://img/1.png", 49.9).into_cart_item(2),
            NewCartItem::new("2", "Cap", "", 15.0).into_cart_item(1),
        ]
    }

    #[test]
    fn test_cart_output_shape() {
        let formatter = JsonFormatter::new(false);
        let json = formatter.format_cart("GoMarketplace:products", &cart()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["storageKey"], "GoMarketplace:products");
        assert_eq!(value["itemCount"], 2);
        assert_eq!(value["totalQuantity"], 3);
        assert_eq!(value["items"][0]["imageUrl"], "https://img/1.png");
        assert_eq!(value["items"][0]["quantity"], 2);
        // Empty image URLs are omitted.
        assert!(value["items"][1].get("imageUrl").is_none());
    }

    #[test]
    fn test_pretty_output_is_multiline() {
        let compact = JsonFormatter::new(false).format_cart("k", &cart()).unwrap();
        let pretty = JsonFormatter::new(true).format_cart("k", &cart()).unwrap();

        assert!(!compact.contains('\n'));
        assert!(pretty.contains('\n'));
    }

    #[test]
    fn test_empty_cart_output() {
        let json = JsonFormatter::new(false).format_cart("k", &[]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["itemCount"], 0);
        assert_eq!(value["items"].as_array().unwrap().len(), 0);
    }
}
