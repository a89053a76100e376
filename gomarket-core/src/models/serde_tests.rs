//! Serde serialization/deserialization tests for core types.
//!
//! The cart snapshot format is a JSON array of items; these tests pin its
//! field names and check that data survives the round-trip.

use crate::{CartItem, NewCartItem};

fn item(id: &str, quantity: u32) -> CartItem {
    CartItem {
        id: id.to_string(),
        title: format!("Product {id}"),
        image_url: format!("https://cdn.example.com/{id}.png"),
        price: 19.5,
        quantity,
    }
}

#[test]
fn test_cart_item_field_names() {
    let json = serde_json::to_value(item("42", 2)).unwrap();
    let obj = json.as_object().unwrap();

    assert_eq!(obj.len(), 5);
    assert_eq!(obj["id"], "42");
    assert_eq!(obj["image_url"], "https://cdn.example.com/42.png");
    assert_eq!(obj["price"], 19.5);
    assert_eq!(obj["quantity"], 2);
}

#[test]
fn test_cart_list_roundtrip_preserves_order() {
    let cart = vec![item("b", 1), item("a", 4), item("c", 2)];

    let json = serde_json::to_string(&cart).unwrap();
    let parsed: Vec<CartItem> = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed, cart);
}

#[test]
fn test_deserialize_snapshot_written_by_mobile_client() {
    let json = r#"[
        {"id":"1","title":"Cadeira Gamer","image_url":"https://img/1.png","price":1200,"quantity":1},
        {"id":"2","title":"Mouse","image_url":"https://img/2.png","price":99.9,"quantity":3}
    ]"#;

    let parsed: Vec<CartItem> = serde_json::from_str(json).unwrap();

    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[0].price, 1200.0);
    assert_eq!(parsed[1].quantity, 3);
}

#[test]
fn test_negative_quantity_rejected() {
    let json = r#"[{"id":"1","title":"t","image_url":"u","price":1,"quantity":-1}]"#;
    let result: Result<Vec<CartItem>, _> = serde_json::from_str(json);
    assert!(result.is_err());
}

#[test]
fn test_missing_quantity_rejected_for_cart_item() {
    let json = r#"{"id":"1","title":"t","image_url":"u","price":1}"#;
    assert!(serde_json::from_str::<CartItem>(json).is_err());
    assert!(serde_json::from_str::<NewCartItem>(json).is_ok());
}
