//! Integration tests for the cart API.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The storefront running (cargo run -p cirrus-storefront)
//! - At least one product in the catalog
//!
//! Run with: cargo test -p cirrus-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

/// Base URL for the storefront (configurable via environment).
fn base_url() -> String {
    std::env::var("CIRRUS_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Create a client with a cookie store so the session (and cart) persists
/// across requests.
fn session_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Fetch the first product in the catalog, with variations and features.
async fn first_product(client: &Client) -> Value {
    let base = base_url();
    let products: Value = client
        .get(format!("{base}/products"))
        .send()
        .await
        .expect("Failed to list products")
        .json()
        .await
        .expect("Failed to parse products");

    let id = products
        .as_array()
        .and_then(|a| a.first())
        .and_then(|p| p.get("id"))
        .and_then(Value::as_str)
        .expect("Catalog is empty; seed at least one product")
        .to_owned();

    client
        .get(format!("{base}/products/{id}"))
        .send()
        .await
        .expect("Failed to get product detail")
        .json()
        .await
        .expect("Failed to parse product detail")
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded catalog"]
async fn test_empty_cart_has_zero_total() {
    let client = session_client();

    let cart: Value = client
        .get(format!("{}/cart", base_url()))
        .send()
        .await
        .expect("Failed to get cart")
        .json()
        .await
        .expect("Failed to parse cart");

    assert_eq!(cart["total"], "$0.00");
    assert_eq!(cart["item_count"], 0);
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded catalog"]
async fn test_add_twice_merges_into_one_line() {
    let client = session_client();
    let base = base_url();
    let detail = first_product(&client).await;
    let product_id = detail["product"]["id"].as_str().expect("product id");

    let body = json!({ "product_id": product_id, "quantity": 1 });
    for _ in 0..2 {
        let resp = client
            .post(format!("{base}/cart/items"))
            .json(&body)
            .send()
            .await
            .expect("Failed to add to cart");
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let cart: Value = client
        .get(format!("{base}/cart"))
        .send()
        .await
        .expect("Failed to get cart")
        .json()
        .await
        .expect("Failed to parse cart");

    let lines = cart["lines"].as_array().expect("lines");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["quantity"], 2);
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded catalog"]
async fn test_remove_out_of_range_is_not_found() {
    let client = session_client();

    let resp = client
        .delete(format!("{}/cart/items/99", base_url()))
        .send()
        .await
        .expect("Failed to call remove");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded catalog"]
async fn test_unknown_product_is_not_found() {
    let client = session_client();

    let resp = client
        .post(format!("{}/cart/items", base_url()))
        .json(&json!({
            "product_id": uuid::Uuid::new_v4(),
            "quantity": 1
        }))
        .send()
        .await
        .expect("Failed to call add");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
