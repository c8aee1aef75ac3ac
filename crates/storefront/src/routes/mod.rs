//! HTTP route handlers for the storefront JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Liveness check
//! GET  /health/ready               - Readiness check (verifies database)
//!
//! # Catalog
//! GET    /products                 - Product listing
//! GET    /products/{id}            - Product detail (variations + features)
//!
//! # Cart
//! GET    /cart                     - Current cart with computed totals
//! POST   /cart/items               - Add a selection (merges on identical key)
//! PUT    /cart/items/{index}       - Update line quantity
//! DELETE /cart/items/{index}       - Remove a line
//!
//! # Checkout
//! POST /checkout                   - Validate billing, open gateway order
//! POST /checkout/capture           - Capture payment and record the order
//! ```

pub mod cart;
pub mod checkout;
pub mod products;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Catalog routes.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list))
        .route("/{id}", get(products::show))
}

/// Cart routes.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/items", post(cart::add))
        .route(
            "/items/{index}",
            put(cart::update_quantity).delete(cart::remove),
        )
}

/// Checkout routes.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(checkout::begin))
        .route("/capture", post(checkout::capture))
}

/// All storefront routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
}
