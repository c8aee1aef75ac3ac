//! Durable cart storage.
//!
//! The cart value lives in the session under a fixed key and is written
//! back after every mutation. Loading is forgiving: an unreadable session
//! or malformed stored value degrades to an empty cart instead of failing
//! the request, so a bad cookie never locks a customer out of the store.

use tower_sessions::Session;

use super::Cart;

/// Session key the serialized cart is stored under.
pub const CART_KEY: &str = "cart";

/// Load the cart from the session, degrading to empty on any failure.
pub async fn load(session: &Session) -> Cart {
    match session.get::<Cart>(CART_KEY).await {
        Ok(Some(cart)) => cart,
        Ok(None) => Cart::new(),
        Err(e) => {
            tracing::warn!("discarding unreadable cart from session: {e}");
            Cart::new()
        }
    }
}

/// Persist the cart to the session.
///
/// # Errors
///
/// Returns the session error if the write fails.
pub async fn save(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    session.insert(CART_KEY, cart).await
}

/// Remove the cart from the session (after a successful order).
///
/// # Errors
///
/// Returns the session error if the removal fails.
pub async fn clear(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<Cart>(CART_KEY).await.map(|_| ())
}
