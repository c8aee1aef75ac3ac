//! Checkout order assembly.
//!
//! [`place_order`] turns a priced cart plus billing details and a payment
//! confirmation into a persisted order. The steps are strictly sequential:
//! validate, total, expiry, persist (header and items in one transaction),
//! and only then does the caller clear the cart and send the receipt.
//!
//! Persistence failure after payment capture is the serious case: money
//! has moved but no record exists. It is surfaced as
//! [`CheckoutError::Persistence`] with the payment reference preserved so
//! support can reconcile; it must never look like a generic error, and the
//! cart must not be cleared.

pub mod billing;
pub mod expiry;
pub mod receipt;

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use thiserror::Error;

use cirrus_core::{Email, OrderId, OrderStatus, ProductId, VariationId};

use crate::cart::{Cart, pricing};
use crate::db::RepositoryError;

pub use billing::{BillingContact, BillingDetails};

/// Checkout failure taxonomy.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart has no lines; nothing to order.
    #[error("your cart is empty")]
    EmptyCart,

    /// A billing field is missing or malformed. Nothing was persisted.
    #[error("invalid or missing {field}")]
    Validation {
        /// The offending billing field.
        field: &'static str,
    },

    /// The order could not be recorded after payment was captured.
    /// The payment reference is preserved for manual reconciliation.
    #[error("payment {payment_ref} succeeded but the order could not be recorded")]
    Persistence {
        payment_ref: String,
        #[source]
        source: RepositoryError,
    },
}

/// Proof of payment handed to the assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentConfirmation {
    /// The gateway captured the payment and returned a reference ID.
    Captured {
        /// Capture reference from the gateway.
        reference: String,
    },
    /// The payment method supplies no reference; a placeholder is
    /// generated so the order always carries one.
    Manual,
}

impl PaymentConfirmation {
    /// Resolve to the reference string stored on the order.
    #[must_use]
    pub fn into_reference(self) -> String {
        match self {
            Self::Captured { reference } => reference,
            Self::Manual => {
                let n: u32 = rand::rng().random_range(100_000..1_000_000);
                format!("CIR-{n}")
            }
        }
    }
}

/// Order header fields handed to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub billing_name: String,
    pub billing_email: Email,
    pub billing_address: String,
    pub total_amount: Decimal,
    pub payment_id: String,
    pub status: OrderStatus,
    pub expires_at: DateTime<Utc>,
}

/// One order line handed to the store alongside the header.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub variation_id: Option<VariationId>,
    pub quantity: u32,
    /// The computed total for this line at order time, including features
    /// and the duration multiplier.
    pub price: Decimal,
}

/// Persistence seam for order assembly.
///
/// Implementations must write the header and all items as one logical
/// transaction: a committed header with missing items is not a state this
/// trait allows.
pub trait OrderStore {
    /// Insert the order and its items, returning the generated order ID.
    fn insert_order(
        &self,
        order: &NewOrder,
        items: &[NewOrderItem],
    ) -> impl Future<Output = Result<OrderId, RepositoryError>> + Send;
}

/// A successfully recorded order, as returned to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedOrder {
    pub id: OrderId,
    pub billing: BillingContact,
    pub total: Decimal,
    pub payment_ref: String,
    pub expires_at: DateTime<Utc>,
    pub placed_at: DateTime<Utc>,
}

/// Assemble and persist an order from the cart snapshot.
///
/// The total is computed from the cart as it stands at this moment; prices
/// are not re-fetched from the catalog. The caller clears the cart and
/// sends the receipt only after this returns `Ok`.
///
/// # Errors
///
/// - [`CheckoutError::EmptyCart`] / [`CheckoutError::Validation`] before
///   anything is persisted.
/// - [`CheckoutError::Persistence`] if the write fails; the payment
///   reference is carried in the error.
pub async fn place_order<S: OrderStore>(
    store: &S,
    cart: &Cart,
    details: &BillingDetails,
    payment: PaymentConfirmation,
    now: DateTime<Utc>,
) -> Result<PlacedOrder, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    let contact = billing::validate(details)?;

    let total = pricing::cart_total(cart);
    let expires_at = expiry::order_expiry(cart, now);
    let payment_ref = payment.into_reference();

    let order = NewOrder {
        billing_name: contact.name.clone(),
        billing_email: contact.email.clone(),
        billing_address: contact.address.clone(),
        total_amount: total,
        payment_id: payment_ref.clone(),
        status: OrderStatus::Completed,
        expires_at,
    };

    let items: Vec<NewOrderItem> = cart
        .lines()
        .iter()
        .map(|line| NewOrderItem {
            product_id: line.product.id,
            variation_id: line.variation.as_ref().map(|v| v.id),
            quantity: line.quantity,
            price: pricing::line_total(line),
        })
        .collect();

    let id = store
        .insert_order(&order, &items)
        .await
        .map_err(|source| CheckoutError::Persistence {
            payment_ref: payment_ref.clone(),
            source,
        })?;

    tracing::info!(order_id = %id, total = %total, "order recorded");

    Ok(PlacedOrder {
        id,
        billing: contact,
        total,
        payment_ref,
        expires_at,
        placed_at: now,
    })
}
