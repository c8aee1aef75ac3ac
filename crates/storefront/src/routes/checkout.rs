//! Checkout route handlers.
//!
//! Two-step flow against the PayPal hosted approval:
//!
//! 1. `POST /checkout` validates the billing form and the cart, stashes
//!    the billing details in the session, and opens a gateway order for
//!    the cart total. Nothing is persisted and no money moves.
//! 2. `POST /checkout/capture` captures the approved gateway order, then
//!    assembles and records ours. The cart is cleared and the receipt
//!    sent only after the order row is committed. A request without a
//!    gateway order ID records the order with a generated payment
//!    reference (payment methods that do not supply one).
//!
//! Abandoning checkout after step 1 writes nothing, so there is nothing
//! to compensate.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use chrono::{DateTime, Utc};
use cirrus_core::{OrderId, format_usd};

use crate::cart::{pricing, store};
use crate::checkout::{self, BillingDetails, CheckoutError, PaymentConfirmation, receipt};
use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Session key for billing details between the two checkout steps.
const BILLING_KEY: &str = "checkout.billing";

/// Response to opening a checkout.
#[derive(Debug, Serialize)]
pub struct BeginCheckoutResponse {
    pub gateway_order_id: String,
    pub total: String,
}

/// Capture request body.
#[derive(Debug, Deserialize)]
pub struct CaptureRequest {
    /// Approved gateway order to capture; `None` for payment methods
    /// without a gateway reference.
    pub gateway_order_id: Option<String>,
}

/// Response to a completed order.
#[derive(Debug, Serialize)]
pub struct OrderView {
    pub order_id: OrderId,
    pub total: String,
    pub payment_ref: String,
    pub expires_at: DateTime<Utc>,
}

/// Validate billing and open a gateway order for the cart total.
#[instrument(skip(state, session, details))]
pub async fn begin(
    State(state): State<AppState>,
    session: Session,
    Json(details): Json<BillingDetails>,
) -> Result<Json<BeginCheckoutResponse>> {
    let cart = store::load(&session).await;
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart.into());
    }
    // Reject bad billing before any money moves.
    checkout::billing::validate(&details)?;

    let total = pricing::cart_total(&cart);
    let gateway_order_id = state.paypal().create_order(total).await?;

    session.insert(BILLING_KEY, &details).await?;

    Ok(Json(BeginCheckoutResponse {
        gateway_order_id,
        total: format_usd(total),
    }))
}

/// Capture payment and record the order.
#[instrument(skip(state, session))]
pub async fn capture(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<CaptureRequest>,
) -> Result<Json<OrderView>> {
    let details: BillingDetails = session
        .get(BILLING_KEY)
        .await?
        .ok_or_else(|| AppError::BadRequest("checkout has not been started".into()))?;

    let cart = store::load(&session).await;

    let payment = match request.gateway_order_id {
        Some(id) => {
            let reference = state.paypal().capture_order(&id).await?;
            PaymentConfirmation::Captured { reference }
        }
        None => PaymentConfirmation::Manual,
    };

    let repo = OrderRepository::new(state.pool());
    let placed = checkout::place_order(&repo, &cart, &details, payment, Utc::now()).await?;

    // Only after the order row is committed.
    store::clear(&session).await?;
    let _ = session.remove::<BillingDetails>(BILLING_KEY).await;

    // Fire-and-forget: a receipt failure never unwinds a recorded order.
    let html = receipt::receipt_html(&placed, &cart);
    state.mailer().send_detached(
        placed.billing.email.clone(),
        "Your Cirrus order confirmation".to_owned(),
        html,
    );

    Ok(Json(OrderView {
        order_id: placed.id,
        total: format_usd(placed.total),
        payment_ref: placed.payment_ref,
        expires_at: placed.expires_at,
    }))
}
