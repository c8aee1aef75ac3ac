//! Cart route handlers.
//!
//! The cart lives in the session; every mutation writes it back before
//! responding with the recomputed view.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use cirrus_core::{FeatureId, ProductId, VariationId, format_usd};

use crate::cart::{Cart, CartLine, pricing, store};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Cart line display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    pub product_id: ProductId,
    pub name: String,
    pub duration: Option<String>,
    pub features: Vec<String>,
    pub quantity: u32,
    pub line_total: String,
    pub image: Option<String>,
}

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub item_count: u32,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product.id,
            name: line.product.name.clone(),
            duration: line.variation.as_ref().map(|v| v.duration.clone()),
            features: line.features.iter().map(|f| f.name.clone()).collect(),
            quantity: line.quantity,
            line_total: format_usd(pricing::line_total(line)),
            image: line.product.image.clone(),
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            lines: cart.lines().iter().map(CartLineView::from).collect(),
            total: format_usd(pricing::cart_total(cart)),
            item_count: cart.lines().iter().map(|l| l.quantity).sum(),
        }
    }
}

/// Add to cart request body.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub variation_id: Option<VariationId>,
    #[serde(default)]
    pub feature_ids: Vec<FeatureId>,
    pub quantity: Option<u32>,
}

/// Update quantity request body.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: u32,
}

/// Current cart with computed totals.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Json<CartView> {
    let cart = store::load(&session).await;
    Json(CartView::from(&cart))
}

/// Add a selection to the cart.
///
/// The snapshot captured here (price, variation multiplier, feature
/// prices) is what checkout will charge, regardless of later catalog
/// edits.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartView>> {
    let quantity = request.quantity.unwrap_or(1);
    if quantity < 1 {
        return Err(AppError::BadRequest("quantity must be at least 1".into()));
    }

    let detail = state
        .catalog()
        .product_detail(request.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {}", request.product_id)))?;

    let variation = match request.variation_id {
        Some(id) => Some(
            detail
                .variations
                .iter()
                .find(|v| v.id == id)
                .map(Into::into)
                .ok_or_else(|| {
                    AppError::BadRequest(format!("variation {id} does not belong to this product"))
                })?,
        ),
        None => None,
    };

    let features = request
        .feature_ids
        .iter()
        .map(|id| {
            detail
                .features
                .iter()
                .find(|f| f.id == *id)
                .map(Into::into)
                .ok_or_else(|| {
                    AppError::BadRequest(format!("feature {id} does not belong to this product"))
                })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut cart = store::load(&session).await;
    cart.add((&detail.product).into(), variation, features, quantity);
    store::save(&session, &cart).await?;

    Ok(Json(CartView::from(&cart)))
}

/// Update the quantity of a cart line.
///
/// Quantities below 1 are a no-op; removal is its own endpoint.
#[instrument(skip(session))]
pub async fn update_quantity(
    session: Session,
    Path(index): Path<usize>,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartView>> {
    let mut cart = store::load(&session).await;
    cart.update_quantity(index, request.quantity)
        .map_err(|_| AppError::NotFound(format!("cart line {index}")))?;
    store::save(&session, &cart).await?;

    Ok(Json(CartView::from(&cart)))
}

/// Remove a cart line entirely.
#[instrument(skip(session))]
pub async fn remove(session: Session, Path(index): Path<usize>) -> Result<Json<CartView>> {
    let mut cart = store::load(&session).await;
    cart.remove(index)
        .map_err(|_| AppError::NotFound(format!("cart line {index}")))?;
    store::save(&session, &cart).await?;

    Ok(Json(CartView::from(&cart)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use crate::cart::ProductSnapshot;

    #[test]
    fn test_cart_view_totals() {
        let mut cart = Cart::new();
        cart.add(
            ProductSnapshot {
                id: ProductId::new(Uuid::from_u128(1)),
                name: "SurveyFlow".to_owned(),
                short_description: None,
                price: dec!(9.99),
                image: None,
            },
            None,
            vec![],
            3,
        );

        let view = CartView::from(&cart);
        assert_eq!(view.item_count, 3);
        assert_eq!(view.total, "$29.97");
        assert_eq!(view.lines.first().unwrap().line_total, "$29.97");
    }

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::from(&Cart::new());
        assert!(view.lines.is_empty());
        assert_eq!(view.total, "$0.00");
        assert_eq!(view.item_count, 0);
    }
}
