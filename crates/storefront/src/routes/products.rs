//! Catalog route handlers.

use axum::{Json, extract::Path, extract::State};
use tracing::instrument;
use uuid::Uuid;

use cirrus_core::ProductId;

use crate::catalog::{Product, ProductDetail};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// List all products.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = state.catalog().list_products().await?;
    Ok(Json(products))
}

/// Product detail with variations and features.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductDetail>> {
    let detail = state
        .catalog()
        .product_detail(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(Json(ProductDetail::clone(&detail)))
}
