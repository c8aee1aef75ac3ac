//! Catalog row types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cirrus_core::{CategoryId, FeatureId, ProductId, VariationId};

/// A product as stored in the catalog.
///
/// `price` is the base monthly price; duration variations multiply it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub category_id: CategoryId,
    pub price: Decimal,
    pub image: Option<String>,
    pub is_featured: bool,
}

/// A subscription-length option for a product.
///
/// `price_modifier` is a positive multiplier applied to the product's base
/// price (e.g. "Yearly" at 10 means a year costs ten months). A product
/// with no variations is implicitly "Monthly" at 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DurationVariation {
    pub id: VariationId,
    pub product_id: ProductId,
    pub duration: String,
    pub price_modifier: Decimal,
}

/// An optional add-on feature, flat-priced per cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductFeature {
    pub id: FeatureId,
    pub product_id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
}

/// A product with its variations and features, as served to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetail {
    pub product: Product,
    pub variations: Vec<DurationVariation>,
    pub features: Vec<ProductFeature>,
}
