//! Shopping cart aggregation.
//!
//! A [`Cart`] is an ordered list of [`CartLine`]s. Lines carry snapshots of
//! the price-relevant catalog fields taken at add time, so a cart survives
//! catalog edits between browsing and checkout (the snapshot is also what
//! gets priced at checkout; see the pricing module).
//!
//! Mutations are pure methods on the value; durable storage is a thin
//! session adapter in [`store`].

pub mod pricing;
pub mod store;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cirrus_core::{FeatureId, ProductId, VariationId};

use crate::catalog::{DurationVariation, Product, ProductFeature};

/// Errors from cart index operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// The given line index does not exist.
    #[error("no cart line at index {0}")]
    OutOfRange(usize),
}

/// Price-relevant product fields captured when a line is added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub short_description: Option<String>,
    pub price: Decimal,
    pub image: Option<String>,
}

impl From<&Product> for ProductSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            short_description: product.short_description.clone(),
            price: product.price,
            image: product.image.clone(),
        }
    }
}

/// The chosen duration variation, captured at add time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariationSnapshot {
    pub id: VariationId,
    pub duration: String,
    pub price_modifier: Decimal,
}

impl From<&DurationVariation> for VariationSnapshot {
    fn from(variation: &DurationVariation) -> Self {
        Self {
            id: variation.id,
            duration: variation.duration.clone(),
            price_modifier: variation.price_modifier,
        }
    }
}

/// A chosen add-on feature, captured at add time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSnapshot {
    pub id: FeatureId,
    pub name: String,
    pub price: Decimal,
}

impl From<&ProductFeature> for FeatureSnapshot {
    fn from(feature: &ProductFeature) -> Self {
        Self {
            id: feature.id,
            name: feature.name.clone(),
            price: feature.price,
        }
    }
}

/// One cart entry: a product, its chosen variation and features, and a
/// quantity. Invariant: `quantity >= 1`; a line at quantity zero does not
/// exist (removal is a separate explicit action).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: ProductSnapshot,
    pub variation: Option<VariationSnapshot>,
    pub features: Vec<FeatureSnapshot>,
    pub quantity: u32,
}

impl CartLine {
    /// The identity under which lines merge: same product, same variation,
    /// same feature set (order-insensitive).
    fn merge_key(&self) -> MergeKey {
        let mut features: Vec<FeatureId> = self.features.iter().map(|f| f.id).collect();
        features.sort_unstable();
        MergeKey {
            product: self.product.id,
            variation: self.variation.as_ref().map(|v| v.id),
            features,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct MergeKey {
    product: ProductId,
    variation: Option<VariationId>,
    features: Vec<FeatureId>,
}

/// An ordered shopping cart.
///
/// Created empty on first visit, persisted across page loads via the
/// session store, and cleared only after an order is recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// The cart lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of lines (not total quantity).
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Add a selection to the cart.
    ///
    /// If a line with the same product, variation, and feature set already
    /// exists, its quantity is incremented by `quantity`; otherwise a new
    /// line is appended. Existing line order is preserved.
    ///
    /// # Panics
    ///
    /// Panics if `quantity` is zero; callers validate quantity at the edge.
    pub fn add(
        &mut self,
        product: ProductSnapshot,
        variation: Option<VariationSnapshot>,
        features: Vec<FeatureSnapshot>,
        quantity: u32,
    ) {
        assert!(quantity >= 1, "cart line quantity must be >= 1");

        let line = CartLine {
            product,
            variation,
            features,
            quantity,
        };

        let key = line.merge_key();
        if let Some(existing) = self.lines.iter_mut().find(|l| l.merge_key() == key) {
            existing.quantity += quantity;
        } else {
            self.lines.push(line);
        }
    }

    /// Set the quantity of the line at `index`.
    ///
    /// A `new_quantity` below 1 is rejected as a no-op, leaving the cart
    /// unchanged; there is no quantity-zero state.
    ///
    /// # Errors
    ///
    /// Returns `CartError::OutOfRange` if `index` does not name a line.
    pub fn update_quantity(&mut self, index: usize, new_quantity: u32) -> Result<(), CartError> {
        if index >= self.lines.len() {
            return Err(CartError::OutOfRange(index));
        }
        if new_quantity < 1 {
            return Ok(());
        }
        if let Some(line) = self.lines.get_mut(index) {
            line.quantity = new_quantity;
        }
        Ok(())
    }

    /// Remove the line at `index` entirely.
    ///
    /// # Errors
    ///
    /// Returns `CartError::OutOfRange` if `index` does not name a line.
    pub fn remove(&mut self, index: usize) -> Result<CartLine, CartError> {
        if index >= self.lines.len() {
            return Err(CartError::OutOfRange(index));
        }
        Ok(self.lines.remove(index))
    }
}
