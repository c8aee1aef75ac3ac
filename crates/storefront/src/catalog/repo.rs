//! Catalog repository for database reads.

use sqlx::PgPool;

use cirrus_core::ProductId;

use super::types::{DurationVariation, Product, ProductFeature};
use crate::db::RepositoryError;

/// Repository for read-only catalog queries.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r"
            SELECT id, name, description, short_description, category_id,
                   price, image, is_featured
            FROM products
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// List all products, featured first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT id, name, description, short_description, category_id,
                   price, image, is_featured
            FROM products
            ORDER BY is_featured DESC, name
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// Get the duration variations for a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn variations(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<DurationVariation>, RepositoryError> {
        let variations = sqlx::query_as::<_, DurationVariation>(
            r"
            SELECT id, product_id, duration, price_modifier
            FROM product_variations
            WHERE product_id = $1
            ORDER BY price_modifier
            ",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(variations)
    }

    /// Get the add-on features for a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn features(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ProductFeature>, RepositoryError> {
        let features = sqlx::query_as::<_, ProductFeature>(
            r"
            SELECT id, product_id, name, description, price
            FROM product_features
            WHERE product_id = $1
            ORDER BY name
            ",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(features)
    }
}
