//! Cached catalog access.
//!
//! Product detail lookups are served from a moka future cache in front of
//! the repository. Entries expire after a short TTL so admin-side catalog
//! edits become visible without a restart.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use cirrus_core::ProductId;

use super::repo::CatalogRepository;
use super::types::{Product, ProductDetail};
use crate::db::RepositoryError;

/// How long a cached product detail stays fresh.
const PRODUCT_TTL: Duration = Duration::from_secs(60);

/// Maximum number of cached product details.
const PRODUCT_CAPACITY: u64 = 1_000;

/// Read-through cache over the catalog repository.
#[derive(Clone)]
pub struct CatalogService {
    pool: PgPool,
    products: Cache<ProductId, Arc<ProductDetail>>,
}

impl CatalogService {
    /// Create a catalog service over the given pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let products = Cache::builder()
            .max_capacity(PRODUCT_CAPACITY)
            .time_to_live(PRODUCT_TTL)
            .build();

        Self { pool, products }
    }

    /// Get a product with its variations and features.
    ///
    /// Returns `None` for an unknown product ID; misses are not cached.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn product_detail(
        &self,
        id: ProductId,
    ) -> Result<Option<Arc<ProductDetail>>, RepositoryError> {
        if let Some(hit) = self.products.get(&id).await {
            return Ok(Some(hit));
        }

        let repo = CatalogRepository::new(&self.pool);
        let Some(product) = repo.product(id).await? else {
            return Ok(None);
        };
        let variations = repo.variations(id).await?;
        let features = repo.features(id).await?;

        let detail = Arc::new(ProductDetail {
            product,
            variations,
            features,
        });
        self.products.insert(id, Arc::clone(&detail)).await;

        Ok(Some(detail))
    }

    /// List all products. Uncached; the listing is cheap and changes rarely.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        CatalogRepository::new(&self.pool).list_products().await
    }
}
