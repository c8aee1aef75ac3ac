//! Product catalog read layer.
//!
//! The catalog is read-only from the storefront's perspective: products,
//! their duration variations (subscription-length options with a price
//! multiplier), and their optional add-on features (flat-priced). Writes
//! happen elsewhere; this module only fetches and caches.

pub mod cache;
pub mod repo;
pub mod types;

pub use cache::CatalogService;
pub use repo::CatalogRepository;
pub use types::{DurationVariation, Product, ProductDetail, ProductFeature};
