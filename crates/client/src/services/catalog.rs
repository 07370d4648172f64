//! Product catalog with short-lived caching.
//!
//! The cart denormalizes product and variant snapshots at add time, so the
//! catalog is consulted on every `add_item`. Responses are cached via `moka`
//! for five minutes to keep rapid add-to-cart clicks from hammering the
//! backend.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use wealthproxies_core::{ProductId, VariantId};

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::models::{Product, ProductVariant};

const PRODUCTS_KEY: &str = "products";
const CACHE_TTL: Duration = Duration::from_secs(300);

/// Resolves a (product, variant) pair to denormalized snapshots.
///
/// The cart store consumes the catalog through this trait so tests can
/// substitute a canned resolver.
pub trait VariantResolver {
    /// Look up a product and one of its variants.
    fn resolve(
        &self,
        product_id: &ProductId,
        variant_id: &VariantId,
    ) -> impl Future<Output = Result<(Product, ProductVariant), ClientError>> + Send;
}

/// Cached view of `GET /api/products`.
#[derive(Clone)]
pub struct ProductCatalog {
    api: ApiClient,
    cache: Cache<&'static str, Arc<Vec<Product>>>,
}

impl ProductCatalog {
    /// Create a new catalog over an API client.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(CACHE_TTL)
            .build();

        Self { api, cache }
    }

    /// The full product list, served from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` if the cache is cold and the backend call
    /// fails. Errors are not cached; the next call retries.
    pub async fn products(&self) -> Result<Arc<Vec<Product>>, ClientError> {
        if let Some(products) = self.cache.get(PRODUCTS_KEY).await {
            return Ok(products);
        }

        let products = Arc::new(self.api.products().await?);
        self.cache.insert(PRODUCTS_KEY, products.clone()).await;
        tracing::debug!(count = products.len(), "Refreshed product catalog");
        Ok(products)
    }

    /// Drop the cached product list (e.g., after an admin edit).
    pub fn invalidate(&self) {
        self.cache.invalidate_all();
    }
}

impl VariantResolver for ProductCatalog {
    async fn resolve(
        &self,
        product_id: &ProductId,
        variant_id: &VariantId,
    ) -> Result<(Product, ProductVariant), ClientError> {
        let products = self.products().await?;

        let product = products
            .iter()
            .find(|p| &p.id == product_id)
            .ok_or_else(|| ClientError::NotFound(format!("product {product_id}")))?;
        let variant = product
            .variant(variant_id)
            .ok_or_else(|| ClientError::NotFound(format!("variant {variant_id}")))?;

        Ok((product.clone(), variant.clone()))
    }
}
