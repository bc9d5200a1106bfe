//! Per-session product image cache.
//!
//! Images are fetched through the catalog gateway once and reused across
//! views via `moka`. A view that is done with an image calls
//! [`ImageCache::release`] (the unmount analogue) and the bytes are
//! dropped once the last clone goes away. Fetches for different products
//! run concurrently; concurrent resolves for the same product share one
//! in-flight fetch, and failed fetches cache nothing.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::instrument;

use clementine_core::ProductId;

use crate::catalog::{CatalogClient, ProductImage};
use crate::error::{ApiError, ApiResult};

const MAX_CACHED_IMAGES: u64 = 1000;
const IMAGE_TTL: Duration = Duration::from_secs(300); // 5 minutes

/// Session-scoped cache of fetched product images.
#[derive(Clone)]
pub struct ImageCache {
    inner: Arc<ImageCacheInner>,
}

struct ImageCacheInner {
    cache: Cache<ProductId, ProductImage>,
    catalog: CatalogClient,
}

impl ImageCache {
    #[must_use]
    pub fn new(catalog: CatalogClient) -> Self {
        let cache = Cache::builder()
            .max_capacity(MAX_CACHED_IMAGES)
            .time_to_live(IMAGE_TTL)
            .build();
        Self {
            inner: Arc::new(ImageCacheInner { cache, catalog }),
        }
    }

    /// Return the cached image for `id`, fetching and caching it on a miss.
    ///
    /// Concurrent resolves for the same id wait on one shared fetch
    /// instead of each hitting the backend.
    ///
    /// # Errors
    ///
    /// Propagates the gateway error on a failed fetch; nothing is cached
    /// in that case, so the next resolve retries.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn resolve(&self, id: &ProductId) -> ApiResult<ProductImage> {
        self.inner
            .cache
            .try_get_with(id.clone(), self.inner.catalog.fetch_image(id))
            .await
            .map_err(|err| Arc::try_unwrap(err).unwrap_or_else(ApiError::Shared))
    }

    /// Drop the cached entry for `id`. Call when the owning view unmounts.
    pub async fn release(&self, id: &ProductId) {
        self.inner.cache.invalidate(id).await;
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        self.inner.cache.invalidate_all();
    }
}
