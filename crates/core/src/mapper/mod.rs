//! AI product mapper with enrichment cache and deterministic fallback.
//!
//! `map_product` never fails: the AI path goes through the retry
//! policy, and any terminal enrichment error degrades to the fallback
//! mapping so a sync pass can always proceed.

pub mod fallback;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use moka::sync::Cache;
use shoptok_domain::{
    product_fingerprint, EnrichedProduct, MappingSource, Product, SyncError,
};
use tracing::{debug, info, warn};

use crate::ports::{EnrichedFields, EnrichmentClient};
use crate::retry::RetryStrategy;

pub use fallback::fallback_mapping;

// Cache capacity is effectively unbounded for a catalog-sized keyspace;
// entries live for the process lifetime.
const CACHE_CAPACITY: u64 = 100_000;

/// Counters exposed to the health surface.
#[derive(Debug, Default)]
pub struct MapperStats {
    enriched: AtomicU64,
    fallbacks: AtomicU64,
    cache_hits: AtomicU64,
    auth_failed: AtomicBool,
}

impl MapperStats {
    pub fn enriched(&self) -> u64 {
        self.enriched.load(Ordering::Relaxed)
    }

    pub fn fallbacks(&self) -> u64 {
        self.fallbacks.load(Ordering::Relaxed)
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    /// True once the enrichment collaborator rejected our credentials.
    pub fn auth_failed(&self) -> bool {
        self.auth_failed.load(Ordering::Relaxed)
    }
}

/// Maps source products into destination-optimized form.
pub struct ProductMapper {
    enrichment: Arc<dyn EnrichmentClient>,
    cache: Cache<String, EnrichedProduct>,
    retry: RetryStrategy,
    cache_fallbacks: bool,
    stats: Arc<MapperStats>,
}

impl ProductMapper {
    pub fn new(
        enrichment: Arc<dyn EnrichmentClient>,
        retry: RetryStrategy,
        cache_fallbacks: bool,
    ) -> Self {
        Self {
            enrichment,
            cache: Cache::new(CACHE_CAPACITY),
            retry,
            cache_fallbacks,
            stats: Arc::new(MapperStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<MapperStats> {
        Arc::clone(&self.stats)
    }

    /// Map one product. Checks the cache first; on a miss runs the
    /// enrichment collaborator through the retry policy and falls back
    /// deterministically on any terminal error.
    pub async fn map_product(&self, product: &Product) -> EnrichedProduct {
        let fingerprint = product_fingerprint(product);

        if let Some(cached) = self.cache.get(&fingerprint) {
            debug!(product_id = %product.id, "using cached mapping");
            self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            return cached;
        }

        match self
            .retry
            .execute("enrich_product", || self.enrichment.enrich(product))
            .await
        {
            Ok(fields) => {
                let mapped = self.apply_fields(product, fields);
                self.cache.insert(fingerprint, mapped.clone());
                self.stats.enriched.fetch_add(1, Ordering::Relaxed);
                info!(product_id = %product.id, "mapped product via enrichment");
                mapped
            }
            Err(err) => {
                if let SyncError::Auth(_) = err {
                    self.stats.auth_failed.store(true, Ordering::Relaxed);
                }
                warn!(product_id = %product.id, error = %err, "enrichment failed, using fallback mapping");
                let mapped = fallback_mapping(product);
                if self.cache_fallbacks {
                    self.cache.insert(fingerprint, mapped.clone());
                }
                self.stats.fallbacks.fetch_add(1, Ordering::Relaxed);
                mapped
            }
        }
    }

    /// Map a batch in order, logging progress like a long-running job.
    pub async fn map_products(&self, products: &[Product]) -> Vec<EnrichedProduct> {
        let total = products.len();
        let mut mapped = Vec::with_capacity(total);
        for (i, product) in products.iter().enumerate() {
            debug!(position = i + 1, total, product_id = %product.id, title = %product.title, "mapping product");
            mapped.push(self.map_product(product).await);
        }
        mapped
    }

    fn apply_fields(&self, product: &Product, fields: EnrichedFields) -> EnrichedProduct {
        let category = fields
            .category
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| {
                if product.product_type.trim().is_empty() {
                    fallback::DEFAULT_CATEGORY.to_string()
                } else {
                    product.product_type.clone()
                }
            });

        EnrichedProduct {
            source_id: product.id.clone(),
            title: if fields.title.is_empty() { product.title.clone() } else { fields.title },
            description: if fields.description.is_empty() {
                product.description.clone()
            } else {
                fields.description
            },
            category,
            hashtags: fields.hashtags,
            keywords: fields.keywords,
            images: product.images.clone(),
            variants: product.variants.clone(),
            source: MappingSource::Enriched,
        }
    }
}
