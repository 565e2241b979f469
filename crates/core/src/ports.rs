//! Port interfaces for the external collaborators.
//!
//! Infra provides the real implementations; tests substitute mocks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shoptok_domain::{
    EnrichedProduct, FulfillmentRequest, InventoryLevel, InventoryUpdate, Order, Product, Result,
    TrackingUpdate,
};

/// Source commerce store (products and inventory are read from here,
/// fulfillments are created here).
#[async_trait]
pub trait SourceClient: Send + Sync {
    /// Fetch products, optionally capped for bounded test runs.
    async fn fetch_products(&self, limit: Option<usize>) -> Result<Vec<Product>>;

    /// Fetch current stock levels per SKU.
    async fn fetch_inventory(&self) -> Result<Vec<InventoryLevel>>;

    /// Trigger fulfillment for an order forwarded from the destination
    /// store. Returns tracking data when the store already assigned it.
    async fn create_fulfillment(
        &self,
        request: &FulfillmentRequest,
    ) -> Result<Option<TrackingUpdate>>;

    /// Most recently observed rate-limit pressure (used/total) from
    /// the store's response headers, if any request has been made.
    fn rate_limit_pressure(&self) -> Option<f64>;
}

/// Per-item outcome of a bulk push to the destination store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkPushOutcome {
    pub submitted: usize,
    pub failed: usize,
    /// Destination ids assigned to successfully created items.
    pub created_ids: Vec<String>,
    /// (input index, error message) for items the store rejected.
    pub errors: Vec<(usize, String)>,
}

impl BulkPushOutcome {
    pub fn all_submitted(count: usize, created_ids: Vec<String>) -> Self {
        Self { submitted: count, failed: 0, created_ids, errors: Vec::new() }
    }

    /// Error message for the item at `index`, if it failed.
    pub fn error_for(&self, index: usize) -> Option<&str> {
        self.errors.iter().find(|(i, _)| *i == index).map(|(_, msg)| msg.as_str())
    }
}

/// Destination commerce store (inventory, products, and tracking are
/// pushed here; new orders are read from here).
#[async_trait]
pub trait DestinationClient: Send + Sync {
    async fn update_inventory(&self, update: &InventoryUpdate) -> Result<()>;

    async fn bulk_update_inventory(&self, updates: &[InventoryUpdate]) -> Result<()>;

    async fn create_product(&self, product: &EnrichedProduct) -> Result<String>;

    async fn bulk_create_products(&self, products: &[EnrichedProduct])
        -> Result<BulkPushOutcome>;

    async fn update_product(&self, product_id: &str, product: &EnrichedProduct) -> Result<()>;

    async fn list_orders(&self, limit: usize) -> Result<Vec<Order>>;

    async fn update_tracking(&self, order_id: &str, tracking: &TrackingUpdate) -> Result<()>;
}

/// Metadata produced by the enrichment collaborator for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedFields {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Generative-language enrichment collaborator.
#[async_trait]
pub trait EnrichmentClient: Send + Sync {
    /// Produce optimized metadata for a product. Errors here never
    /// reach the sync passes; the mapper falls back deterministically.
    async fn enrich(&self, product: &Product) -> Result<EnrichedFields>;
}
