//! Mock collaborators for engine tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use shoptok_core::ports::{
    BulkPushOutcome, DestinationClient, EnrichedFields, EnrichmentClient, SourceClient,
};
use shoptok_domain::{
    EnrichedProduct, FulfillmentRequest, InventoryLevel, InventoryUpdate, Order, Product, Result,
    SyncError, TrackingUpdate, Variant,
};

pub fn product(id: &str, title: &str, sku: &str, quantity: i64) -> Product {
    Product {
        id: id.into(),
        title: title.into(),
        description: format!("{title} description"),
        handle: String::new(),
        vendor: String::new(),
        product_type: "Apparel".into(),
        tags: vec!["trendy".into()],
        images: vec![],
        variants: vec![Variant {
            sku: sku.into(),
            title: "Default".into(),
            price: "19.99".into(),
            inventory_quantity: quantity,
            inventory_item_id: None,
            barcode: String::new(),
        }],
    }
}

/// Source store stub returning fixed data.
pub struct StubSource {
    pub products: Vec<Product>,
    pub inventory: Vec<InventoryLevel>,
    pub tracking: Option<TrackingUpdate>,
    pub pressure: Option<f64>,
    pub fulfillments: Mutex<Vec<FulfillmentRequest>>,
}

impl StubSource {
    pub fn new(products: Vec<Product>, inventory: Vec<InventoryLevel>) -> Self {
        Self {
            products,
            inventory,
            tracking: None,
            pressure: None,
            fulfillments: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SourceClient for StubSource {
    async fn fetch_products(&self, limit: Option<usize>) -> Result<Vec<Product>> {
        let mut products = self.products.clone();
        if let Some(limit) = limit {
            products.truncate(limit);
        }
        Ok(products)
    }

    async fn fetch_inventory(&self) -> Result<Vec<InventoryLevel>> {
        Ok(self.inventory.clone())
    }

    async fn create_fulfillment(
        &self,
        request: &FulfillmentRequest,
    ) -> Result<Option<TrackingUpdate>> {
        self.fulfillments.lock().push(request.clone());
        Ok(self.tracking.clone())
    }

    fn rate_limit_pressure(&self) -> Option<f64> {
        self.pressure
    }
}

/// Destination store that records calls and can fail selected
/// inventory batches (keyed by bulk-update call number, 0-based).
#[derive(Default)]
pub struct RecordingDestination {
    pub failing_inventory_batches: Vec<u32>,
    pub orders: Vec<Order>,
    pub inventory_calls: AtomicU32,
    pub pushed_inventory: Mutex<Vec<Vec<InventoryUpdate>>>,
    pub created_products: Mutex<Vec<EnrichedProduct>>,
    pub tracking_updates: Mutex<Vec<(String, TrackingUpdate)>>,
}

impl RecordingDestination {
    pub fn mutation_count(&self) -> usize {
        self.pushed_inventory.lock().len()
            + self.created_products.lock().len()
            + self.tracking_updates.lock().len()
    }
}

#[async_trait]
impl DestinationClient for RecordingDestination {
    async fn update_inventory(&self, update: &InventoryUpdate) -> Result<()> {
        self.pushed_inventory.lock().push(vec![update.clone()]);
        Ok(())
    }

    async fn bulk_update_inventory(&self, updates: &[InventoryUpdate]) -> Result<()> {
        let call = self.inventory_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_inventory_batches.contains(&call) {
            return Err(SyncError::Auth("batch rejected (403)".into()));
        }
        self.pushed_inventory.lock().push(updates.to_vec());
        Ok(())
    }

    async fn create_product(&self, product: &EnrichedProduct) -> Result<String> {
        self.created_products.lock().push(product.clone());
        Ok(format!("dest-{}", product.source_id))
    }

    async fn bulk_create_products(
        &self,
        products: &[EnrichedProduct],
    ) -> Result<BulkPushOutcome> {
        let mut created = Vec::new();
        for product in products {
            self.created_products.lock().push(product.clone());
            created.push(format!("dest-{}", product.source_id));
        }
        Ok(BulkPushOutcome::all_submitted(products.len(), created))
    }

    async fn update_product(&self, _product_id: &str, product: &EnrichedProduct) -> Result<()> {
        self.created_products.lock().push(product.clone());
        Ok(())
    }

    async fn list_orders(&self, limit: usize) -> Result<Vec<Order>> {
        Ok(self.orders.iter().take(limit).cloned().collect())
    }

    async fn update_tracking(&self, order_id: &str, tracking: &TrackingUpdate) -> Result<()> {
        self.tracking_updates.lock().push((order_id.to_string(), tracking.clone()));
        Ok(())
    }
}

/// Enrichment stub: always succeeds, or always fails.
pub struct StubEnrichment {
    pub error: Option<SyncError>,
    pub calls: AtomicU32,
}

impl StubEnrichment {
    pub fn available() -> Arc<Self> {
        Arc::new(Self { error: None, calls: AtomicU32::new(0) })
    }

    pub fn unavailable() -> Arc<Self> {
        Arc::new(Self {
            error: Some(SyncError::Network("enrichment unreachable".into())),
            calls: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl EnrichmentClient for StubEnrichment {
    async fn enrich(&self, product: &Product) -> Result<EnrichedFields> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        Ok(EnrichedFields {
            title: format!("{} | Must Have", product.title),
            description: format!("{} #TikTokMadeMeBuyIt", product.description),
            category: Some("Fashion".into()),
            hashtags: vec!["#TikTokMadeMeBuyIt".into()],
            keywords: vec!["viral".into()],
        })
    }
}
