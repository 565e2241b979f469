//! Mock destination used when no real TikTok credentials are present.
//!
//! Logs every call with a `[mock]` marker and succeeds, so the full
//! pipeline can be exercised against Shopify and OpenAI alone.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use shoptok_core::ports::{BulkPushOutcome, DestinationClient};
use shoptok_domain::{EnrichedProduct, InventoryUpdate, Order, Result, TrackingUpdate};
use tracing::info;

const LOG_SAMPLE: usize = 5;

#[derive(Default)]
pub struct MockTikTokClient {
    next_id: AtomicU64,
    /// Call log, inspectable in tests.
    calls: Mutex<Vec<String>>,
}

impl MockTikTokClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().push(call.into());
    }

    #[cfg(test)]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn mint_id(&self) -> String {
        format!("mock-product-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[async_trait]
impl DestinationClient for MockTikTokClient {
    async fn update_inventory(&self, update: &InventoryUpdate) -> Result<()> {
        info!(sku = %update.sku, quantity = update.quantity, "[mock] inventory update");
        self.record(format!("update_inventory:{}", update.sku));
        Ok(())
    }

    async fn bulk_update_inventory(&self, updates: &[InventoryUpdate]) -> Result<()> {
        info!(count = updates.len(), "[mock] bulk inventory update");
        for update in updates.iter().take(LOG_SAMPLE) {
            info!(sku = %update.sku, quantity = update.quantity, "[mock]   item");
        }
        if updates.len() > LOG_SAMPLE {
            info!(more = updates.len() - LOG_SAMPLE, "[mock]   remaining items elided");
        }
        self.record(format!("bulk_update_inventory:{}", updates.len()));
        Ok(())
    }

    async fn create_product(&self, product: &EnrichedProduct) -> Result<String> {
        let id = self.mint_id();
        info!(title = %product.title, %id, "[mock] create product");
        self.record(format!("create_product:{}", product.source_id));
        Ok(id)
    }

    async fn bulk_create_products(
        &self,
        products: &[EnrichedProduct],
    ) -> Result<BulkPushOutcome> {
        info!(count = products.len(), "[mock] bulk create products");
        let created_ids = products.iter().map(|_| self.mint_id()).collect();
        self.record(format!("bulk_create_products:{}", products.len()));
        Ok(BulkPushOutcome::all_submitted(products.len(), created_ids))
    }

    async fn update_product(&self, product_id: &str, product: &EnrichedProduct) -> Result<()> {
        info!(%product_id, title = %product.title, "[mock] update product");
        self.record(format!("update_product:{product_id}"));
        Ok(())
    }

    /// The mock store never has orders to forward.
    async fn list_orders(&self, _limit: usize) -> Result<Vec<Order>> {
        info!("[mock] list orders");
        self.record("list_orders".to_string());
        Ok(Vec::new())
    }

    async fn update_tracking(&self, order_id: &str, tracking: &TrackingUpdate) -> Result<()> {
        info!(%order_id, tracking = %tracking.tracking_number, "[mock] update tracking");
        self.record(format!("update_tracking:{order_id}"));
        Ok(())
    }
}
