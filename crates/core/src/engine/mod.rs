//! Sync engine: inventory, product, and order passes.
//!
//! Each pass fetches from one store, pushes to the other in batches,
//! and records one [`SyncResult`] per item. Failures are isolated to
//! the affected batch or item; a pass always runs to completion and
//! returns a report. Dry-run replaces every mutating call with a
//! `Skipped` result carrying the payload that would have been sent.

use std::sync::Arc;

use shoptok_domain::{
    EnrichedProduct, FulfillmentRequest, InventoryUpdate, ItemKind, Order, SyncReport, SyncResult,
};
use tracing::{info, warn};

use crate::mapper::ProductMapper;
use crate::ports::{DestinationClient, SourceClient};
use crate::retry::RetryStrategy;

/// How many orders one order pass pulls from the destination store.
const ORDER_FETCH_LIMIT: usize = 50;

/// Rate-limit pressure above which a warning is logged after fetches.
const RATE_LIMIT_WARN_THRESHOLD: f64 = 0.9;

/// Which pass (or combination) to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    Full,
    Inventory,
    Products,
    Orders,
}

impl SyncMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Inventory => "inventory",
            Self::Products => "products",
            Self::Orders => "orders",
        }
    }
}

/// Orchestrates sync passes between the source and destination stores.
pub struct SyncEngine {
    source: Arc<dyn SourceClient>,
    destination: Arc<dyn DestinationClient>,
    mapper: Arc<ProductMapper>,
    retry: RetryStrategy,
    batch_size: usize,
    dry_run: bool,
}

impl SyncEngine {
    pub fn new(
        source: Arc<dyn SourceClient>,
        destination: Arc<dyn DestinationClient>,
        mapper: Arc<ProductMapper>,
        retry: RetryStrategy,
        batch_size: usize,
        dry_run: bool,
    ) -> Self {
        Self { source, destination, mapper, retry, batch_size: batch_size.max(1), dry_run }
    }

    /// Run the passes selected by `mode`, merging their reports.
    pub async fn run(&self, mode: SyncMode, limit: Option<usize>) -> SyncReport {
        info!(mode = mode.as_str(), dry_run = self.dry_run, "starting sync pass");
        let mut report = SyncReport::new();
        match mode {
            SyncMode::Full => {
                report.merge(self.sync_inventory().await);
                report.merge(self.sync_products(limit).await);
                report.merge(self.sync_orders().await);
            }
            SyncMode::Inventory => report.merge(self.sync_inventory().await),
            SyncMode::Products => report.merge(self.sync_products(limit).await),
            SyncMode::Orders => report.merge(self.sync_orders().await),
        }
        info!(mode = mode.as_str(), summary = %report, "sync pass completed");
        report
    }

    /// Push current source stock levels to the destination in batches.
    pub async fn sync_inventory(&self) -> SyncReport {
        let mut report = SyncReport::new();

        let levels = match self
            .retry
            .execute("fetch_inventory", || self.source.fetch_inventory())
            .await
        {
            Ok(levels) => levels,
            Err(err) => {
                warn!(error = %err, "inventory fetch failed");
                report.record(SyncResult::failed(ItemKind::Inventory, "fetch", err.to_string()));
                return report;
            }
        };
        self.warn_on_rate_limit_pressure();

        let updates: Vec<InventoryUpdate> = levels
            .into_iter()
            .filter(|level| !level.sku.is_empty())
            .map(|level| InventoryUpdate { sku: level.sku, quantity: level.available.max(0) })
            .collect();

        if updates.is_empty() {
            warn!("no inventory levels to sync");
            return report;
        }

        let total_batches = updates.len().div_ceil(self.batch_size);
        for (batch_index, batch) in updates.chunks(self.batch_size).enumerate() {
            info!(
                batch = batch_index + 1,
                total_batches,
                items = batch.len(),
                "processing inventory batch"
            );

            if self.dry_run {
                for update in batch {
                    report.record(SyncResult::skipped(
                        ItemKind::Inventory,
                        update.sku.as_str(),
                        format!("would set stock to {}", update.quantity),
                    ));
                }
                continue;
            }

            let pushed = self
                .retry
                .execute("bulk_update_inventory", || {
                    self.destination.bulk_update_inventory(batch)
                })
                .await;

            match pushed {
                Ok(()) => {
                    for update in batch {
                        report.record(SyncResult::success(ItemKind::Inventory, update.sku.as_str()));
                    }
                }
                Err(err) => {
                    // Batch failure stays isolated; remaining batches proceed.
                    warn!(batch = batch_index + 1, error = %err, "inventory batch failed");
                    for update in batch {
                        report.record(SyncResult::failed(
                            ItemKind::Inventory,
                            update.sku.as_str(),
                            err.to_string(),
                        ));
                    }
                }
            }
        }

        info!(summary = %report, "inventory sync finished");
        report
    }

    /// Fetch products, enrich them, and push creates to the destination.
    pub async fn sync_products(&self, limit: Option<usize>) -> SyncReport {
        let mut report = SyncReport::new();

        let products = match self
            .retry
            .execute("fetch_products", || self.source.fetch_products(limit))
            .await
        {
            Ok(products) => products,
            Err(err) => {
                warn!(error = %err, "product fetch failed");
                report.record(SyncResult::failed(ItemKind::Product, "fetch", err.to_string()));
                return report;
            }
        };
        self.warn_on_rate_limit_pressure();

        if products.is_empty() {
            warn!("no products to sync");
            return report;
        }

        info!(count = products.len(), "optimizing products for the destination store");
        let enriched = self.mapper.map_products(&products).await;

        for batch in enriched.chunks(self.batch_size) {
            self.push_product_batch(batch, &mut report).await;
        }

        info!(summary = %report, "product sync finished");
        report
    }

    async fn push_product_batch(&self, batch: &[EnrichedProduct], report: &mut SyncReport) {
        if self.dry_run {
            for product in batch {
                report.record(SyncResult::skipped(
                    ItemKind::Product,
                    product.source_id.as_str(),
                    format!("would create \"{}\" in category {}", product.title, product.category),
                ));
            }
            return;
        }

        let outcome = self
            .retry
            .execute("bulk_create_products", || self.destination.bulk_create_products(batch))
            .await;

        match outcome {
            Ok(outcome) => {
                for (index, product) in batch.iter().enumerate() {
                    match outcome.error_for(index) {
                        None => {
                            report.record(SyncResult::success(ItemKind::Product, product.source_id.as_str()))
                        }
                        Some(msg) => report.record(SyncResult::failed(
                            ItemKind::Product,
                            product.source_id.as_str(),
                            msg,
                        )),
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, "product batch failed");
                for product in batch {
                    report.record(SyncResult::failed(
                        ItemKind::Product,
                        product.source_id.as_str(),
                        err.to_string(),
                    ));
                }
            }
        }
    }

    /// Forward destination orders to the source for fulfillment and
    /// push tracking data back once the source assigned it.
    pub async fn sync_orders(&self) -> SyncReport {
        let mut report = SyncReport::new();

        let orders = match self
            .retry
            .execute("list_orders", || self.destination.list_orders(ORDER_FETCH_LIMIT))
            .await
        {
            Ok(orders) => orders,
            Err(err) => {
                warn!(error = %err, "order fetch failed");
                report.record(SyncResult::failed(ItemKind::Order, "fetch", err.to_string()));
                return report;
            }
        };

        if orders.is_empty() {
            info!("no new orders found");
            return report;
        }

        info!(count = orders.len(), "processing orders");
        for order in &orders {
            report.record(self.process_order(order).await);
        }

        info!(summary = %report, "order sync finished");
        report
    }

    async fn process_order(&self, order: &Order) -> SyncResult {
        let request = FulfillmentRequest {
            order_id: order.order_id.clone(),
            line_items: order.line_items.clone(),
        };

        if self.dry_run {
            return SyncResult::skipped(
                ItemKind::Order,
                order.order_id.as_str(),
                format!("would fulfill {} line item(s)", request.line_items.len()),
            );
        }

        let tracking = match self
            .retry
            .execute("create_fulfillment", || self.source.create_fulfillment(&request))
            .await
        {
            Ok(tracking) => tracking,
            Err(err) => {
                warn!(order_id = %order.order_id, error = %err, "fulfillment failed");
                return SyncResult::failed(ItemKind::Order, order.order_id.as_str(), err.to_string());
            }
        };

        if let Some(tracking) = tracking {
            let pushed = self
                .retry
                .execute("update_tracking", || {
                    self.destination.update_tracking(order.order_id.as_str(), &tracking)
                })
                .await;
            if let Err(err) = pushed {
                warn!(order_id = %order.order_id, error = %err, "tracking update failed");
                return SyncResult::failed(ItemKind::Order, order.order_id.as_str(), err.to_string());
            }
        }

        SyncResult::success(ItemKind::Order, order.order_id.as_str())
    }

    fn warn_on_rate_limit_pressure(&self) {
        if let Some(ratio) = self.source.rate_limit_pressure() {
            if rate_limit_pressure_high(ratio) {
                warn!(ratio, "source API rate limit nearly exhausted");
            }
        }
    }
}

fn rate_limit_pressure_high(ratio: f64) -> bool {
    ratio > RATE_LIMIT_WARN_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_warning_fires_above_ninety_percent() {
        assert!(!rate_limit_pressure_high(0.5));
        assert!(!rate_limit_pressure_high(0.9));
        assert!(rate_limit_pressure_high(0.95));
        assert!(rate_limit_pressure_high(1.0));
    }
}
