//! Domain types and models

pub mod config;
pub mod report;

use serde::{Deserialize, Serialize};

/// A product as fetched from the source store.
///
/// Source of truth is the source platform; this system only reads it
/// and feeds it into enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub product_type: String,
    /// Unordered, unique tag strings.
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

/// A sellable variant of a product. SKUs are unique within a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub sku: String,
    #[serde(default)]
    pub title: String,
    /// Decimal price as the platforms transmit it (e.g. "29.99").
    pub price: String,
    #[serde(default)]
    pub inventory_quantity: i64,
    #[serde(default)]
    pub inventory_item_id: Option<i64>,
    #[serde(default)]
    pub barcode: String,
}

/// Stock level for a single SKU at the source store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryLevel {
    pub sku: String,
    pub available: i64,
    #[serde(default)]
    pub inventory_item_id: Option<i64>,
}

/// A (sku, quantity) pair pushed to the destination store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryUpdate {
    pub sku: String,
    pub quantity: i64,
}

/// Where an enriched product's metadata came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingSource {
    /// Produced by the AI enrichment collaborator.
    Enriched,
    /// Derived deterministically from the raw product after the AI
    /// path failed or was unavailable.
    Fallback,
}

/// A product optimized for the destination store.
///
/// Variants and images are carried over from the source product
/// unchanged; only the metadata is rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedProduct {
    pub source_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub hashtags: Vec<String>,
    pub keywords: Vec<String>,
    pub images: Vec<String>,
    pub variants: Vec<Variant>,
    pub source: MappingSource,
}

/// An order observed on the destination store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    #[serde(default)]
    pub line_items: Vec<OrderLineItem>,
    #[serde(default)]
    pub total_price: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub sku: String,
    #[serde(default)]
    pub title: String,
    pub quantity: i64,
}

/// Payload forwarded to the source store to trigger fulfillment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FulfillmentRequest {
    pub order_id: String,
    pub line_items: Vec<OrderLineItem>,
}

/// Shipment tracking data pushed back to the destination store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingUpdate {
    pub tracking_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,
}
