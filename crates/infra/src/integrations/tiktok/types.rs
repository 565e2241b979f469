//! Wire types for the TikTok Shop partner API.

use serde::{Deserialize, Serialize};
use shoptok_domain::{EnrichedProduct, InventoryUpdate, Order, OrderLineItem, TrackingUpdate};

/// Every partner API response is wrapped in this envelope. `code` 0 is
/// success; anything else carries an application-level failure even on
/// HTTP 200.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

#[derive(Debug, Serialize)]
pub struct InventoryItemPayload {
    pub sku_id: String,
    pub quantity: i64,
}

impl From<&InventoryUpdate> for InventoryItemPayload {
    fn from(update: &InventoryUpdate) -> Self {
        Self { sku_id: update.sku.clone(), quantity: update.quantity }
    }
}

#[derive(Debug, Serialize)]
pub struct BulkInventoryPayload {
    pub inventory_list: Vec<InventoryItemPayload>,
}

#[derive(Debug, Serialize)]
pub struct ProductPayload {
    pub title: String,
    pub description: String,
    pub category: String,
    pub hashtags: Vec<String>,
    pub keywords: Vec<String>,
    pub images: Vec<String>,
    pub skus: Vec<SkuPayload>,
}

#[derive(Debug, Serialize)]
pub struct SkuPayload {
    pub sku_id: String,
    pub price: String,
    pub stock: i64,
}

impl From<&EnrichedProduct> for ProductPayload {
    fn from(product: &EnrichedProduct) -> Self {
        Self {
            title: product.title.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            hashtags: product.hashtags.clone(),
            keywords: product.keywords.clone(),
            images: product.images.clone(),
            skus: product
                .variants
                .iter()
                .map(|variant| SkuPayload {
                    sku_id: variant.sku.clone(),
                    price: variant.price.clone(),
                    stock: variant.inventory_quantity.max(0),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BulkProductPayload {
    pub products: Vec<ProductPayload>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductData {
    pub product_id: String,
}

#[derive(Debug, Deserialize)]
pub struct BulkCreateData {
    #[serde(default)]
    pub results: Vec<BulkCreateResult>,
}

#[derive(Debug, Deserialize)]
pub struct BulkCreateResult {
    pub success: bool,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrdersData {
    #[serde(default)]
    pub orders: Vec<OrderWire>,
}

#[derive(Debug, Deserialize)]
pub struct OrderWire {
    pub order_id: String,
    #[serde(default)]
    pub line_items: Vec<OrderLineItemWire>,
    #[serde(default)]
    pub total_price: String,
}

#[derive(Debug, Deserialize)]
pub struct OrderLineItemWire {
    pub sku_id: String,
    #[serde(default)]
    pub product_name: String,
    pub quantity: i64,
}

impl From<OrderWire> for Order {
    fn from(wire: OrderWire) -> Self {
        Order {
            order_id: wire.order_id,
            line_items: wire
                .line_items
                .into_iter()
                .map(|item| OrderLineItem {
                    sku: item.sku_id,
                    title: item.product_name,
                    quantity: item.quantity,
                })
                .collect(),
            total_price: wire.total_price,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TrackingPayload {
    pub order_id: String,
    pub tracking_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,
}

impl TrackingPayload {
    pub fn new(order_id: &str, tracking: &TrackingUpdate) -> Self {
        Self {
            order_id: order_id.to_string(),
            tracking_number: tracking.tracking_number.clone(),
            tracking_url: tracking.tracking_url.clone(),
            carrier: tracking.carrier.clone(),
        }
    }
}

/// `data` payload for endpoints that return nothing of interest.
#[derive(Debug, Deserialize)]
pub struct EmptyData {}
