//! # shoptok domain
//!
//! Pure types shared across the workspace: catalog entities, sync
//! reporting, configuration, and the error taxonomy. No I/O lives here.

pub mod errors;
pub mod fingerprint;
pub mod types;

pub use errors::{Result, SyncError};
pub use fingerprint::product_fingerprint;
pub use types::config::{Config, OpenAiConfig, ShopifyConfig, SyncSettings, TikTokConfig};
pub use types::report::{ItemKind, SyncOutcome, SyncReport, SyncResult};
pub use types::{
    EnrichedProduct, FulfillmentRequest, InventoryLevel, InventoryUpdate, MappingSource, Order,
    OrderLineItem, Product, TrackingUpdate, Variant,
};
