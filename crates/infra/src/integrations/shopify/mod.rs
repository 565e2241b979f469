//! Shopify Admin REST API integration (the source store).

mod client;
mod types;

pub use client::ShopifyClient;
