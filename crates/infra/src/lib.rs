//! # Shoptok Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The shared HTTP client wrapper
//! - Store and AI service integrations (Shopify, TikTok Shop, OpenAI)
//! - Configuration loading from the environment
//! - The interval scheduler and the health endpoint

pub mod config;
pub mod health;
pub mod http;
pub mod integrations;
pub mod scheduling;

pub use config::load_config;
pub use health::{ComponentStatus, HealthState};
pub use http::HttpClient;
pub use integrations::openai::{DryRunEnrichment, OpenAiClient};
pub use integrations::shopify::ShopifyClient;
pub use integrations::tiktok::{select_destination, MockTikTokClient, TikTokClient};
pub use scheduling::{SchedulerError, SyncScheduler};
