//! # shoptok core
//!
//! Orchestration services and the port interfaces they depend on.
//!
//! This crate contains:
//! - Port traits for the source store, destination store, and AI
//!   enrichment collaborators (implemented in `shoptok-infra`)
//! - The retry policy applied around every external call
//! - The AI product mapper with its enrichment cache and fallback
//! - The sync engine running inventory, product, and order passes

pub mod engine;
pub mod mapper;
pub mod ports;
pub mod retry;

pub use engine::{SyncEngine, SyncMode};
pub use mapper::{MapperStats, ProductMapper};
pub use ports::{BulkPushOutcome, DestinationClient, EnrichmentClient, EnrichedFields, SourceClient};
pub use retry::RetryStrategy;
