//! TikTok Shop partner API integration (the destination store).

mod client;
mod mock;
mod signing;
mod types;

use std::sync::Arc;

use shoptok_core::ports::DestinationClient;
use shoptok_domain::{Result, TikTokConfig};
use tracing::warn;

pub use client::TikTokClient;
pub use mock::MockTikTokClient;

/// Pick the destination client at startup. Credentials that do not
/// look like a real partner app key select the mock, so the bot can
/// run end to end against Shopify and OpenAI alone.
pub fn select_destination(config: &TikTokConfig) -> Result<Arc<dyn DestinationClient>> {
    if config.has_credentials() {
        Ok(Arc::new(TikTokClient::new(config)?))
    } else {
        warn!("TikTok credentials missing or unrecognized, using mock destination");
        Ok(Arc::new(MockTikTokClient::new()))
    }
}
