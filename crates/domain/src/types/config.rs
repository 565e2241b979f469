//! Process configuration.
//!
//! Built by the infra config loader from environment variables and
//! passed explicitly to each component at construction time.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SyncError};

pub const DEFAULT_SHOPIFY_API_VERSION: &str = "2025-10";
pub const DEFAULT_TIKTOK_API_BASE: &str = "https://partner.tiktokshop.com/api";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_BACKOFF: f64 = 2.0;
pub const DEFAULT_HEALTH_PORT: u16 = 5000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub shopify: ShopifyConfig,
    pub tiktok: TikTokConfig,
    pub openai: OpenAiConfig,
    pub sync: SyncSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopifyConfig {
    /// Store domain, e.g. `your-store.myshopify.com`.
    pub store: String,
    /// Admin API access token.
    pub token: String,
    pub api_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TikTokConfig {
    pub app_key: String,
    pub secret: String,
    pub api_base: String,
}

impl TikTokConfig {
    /// Whether the credentials look usable. Partner app keys are
    /// issued with an `app_` prefix; anything else selects the mock
    /// destination client at startup.
    pub fn has_credentials(&self) -> bool {
        self.app_key.starts_with("app_") && !self.secret.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    pub interval_seconds: u64,
    pub batch_size: usize,
    pub max_retries: u32,
    /// Base backoff in seconds; the n-th retry waits `base * 2^(n-1)`.
    pub backoff_base: f64,
    /// Whether fallback mappings are stored in the enrichment cache
    /// like AI results. When false, a failing AI dependency is retried
    /// on every pass instead of degrading for the process lifetime.
    pub cache_fallback_results: bool,
    pub health_port: u16,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            interval_seconds: DEFAULT_SYNC_INTERVAL_SECS,
            batch_size: DEFAULT_BATCH_SIZE,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base: DEFAULT_RETRY_BACKOFF,
            cache_fallback_results: true,
            health_port: DEFAULT_HEALTH_PORT,
        }
    }
}

impl Config {
    /// Validate required settings. Called once at startup; failure is
    /// fatal and the process does not proceed.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.shopify.store.is_empty() {
            missing.push("SHOPIFY_STORE");
        }
        if self.shopify.token.is_empty() {
            missing.push("SHOPIFY_TOKEN");
        }
        if self.openai.api_key.is_empty() {
            missing.push("OPENAI_API_KEY");
        }
        if !missing.is_empty() {
            return Err(SyncError::Config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }
        if self.sync.batch_size == 0 {
            return Err(SyncError::Config("BATCH_SIZE must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            shopify: ShopifyConfig {
                store: "test-store.myshopify.com".into(),
                token: "shpat_test".into(),
                api_version: DEFAULT_SHOPIFY_API_VERSION.into(),
            },
            tiktok: TikTokConfig {
                app_key: String::new(),
                secret: String::new(),
                api_base: DEFAULT_TIKTOK_API_BASE.into(),
            },
            openai: OpenAiConfig { api_key: "sk-test".into(), model: DEFAULT_OPENAI_MODEL.into() },
            sync: SyncSettings::default(),
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn missing_required_values_are_fatal() {
        let mut config = sample();
        config.shopify.store = String::new();
        config.openai.api_key = String::new();
        let err = config.validate().unwrap_err();
        match err {
            SyncError::Config(msg) => {
                assert!(msg.contains("SHOPIFY_STORE"));
                assert!(msg.contains("OPENAI_API_KEY"));
            }
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn tiktok_credentials_require_app_prefix() {
        let mut config = sample();
        assert!(!config.tiktok.has_credentials());

        config.tiktok.app_key = "app_12345".into();
        config.tiktok.secret = "secret".into();
        assert!(config.tiktok.has_credentials());

        config.tiktok.app_key = "wrong_prefix".into();
        assert!(!config.tiktok.has_credentials());
    }
}
