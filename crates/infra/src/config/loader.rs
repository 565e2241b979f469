//! Configuration loader.
//!
//! Reads everything from environment variables (a local `.env` file is
//! honored via dotenvy). Missing required values are fatal at startup.
//!
//! ## Environment Variables
//! - `SHOPIFY_STORE`: store domain, e.g. `your-store.myshopify.com` (required)
//! - `SHOPIFY_TOKEN` (or legacy `SHOPIFY_ACCESS_TOKEN`): Admin API token (required)
//! - `SHOPIFY_API_VERSION`: Admin API version, default `2025-10`
//! - `TIKTOK_APP_KEY` / `TIKTOK_SECRET`: partner credentials; an app key
//!   without the `app_` prefix selects the mock destination
//! - `TIKTOK_API_BASE`: partner API base URL
//! - `OPENAI_API_KEY`: enrichment credentials (required)
//! - `OPENAI_MODEL`: default `gpt-4o-mini`
//! - `SYNC_INTERVAL`: seconds between passes, default 300
//! - `BATCH_SIZE`: items per destination batch, default 100
//! - `MAX_RETRIES` / `RETRY_BACKOFF`: retry policy, defaults 3 and 2.0
//! - `CACHE_FALLBACK_RESULTS`: cache fallback mappings, default true
//! - `HEALTH_PORT`: health endpoint port, default 5000

use std::env;
use std::str::FromStr;

use shoptok_domain::types::config::{
    DEFAULT_BATCH_SIZE, DEFAULT_HEALTH_PORT, DEFAULT_MAX_RETRIES, DEFAULT_OPENAI_MODEL,
    DEFAULT_RETRY_BACKOFF, DEFAULT_SHOPIFY_API_VERSION, DEFAULT_SYNC_INTERVAL_SECS,
    DEFAULT_TIKTOK_API_BASE,
};
use shoptok_domain::{
    Config, OpenAiConfig, Result, ShopifyConfig, SyncError, SyncSettings, TikTokConfig,
};
use tracing::info;

/// Load and validate configuration from the environment.
pub fn load_config() -> Result<Config> {
    // A missing .env file is fine; real deployments set env directly.
    let _ = dotenvy::dotenv();

    let shopify = ShopifyConfig {
        store: env_or_default("SHOPIFY_STORE", ""),
        token: env::var("SHOPIFY_TOKEN")
            .or_else(|_| env::var("SHOPIFY_ACCESS_TOKEN"))
            .unwrap_or_default(),
        api_version: env_or_default("SHOPIFY_API_VERSION", DEFAULT_SHOPIFY_API_VERSION),
    };

    let tiktok = TikTokConfig {
        app_key: env_or_default("TIKTOK_APP_KEY", ""),
        secret: env_or_default("TIKTOK_SECRET", ""),
        api_base: env_or_default("TIKTOK_API_BASE", DEFAULT_TIKTOK_API_BASE),
    };

    let openai = OpenAiConfig {
        api_key: env_or_default("OPENAI_API_KEY", ""),
        model: env_or_default("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
    };

    let sync = SyncSettings {
        interval_seconds: env_parsed("SYNC_INTERVAL", DEFAULT_SYNC_INTERVAL_SECS)?,
        batch_size: env_parsed("BATCH_SIZE", DEFAULT_BATCH_SIZE)?,
        max_retries: env_parsed("MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
        backoff_base: env_parsed("RETRY_BACKOFF", DEFAULT_RETRY_BACKOFF)?,
        cache_fallback_results: env_bool("CACHE_FALLBACK_RESULTS", true)?,
        health_port: env_parsed("HEALTH_PORT", DEFAULT_HEALTH_PORT)?,
    };

    let config = Config { shopify, tiktok, openai, sync };
    config.validate()?;

    if !config.tiktok.has_credentials() {
        info!("TikTok credentials not provided, destination will run in mock mode");
    }
    Ok(config)
}

fn env_or_default(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_parsed<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|err| SyncError::Config(format!("invalid {name}={raw}: {err}"))),
        Err(_) => Ok(default),
    }
}

fn env_bool(name: &str, default: bool) -> Result<bool> {
    match env::var(name) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => Err(SyncError::Config(format!("invalid {name}={other}: expected a boolean"))),
        },
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;

    // Env vars are process-global; serialize the tests that touch them.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ALL_VARS: &[&str] = &[
        "SHOPIFY_STORE",
        "SHOPIFY_TOKEN",
        "SHOPIFY_ACCESS_TOKEN",
        "SHOPIFY_API_VERSION",
        "TIKTOK_APP_KEY",
        "TIKTOK_SECRET",
        "TIKTOK_API_BASE",
        "OPENAI_API_KEY",
        "OPENAI_MODEL",
        "SYNC_INTERVAL",
        "BATCH_SIZE",
        "MAX_RETRIES",
        "RETRY_BACKOFF",
        "CACHE_FALLBACK_RESULTS",
        "HEALTH_PORT",
    ];

    fn with_env<R>(vars: &[(&str, &str)], body: impl FnOnce() -> R) -> R {
        let _guard = ENV_LOCK.lock();
        for name in ALL_VARS {
            env::remove_var(name);
        }
        for (name, value) in vars {
            env::set_var(name, value);
        }
        let result = body();
        for name in ALL_VARS {
            env::remove_var(name);
        }
        result
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            ("SHOPIFY_STORE", "test.myshopify.com"),
            ("SHOPIFY_TOKEN", "shpat_x"),
            ("OPENAI_API_KEY", "sk-x"),
        ]
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = with_env(&required(), || load_config().unwrap());

        assert_eq!(config.shopify.api_version, "2025-10");
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert_eq!(config.sync.interval_seconds, 300);
        assert_eq!(config.sync.batch_size, 100);
        assert_eq!(config.sync.max_retries, 3);
        assert!(config.sync.cache_fallback_results);
        assert!(!config.tiktok.has_credentials());
    }

    #[test]
    fn legacy_access_token_name_is_honored() {
        let mut vars = required();
        vars.retain(|(name, _)| *name != "SHOPIFY_TOKEN");
        vars.push(("SHOPIFY_ACCESS_TOKEN", "shpat_legacy"));

        let config = with_env(&vars, || load_config().unwrap());
        assert_eq!(config.shopify.token, "shpat_legacy");
    }

    #[test]
    fn missing_required_vars_are_fatal() {
        let err = with_env(&[("SHOPIFY_STORE", "test.myshopify.com")], || {
            load_config().unwrap_err()
        });
        match err {
            SyncError::Config(msg) => {
                assert!(msg.contains("SHOPIFY_TOKEN"));
                assert!(msg.contains("OPENAI_API_KEY"));
            }
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_numbers_are_fatal() {
        let mut vars = required();
        vars.push(("SYNC_INTERVAL", "five minutes"));

        let err = with_env(&vars, || load_config().unwrap_err());
        assert!(matches!(err, SyncError::Config(_)));
    }

    #[test]
    fn overrides_are_parsed() {
        let mut vars = required();
        vars.extend([
            ("SYNC_INTERVAL", "60"),
            ("BATCH_SIZE", "25"),
            ("RETRY_BACKOFF", "1.5"),
            ("CACHE_FALLBACK_RESULTS", "false"),
            ("TIKTOK_APP_KEY", "app_real"),
            ("TIKTOK_SECRET", "s3cret"),
        ]);

        let config = with_env(&vars, || load_config().unwrap());
        assert_eq!(config.sync.interval_seconds, 60);
        assert_eq!(config.sync.batch_size, 25);
        assert_eq!(config.sync.backoff_base, 1.5);
        assert!(!config.sync.cache_fallback_results);
        assert!(config.tiktok.has_credentials());
    }
}
