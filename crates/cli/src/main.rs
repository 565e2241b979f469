//! shoptok: Shopify to TikTok Shop sync bot.
//!
//! # Usage
//!
//! ```text
//! shoptok [--mode full|inventory|products|orders] [--interval [SECS]]
//!         [--dry-run] [--limit N] [--log-level LEVEL]
//! ```
//!
//! Without `--interval` the selected pass runs once and the process
//! exits. With it, the scheduler repeats the pass at that interval and
//! a health endpoint is served until Ctrl-C; a bare `--interval`
//! without a value uses the `SYNC_INTERVAL` setting.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use shoptok_core::{ProductMapper, RetryStrategy, SyncEngine, SyncMode};
use shoptok_core::ports::EnrichmentClient;
use shoptok_infra::scheduling::SyncSchedulerConfig;
use shoptok_infra::{
    load_config, select_destination, DryRunEnrichment, HealthState, OpenAiClient, ShopifyClient,
    SyncScheduler,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Full,
    Inventory,
    Products,
    Orders,
}

impl From<Mode> for SyncMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Full => SyncMode::Full,
            Mode::Inventory => SyncMode::Inventory,
            Mode::Products => SyncMode::Products,
            Mode::Orders => SyncMode::Orders,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "shoptok",
    version,
    about = "Sync inventory, products, and orders from Shopify to TikTok Shop with AI enrichment"
)]
struct Cli {
    /// Which passes to run.
    #[arg(long, value_enum, default_value_t = Mode::Full)]
    mode: Mode,

    /// Run continuously, syncing every SECS seconds. A bare
    /// `--interval` uses the SYNC_INTERVAL setting; omitting the flag
    /// runs once and exits.
    #[arg(long, value_name = "SECS", num_args = 0..=1)]
    interval: Option<Option<u64>>,

    /// Report what would be pushed without mutating either store.
    #[arg(long)]
    dry_run: bool,

    /// Cap the number of products per pass (for testing).
    #[arg(long)]
    limit: Option<usize>,

    /// Log verbosity (overridden by RUST_LOG when set).
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let config = load_config().context("configuration error")?;

    let source = Arc::new(ShopifyClient::new(&config.shopify).context("shopify client")?);
    let destination = select_destination(&config.tiktok).context("destination client")?;
    let enrichment: Arc<dyn EnrichmentClient> = if cli.dry_run {
        Arc::new(DryRunEnrichment)
    } else {
        Arc::new(OpenAiClient::new(&config.openai).context("openai client")?)
    };

    let retry = RetryStrategy::from_settings(config.sync.max_retries, config.sync.backoff_base);
    let mapper = Arc::new(ProductMapper::new(
        enrichment,
        retry.clone(),
        config.sync.cache_fallback_results,
    ));
    let engine = Arc::new(SyncEngine::new(
        source,
        destination,
        Arc::clone(&mapper),
        retry,
        config.sync.batch_size,
        cli.dry_run,
    ));

    let mode = SyncMode::from(cli.mode);
    match cli.interval {
        None => {
            let report = engine.run(mode, cli.limit).await;
            info!(%report, "sync finished");
            Ok(())
        }
        Some(override_secs) => {
            let interval_secs = override_secs.unwrap_or(config.sync.interval_seconds);
            let health = Arc::new(HealthState::new(mapper.stats()));
            let scheduler_config = SyncSchedulerConfig {
                interval: Duration::from_secs(interval_secs.max(1)),
                mode,
                limit: cli.limit,
            };
            let mut scheduler =
                SyncScheduler::new(engine, Arc::clone(&health), scheduler_config);
            scheduler.start().await.context("failed to start scheduler")?;

            let health_port = config.sync.health_port;
            let health_state = Arc::clone(&health);
            tokio::spawn(async move {
                if let Err(err) = shoptok_infra::health::serve(health_state, health_port).await {
                    error!(error = %err, "health endpoint exited");
                }
            });

            tokio::signal::ctrl_c().await.context("failed to listen for shutdown signal")?;
            info!("shutdown signal received");
            scheduler.stop().await.context("failed to stop scheduler")?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_interval_flag_selects_a_single_run() {
        let cli = Cli::try_parse_from(["shoptok"]).unwrap();
        assert_eq!(cli.interval, None);
        assert_eq!(cli.mode, Mode::Full);
    }

    #[test]
    fn bare_interval_flag_defers_to_the_sync_interval_setting() {
        let cli = Cli::try_parse_from(["shoptok", "--interval"]).unwrap();
        assert_eq!(cli.interval, Some(None));
    }

    #[test]
    fn interval_value_overrides_the_setting() {
        let cli = Cli::try_parse_from(["shoptok", "--interval", "60", "--mode", "inventory"]).unwrap();
        assert_eq!(cli.interval, Some(Some(60)));
        assert_eq!(SyncMode::from(cli.mode), SyncMode::Inventory);
    }
}
