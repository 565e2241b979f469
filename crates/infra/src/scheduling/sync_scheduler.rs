//! Interval scheduler driving the sync engine.
//!
//! Runs one pass to completion, then sleeps for the configured
//! interval. Passes never overlap by construction. Item-level failures
//! inside a pass are reported and the loop proceeds; only stop() or
//! process termination ends the loop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use shoptok_core::{SyncEngine, SyncMode};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::health::{ComponentStatus, HealthState};
use crate::scheduling::error::{SchedulerError, SchedulerResult};

type TaskHandle = Arc<Mutex<Option<JoinHandle<()>>>>;

#[derive(Debug, Clone)]
pub struct SyncSchedulerConfig {
    pub interval: Duration,
    pub mode: SyncMode,
    /// Optional per-pass product cap, for bounded test runs.
    pub limit: Option<usize>,
}

pub struct SyncScheduler {
    engine: Arc<SyncEngine>,
    health: Arc<HealthState>,
    config: SyncSchedulerConfig,
    cancellation_token: CancellationToken,
    task_handle: TaskHandle,
}

impl SyncScheduler {
    pub fn new(
        engine: Arc<SyncEngine>,
        health: Arc<HealthState>,
        config: SyncSchedulerConfig,
    ) -> Self {
        Self {
            engine,
            health,
            config,
            cancellation_token: CancellationToken::new(),
            task_handle: Arc::new(Mutex::new(None)),
        }
    }

    /// Spawn the background loop. Errors if already running.
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        info!(
            interval_secs = self.config.interval.as_secs(),
            mode = self.config.mode.as_str(),
            "starting sync scheduler"
        );

        // Fresh token so the scheduler can be restarted after stop().
        self.cancellation_token = CancellationToken::new();

        let engine = Arc::clone(&self.engine);
        let health = Arc::clone(&self.health);
        let config = self.config.clone();
        let cancel = self.cancellation_token.clone();

        let handle = tokio::spawn(async move {
            Self::run_loop(engine, health, config, cancel).await;
        });
        *self.task_handle.lock().await = Some(handle);

        self.health.set_scheduler(ComponentStatus::Healthy);
        Ok(())
    }

    /// Cancel the loop and await the task. Errors if not running.
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        info!("stopping sync scheduler");
        self.cancellation_token.cancel();

        if let Some(handle) = self.task_handle.lock().await.take() {
            let join_timeout = Duration::from_secs(5);
            match tokio::time::timeout(join_timeout, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(join_err)) => {
                    return Err(SchedulerError::TaskPanicked(join_err.to_string()))
                }
                Err(_) => {
                    return Err(SchedulerError::StopTimeout {
                        seconds: join_timeout.as_secs(),
                    })
                }
            }
        }

        info!("sync scheduler stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.task_handle
            .try_lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|handle| !handle.is_finished()))
            .unwrap_or(false)
    }

    /// Pass-then-sleep loop. A pass in progress always runs to
    /// completion; cancellation is only observed between passes.
    async fn run_loop(
        engine: Arc<SyncEngine>,
        health: Arc<HealthState>,
        config: SyncSchedulerConfig,
        cancel: CancellationToken,
    ) {
        loop {
            let started = Instant::now();
            let report = engine.run(config.mode, config.limit).await;
            let elapsed = started.elapsed();

            if report.failed() > 0 {
                warn!(%report, elapsed_ms = elapsed.as_millis() as u64, "sync pass had failures");
            } else {
                info!(%report, elapsed_ms = elapsed.as_millis() as u64, "sync pass complete");
            }
            health.set_scheduler(ComponentStatus::Healthy);

            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("sync loop cancelled");
                    break;
                }
                _ = tokio::time::sleep(config.interval) => {}
            }
        }
    }
}

impl Drop for SyncScheduler {
    fn drop(&mut self) {
        // Best effort; the task also ends when the runtime shuts down.
        self.cancellation_token.cancel();
        if self.is_running() {
            error!("sync scheduler dropped while running");
        }
    }
}
