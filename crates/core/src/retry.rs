//! Retry policy with exponential backoff.
//!
//! One strategy instance wraps every external call the engine and
//! mapper make. The policy holds no state across calls; attempt
//! bookkeeping lives on the stack of a single `execute` invocation.

use std::future::Future;
use std::time::Duration;

use shoptok_domain::{Result, SyncError};
use tracing::{debug, warn};

// Cap the exponent so the delay multiplier cannot overflow.
const MAX_BACKOFF_EXPONENT: u32 = 16;

/// Exponential-backoff retry wrapper around a single fallible call.
#[derive(Debug, Clone)]
pub struct RetryStrategy {
    max_retries: u32,
    base_backoff: Duration,
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self { max_retries: 3, base_backoff: Duration::from_secs(2) }
    }
}

impl RetryStrategy {
    pub fn new(max_retries: u32, base_backoff: Duration) -> Self {
        Self { max_retries, base_backoff }
    }

    /// Build from config values (`MAX_RETRIES`, `RETRY_BACKOFF` seconds).
    pub fn from_settings(max_retries: u32, backoff_base_secs: f64) -> Self {
        Self::new(max_retries, Duration::from_secs_f64(backoff_base_secs.max(0.0)))
    }

    /// Delay before the `retry_number`-th retry: `base * 2^(n-1)`.
    pub fn backoff_delay(&self, retry_number: u32) -> Duration {
        let shift = retry_number.saturating_sub(1).min(MAX_BACKOFF_EXPONENT);
        let multiplier = 1u32 << shift;
        self.base_backoff.saturating_mul(multiplier)
    }

    /// Execute `operation` up to `max_retries + 1` times.
    ///
    /// Non-retryable errors (see [`SyncError::is_retryable`]) short
    /// circuit immediately; retryable errors wait the backoff delay
    /// and try again. The last error is returned once attempts are
    /// exhausted.
    pub async fn execute<T, F, Fut>(&self, operation_name: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempts = self.max_retries.saturating_add(1);

        let mut last_error = SyncError::Internal(format!(
            "retry policy for {operation_name} resolved without an attempt"
        ));

        for attempt in 1..=attempts {
            debug!(operation = operation_name, attempt, "executing attempt");

            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if !err.is_retryable() {
                        warn!(
                            operation = operation_name,
                            attempt,
                            error = %err,
                            "non-retryable error, giving up"
                        );
                        return Err(err);
                    }

                    if attempt < attempts {
                        let delay = self.backoff_delay(attempt);
                        warn!(
                            operation = operation_name,
                            attempt,
                            max_attempts = attempts,
                            delay_ms = delay.as_millis() as u64,
                            error = %err,
                            "retryable error, backing off"
                        );
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                    } else {
                        warn!(
                            operation = operation_name,
                            attempts,
                            error = %err,
                            "retries exhausted"
                        );
                    }
                    last_error = err;
                }
            }
        }

        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn fast_strategy(max_retries: u32) -> RetryStrategy {
        RetryStrategy::new(max_retries, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_in_op = Arc::clone(&calls);

        let result = fast_strategy(3)
            .execute("test_op", move || {
                let calls = Arc::clone(&calls_in_op);
                async move {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    if n < 2 {
                        Err(SyncError::Network("connection reset".into()))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn auth_errors_short_circuit() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_in_op = Arc::clone(&calls);

        let result: Result<()> = fast_strategy(3)
            .execute("test_op", move || {
                let calls = Arc::clone(&calls_in_op);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(SyncError::Auth("invalid token (401)".into()))
                }
            })
            .await;

        assert!(matches!(result, Err(SyncError::Auth(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn returns_last_error_when_exhausted() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_in_op = Arc::clone(&calls);

        let result: Result<()> = fast_strategy(2)
            .execute("test_op", move || {
                let calls = Arc::clone(&calls_in_op);
                async move {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    Err(SyncError::Api { status: 503, message: format!("attempt {n}") })
                }
            })
            .await;

        match result {
            Err(SyncError::Api { status: 503, message }) => assert_eq!(message, "attempt 2"),
            other => panic!("expected exhausted 503, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn extreme_max_retries_does_not_overflow() {
        // MAX_RETRIES is operator input; u32::MAX must not panic on
        // the attempt count.
        let result = fast_strategy(u32::MAX).execute("test_op", || async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[test]
    fn backoff_doubles_per_retry() {
        let strategy = RetryStrategy::new(3, Duration::from_secs(2));
        assert_eq!(strategy.backoff_delay(1), Duration::from_secs(2));
        assert_eq!(strategy.backoff_delay(2), Duration::from_secs(4));
        assert_eq!(strategy.backoff_delay(3), Duration::from_secs(8));
    }

    #[test]
    fn backoff_exponent_is_capped() {
        let strategy = RetryStrategy::new(64, Duration::from_millis(1));
        // Does not overflow and stays monotonic at the cap.
        assert_eq!(strategy.backoff_delay(40), strategy.backoff_delay(60));
    }
}
