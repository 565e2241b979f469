//! Scheduler error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("scheduler already running")]
    AlreadyRunning,

    #[error("scheduler not running")]
    NotRunning,

    #[error("scheduler task did not stop within {seconds}s")]
    StopTimeout { seconds: u64 },

    #[error("scheduler task panicked: {0}")]
    TaskPanicked(String),
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
