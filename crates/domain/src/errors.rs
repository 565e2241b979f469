//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for shoptok
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SyncError {
    /// Whether the retry policy may re-attempt the failed call.
    ///
    /// Authentication failures (401/403) and malformed responses are
    /// permanent; timeouts, transport failures, rate limiting, and 5xx
    /// responses are transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::RateLimited(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::Config(_) | Self::Auth(_) | Self::InvalidResponse(_) | Self::Internal(_) => {
                false
            }
        }
    }
}

/// Result type alias for shoptok operations
pub type Result<T> = std::result::Result<T, SyncError>;
