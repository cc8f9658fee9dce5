//! Error taxonomy for the Tasks API client.
//!
//! Two classes matter to callers: transport/auth failures that make the
//! service unreachable (fatal for a run) and per-item rejections that the
//! reconciler logs and isolates. [`ApiError::is_retryable`] and
//! [`ApiError::is_server_error`] drive the retry policy on read paths.

use thiserror::Error;

/// Result type for Tasks API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure from the HTTP stack.
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Authentication failed (401) or credentials could not be used.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The remote resource does not exist (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// The service asked us to back off (429).
    #[error("rate limited{}", retry_after_display(.retry_after_secs))]
    RateLimited { retry_after_secs: Option<u64> },

    /// Any other non-success status.
    #[error("Tasks API error (status {status}): {detail}")]
    Service { status: u16, detail: String },

    /// The response body could not be decoded.
    #[error("failed to parse API response: {0}")]
    Parse(String),

    /// The client was constructed with unusable configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A retried operation kept failing until the policy gave up.
    #[error("{message}")]
    MaxRetriesExceeded { attempts: u32, message: String },
}

fn retry_after_display(retry_after_secs: &Option<u64>) -> String {
    retry_after_secs
        .map(|s| format!(", retry after {s}s"))
        .unwrap_or_default()
}

impl ApiError {
    /// Transient failures worth retrying: connection problems, timeouts and
    /// rate limiting. Rejections (4xx other than 429) are not transient.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Whether the failure originated server-side (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Service { status, .. } if *status >= 500)
    }
}
