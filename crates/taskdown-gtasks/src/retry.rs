//! Exponential backoff for Tasks API read paths.
//!
//! Only the snapshot fetch retries; reconciliation mutations are applied
//! exactly once and per-item failures are reported instead of replayed, so a
//! half-applied run never turns into a double-applied one.

use crate::error::{ApiError, ApiResult};
use std::time::Duration;
use tracing::{debug, warn};

/// Retry policy with exponential backoff and a delay cap.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts (0 disables retrying).
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent attempt.
    pub base_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 4,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries. Used for mutation paths.
    #[must_use]
    pub fn none() -> Self {
        Self { max_retries: 0, ..Self::default() }
    }

    /// Whether `error` should be retried at `attempt` (0-based).
    #[must_use]
    pub fn should_retry(&self, attempt: u32, error: &ApiError) -> bool {
        if attempt >= self.max_retries {
            return false;
        }
        error.is_retryable() || error.is_server_error()
    }

    /// Delay before the retry following `attempt`. A rate-limit response
    /// carrying `Retry-After` overrides the exponential schedule.
    #[must_use]
    pub fn delay_for(&self, attempt: u32, error: &ApiError) -> Duration {
        if let ApiError::RateLimited { retry_after_secs: Some(secs) } = error {
            return Duration::from_secs(*secs).min(self.max_delay);
        }
        let exponential = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt));
        exponential.min(self.max_delay)
    }

    /// Run `f` until it succeeds, fails non-retryably, or the attempt budget
    /// is spent.
    pub async fn execute<F, Fut, T>(&self, operation: &str, mut f: F) -> ApiResult<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = ApiResult<T>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match f().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(operation, attempt = attempt + 1, "Succeeded after retries");
                    }
                    return Ok(value);
                }
                Err(error) => {
                    if !self.should_retry(attempt, &error) {
                        if attempt >= self.max_retries && self.max_retries > 0 {
                            warn!(
                                operation,
                                attempts = attempt + 1,
                                error = %error,
                                "Retry budget exhausted"
                            );
                            return Err(ApiError::MaxRetriesExceeded {
                                attempts: attempt + 1,
                                message: format!(
                                    "{operation} failed after {} attempt(s): {error}",
                                    attempt + 1
                                ),
                            });
                        }
                        return Err(error);
                    }

                    let delay = self.delay_for(attempt, &error);
                    debug!(
                        operation,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Retrying after transient error"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
