//! Exponential-backoff retry policy for remote calls.
//!
//! Applies to every remote operation: up to `max_retries` retries after the
//! first attempt, doubling the delay between attempts. Non-retryable errors
//! short-circuit immediately; exhaustion surfaces the last error seen.

use crate::error::ApiResult;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Default number of retries after the initial attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay before the first retry.
pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;

/// Retry policy with exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the initial attempt (total attempts = max_retries + 1).
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent retry.
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with explicit parameters.
    #[must_use]
    pub const fn new(max_retries: u32, base_delay_ms: u64) -> Self {
        Self {
            max_retries,
            base_delay_ms,
        }
    }

    /// Delay before retry attempt `attempt` (1-based):
    /// `base_delay * 2^(attempt - 1)`.
    #[must_use]
    pub fn delay_before(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }

    /// Runs `op` under this policy.
    ///
    /// Retries only errors for which [`ApiError::is_retryable`] holds;
    /// anything else propagates immediately. When all attempts are
    /// exhausted, the last encountered error is surfaced.
    ///
    /// [`ApiError::is_retryable`]: crate::ApiError::is_retryable
    pub async fn run<T, F, Fut>(&self, mut op: F) -> ApiResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        let mut last = match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() => e,
            Err(e) => return Err(e),
        };

        for attempt in 1..=self.max_retries {
            let delay = self.delay_before(attempt);
            debug!(
                attempt,
                max_retries = self.max_retries,
                delay_ms = delay.as_millis() as u64,
                "retrying after transient failure: {last}"
            );
            tokio::time::sleep(delay).await;

            last = match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() => e,
                Err(e) => return Err(e),
            };
        }

        Err(last)
    }
}
