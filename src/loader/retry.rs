//! Bounded retry with linear backoff

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Delay unit for the linear backoff
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);

/// How many times a failed fetch is retried, and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (total attempts = `max_retries + 1`)
    pub max_retries: u32,
    /// Wait before retry `n` (0-based) is `base_delay * (n + 1)`
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Total attempts including the first
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay after the failed attempt with the given 0-based index
    pub fn delay_for(&self, attempt_index: u32) -> Duration {
        self.base_delay.saturating_mul(attempt_index.saturating_add(1))
    }
}

/// Runs `operation` until it succeeds or the policy is exhausted
///
/// The operation receives the 0-based attempt index. Every failure is retried
/// the same way regardless of its kind; after the last attempt the most recent
/// error is returned. Backoff waits are tokio timers, so they suspend only the
/// calling future and are cancelled when it is dropped.
pub async fn fetch_with_retry<T, E, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 0;
    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < policy.max_retries => {
                let delay = policy.delay_for(attempt);
                warn!(
                    attempt = attempt + 1,
                    max_attempts = policy.max_attempts(),
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "fetch attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
