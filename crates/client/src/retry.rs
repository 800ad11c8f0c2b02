//! Exponential-backoff retries for coordinator calls.
//!
//! A call is retried when the coordinator answers 500, 502, 503 or 504, or
//! when the connection cannot be made or times out. The delay before retry
//! `n` (1-based) is `initial_delay * multiplier^(n-1)`, clamped to
//! `max_delay`. Once the retries are spent the call fails with
//! [`CoordinatorError::Transient`].

use std::future::Future;
use std::time::Duration;

use crate::api::CoordinatorError;

/// HTTP statuses worth retrying.
pub const RETRYABLE_STATUSES: [u16; 4] = [500, 502, 503, 504];

/// Tunable parameters for the exponential-backoff strategy.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt; `0` disables retrying.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

/// Calculate the next backoff delay from the current delay and policy.
///
/// The result is clamped to [`RetryPolicy::max_delay`].
pub fn next_delay(current: Duration, policy: &RetryPolicy) -> Duration {
    let next_ms = (current.as_millis() as f64 * policy.multiplier) as u64;
    Duration::from_millis(next_ms).min(policy.max_delay)
}

pub fn is_retryable_status(status: u16) -> bool {
    RETRYABLE_STATUSES.contains(&status)
}

/// Run `call` until it succeeds, fails permanently, or the retries run out.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &'static str,
    mut call: F,
) -> Result<T, CoordinatorError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CoordinatorError>>,
{
    let mut delay = policy.initial_delay.min(policy.max_delay);
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match call().await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) if attempt > policy.max_retries => {
                tracing::error!(operation, attempts = attempt, error = %e, "Coordinator call failed, giving up");
                return Err(CoordinatorError::Transient {
                    operation,
                    attempts: attempt,
                    last_error: e.to_string(),
                });
            }
            Err(e) => {
                tracing::warn!(
                    operation,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Coordinator call failed, retrying",
                );
            }
        }

        tokio::time::sleep(delay).await;
        delay = next_delay(delay, policy);
    }
}
