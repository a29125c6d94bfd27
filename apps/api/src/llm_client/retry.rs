//! Explicit retry wrapper applied at each provider call site.
//!
//! Retry is restricted to the transient failure kinds reported by
//! `LlmError::is_retriable`; anything else propagates on the first attempt.
//! After the final attempt the last error is returned unmodified.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use super::LlmError;

/// Bounded exponential backoff policy shared by the chat and embedding calls.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempt count, including the first call. Treated as at least 1.
    pub max_attempts: u32,
    pub backoff_min: Duration,
    pub backoff_max: Duration,
}

impl RetryPolicy {
    /// Delay before the retry following the `completed`-th failed attempt:
    /// `min(backoff_min * 2^(completed-1), backoff_max)`.
    pub fn backoff_for(&self, completed: u32) -> Duration {
        let exp = completed.saturating_sub(1).min(16);
        self.backoff_min
            .saturating_mul(1u32 << exp)
            .min(self.backoff_max)
    }
}

/// Runs `call` under `policy`. `call` is invoked once per attempt and must
/// produce a fresh future each time.
pub async fn with_retries<T, F, Fut>(policy: &RetryPolicy, mut call: F) -> Result<T, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match call().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_attempts && err.is_retriable() => {
                let delay = policy.backoff_for(attempt);
                warn!(
                    "provider call attempt {attempt}/{max_attempts} failed ({err}), retrying in {}ms",
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}
