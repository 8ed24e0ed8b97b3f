use std::future::Future;
use std::time::Duration;

use crate::LlmError;

/// Base delay before the first retry
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Upper bound on any single backoff delay
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

/// Exponential backoff schedule for upstream calls
///
/// `max_retries` counts retries after the first attempt, so a policy of
/// 3 allows 4 attempts in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }

    #[must_use]
    pub const fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    #[must_use]
    pub const fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Delay to wait after failed attempt `attempt` (1-based)
    ///
    /// `base * 2^(attempt - 1)`, capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let factor = 1u32 << exponent;

        self.base_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    /// Run `op` until it succeeds, fails terminally, or retries run out
    ///
    /// `op` receives the 1-based attempt number. Only errors for which
    /// [`LlmError::is_retryable`] holds are retried, after sleeping
    /// [`delay_for`](Self::delay_for) the failed attempt.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, LlmError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, LlmError>>,
    {
        let mut attempt = 1;

        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt <= self.max_retries => {
                    let delay = self.delay_for(attempt);
                    tracing::warn!(
                        attempt,
                        max_retries = self.max_retries,
                        delay = ?delay,
                        error = %e,
                        "upstream call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(attempt, error = %e, "upstream call failed");
                    return Err(e);
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}
