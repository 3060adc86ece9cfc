//! Bounded retry with exponential backoff
//!
//! - Attempts: `max_attempts` total (1 = single try, no retry)
//! - Delay before retry n: base · 2ⁿ, capped, ±25% jitter
//! - Only transient errors are retried

use crate::errors::{RagError, Result};
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Base delay for exponential backoff (500 ms)
const BASE_DELAY_MS: u64 = 500;

/// Maximum delay cap (8 seconds)
const MAX_DELAY_MS: u64 = 8000;

/// Retry policy with exponential backoff
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first
    max_attempts: u32,

    /// Base delay in milliseconds
    base_delay_ms: u64,

    /// Maximum delay cap in milliseconds
    max_delay_ms: u64,

    /// Enable jitter
    enable_jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

impl RetryPolicy {
    /// Single attempt
    pub fn none() -> Self {
        Self::with_attempts(1)
    }

    /// `max_attempts` total attempts with default backoff
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay_ms: BASE_DELAY_MS,
            max_delay_ms: MAX_DELAY_MS,
            enable_jitter: true,
        }
    }

    /// Custom base delay, mostly for tests
    pub fn with_base_delay(mut self, base_delay_ms: u64) -> Self {
        self.base_delay_ms = base_delay_ms;
        self
    }

    /// Execute operation, retrying transient failures; the last error is returned
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    attempt += 1;

                    if !Self::is_retryable(&e) || attempt >= self.max_attempts {
                        return Err(e);
                    }

                    let delay = self.calculate_delay(attempt - 1);
                    debug!(attempt, delay_ms = delay.as_millis() as u64, error = %e, "retrying");
                    sleep(delay).await;
                }
            }
        }
    }

    /// Calculate delay before the retry following failure number `attempt` (0-based)
    fn calculate_delay(&self, attempt: u32) -> Duration {
        let exponential_delay = self
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt));

        let delay_ms = exponential_delay.min(self.max_delay_ms);

        // ±25% random variation
        let final_delay = if self.enable_jitter {
            let jitter = (delay_ms / 4) as i64;
            let random_jitter = (rand::random::<f64>() * 2.0 - 1.0) * jitter as f64;
            ((delay_ms as i64) + random_jitter as i64).max(0) as u64
        } else {
            delay_ms
        };

        Duration::from_millis(final_delay)
    }

    /// Check if error is transient
    fn is_retryable(error: &RagError) -> bool {
        match error {
            RagError::Timeout { .. } => true,
            RagError::HttpError(_) => true,
            RagError::StreamingError(_) => true,
            RagError::EmbeddingUnavailable { .. } => true,
            RagError::ChatUnavailable(_) => true,

            RagError::ModelNotFound { .. } => false,
            RagError::JsonParseError(_) => false,
            RagError::ConfigError(_) => false,
            RagError::InvalidInput(_) => false,

            _ => false,
        }
    }

    /// Get max attempts
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}
