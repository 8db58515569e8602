//! Retry policy for NCBI requests
//!
//! NCBI answers with HTTP 429 when a caller exceeds its request allowance.
//! Such a response is retried exactly once after a fixed pause; every other
//! failure is terminal for the call.

use std::time::Duration;

/// Classifies errors as transient (worth one more attempt) or terminal
pub trait RetryableError {
    /// Whether another attempt may succeed
    fn is_retryable(&self) -> bool;

    /// Short human-readable reason, used in log records
    fn retry_reason(&self) -> &str;
}

/// Bounded retry configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Fixed pause before each retry
    pub delay: Duration,
}

impl RetryConfig {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(10);

    /// Two attempts, ten seconds apart
    pub fn new() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            delay: Self::DEFAULT_DELAY,
        }
    }

    /// Override the pause before a retry
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Override the attempt ceiling (values below 1 are treated as 1)
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Decide whether `error`, raised by attempt number `attempt` (1-based),
    /// warrants another attempt.
    pub fn should_retry<E: RetryableError>(&self, attempt: u32, error: &E) -> bool {
        attempt < self.max_attempts && error.is_retryable()
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new()
    }
}
