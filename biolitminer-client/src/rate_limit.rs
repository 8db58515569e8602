use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, instrument};

/// Minimum spacing between outbound NCBI requests
///
/// NCBI throttles callers without an API key and answers excess traffic
/// with HTTP 429. The pacer is a bucket holding a single token: a request
/// may go out once `min_interval` has elapsed since the previous one,
/// otherwise the caller sleeps for the remainder.
///
/// The pacer is owned by exactly one client and driven through `&mut self`,
/// so the last-request instant is never shared.
#[derive(Debug, Clone)]
pub struct RequestPacer {
    min_interval: Duration,
    last_request: Option<Instant>,
}

impl RequestPacer {
    /// Default spacing: 500 ms, i.e. at most two requests per second
    pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(500);

    /// Create a pacer with the given minimum spacing
    ///
    /// # Example
    ///
    /// ```
    /// use biolitminer_client::rate_limit::RequestPacer;
    /// use std::time::Duration;
    ///
    /// let pacer = RequestPacer::new(Duration::from_millis(500));
    /// assert_eq!(pacer.min_interval(), Duration::from_millis(500));
    /// ```
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: None,
        }
    }

    /// Pacer with the NCBI-friendly default spacing
    pub fn ncbi_default() -> Self {
        Self::new(Self::DEFAULT_MIN_INTERVAL)
    }

    /// Configured minimum spacing between requests
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Instant of the last request that went through [`wait`](Self::wait)
    pub fn last_request(&self) -> Option<Instant> {
        self.last_request
    }

    /// Time still to wait at `now` before the next request may be sent
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last_request {
            Some(last) => self
                .min_interval
                .saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }

    /// Wait until the next request is allowed, then record it as sent
    #[instrument(skip(self))]
    pub async fn wait(&mut self) {
        let remaining = self.remaining(Instant::now());

        if !remaining.is_zero() {
            debug!(
                wait_ms = remaining.as_millis() as u64,
                "Rate limiting: waiting before next request"
            );
            sleep(remaining).await;
        }

        self.last_request = Some(Instant::now());
    }
}

impl Default for RequestPacer {
    fn default() -> Self {
        Self::ncbi_default()
    }
}
