//! Client configuration
//!
//! [`ClientConfig`] collects everything the PubMed client needs besides its
//! HTTP connection: the contact address NCBI requires on every request, the
//! endpoint, the request timeout, and the pacing and retry policies.

use std::time::Duration;

use crate::rate_limit::RequestPacer;
use crate::retry::RetryConfig;

/// NCBI E-utilities base endpoint
pub const DEFAULT_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// Contact address used when the caller does not provide one
pub const DEFAULT_EMAIL: &str = "user@example.com";

/// Configuration for [`PubMedClient`](crate::PubMedClient)
///
/// # Example
///
/// ```
/// use biolitminer_client::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::new()
///     .with_email("researcher@university.edu")
///     .with_timeout(Duration::from_secs(5));
///
/// assert_eq!(config.email, "researcher@university.edu");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Contact address sent as the `email` parameter (NCBI policy)
    pub email: String,
    /// Override for the E-utilities base URL (used by tests and mirrors)
    pub base_url: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Minimum spacing between outbound requests
    pub min_interval: Duration,
    /// Retry policy for rate-limited requests
    pub retry_config: RetryConfig,
    /// Custom User-Agent header
    pub user_agent: Option<String>,
}

impl ClientConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new() -> Self {
        Self {
            email: DEFAULT_EMAIL.to_string(),
            base_url: None,
            timeout: Self::DEFAULT_TIMEOUT,
            min_interval: RequestPacer::DEFAULT_MIN_INTERVAL,
            retry_config: RetryConfig::default(),
            user_agent: None,
        }
    }

    /// Set the contact address sent with every request
    pub fn with_email<S: Into<String>>(mut self, email: S) -> Self {
        self.email = email.into();
        self
    }

    /// Point the client at another E-utilities endpoint
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the minimum spacing between outbound requests
    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    /// Replace the retry policy
    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    /// Set a custom User-Agent header
    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Base URL without a trailing slash
    pub fn effective_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("biolitminer/{}", env!("CARGO_PKG_VERSION")))
    }

    pub fn create_pacer(&self) -> RequestPacer {
        RequestPacer::new(self.min_interval)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}
