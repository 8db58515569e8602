use reqwest::Client;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{PubMedError, Result};
use crate::pubmed::models::Article;
use crate::pubmed::parser::{parse_articles_from_xml, parse_search_response};
use crate::rate_limit::RequestPacer;
use crate::retry::RetryableError;

/// Client for the PubMed ESearch and EFetch endpoints
///
/// Requests are paced (see [`RequestPacer`]) and retried once on HTTP 429.
/// The public operations never fail: transport errors, rate-limit
/// exhaustion and unparseable responses are logged and produce an empty
/// result, and individual records that cannot be parsed are left out.
///
/// Operations take `&mut self` because every request updates the pacer.
pub struct PubMedClient {
    client: Client,
    base_url: String,
    pacer: RequestPacer,
    config: ClientConfig,
}

impl PubMedClient {
    /// Create a client with default settings and the given contact address
    ///
    /// # Example
    ///
    /// ```
    /// use biolitminer_client::PubMedClient;
    ///
    /// let client = PubMedClient::new("researcher@university.edu").unwrap();
    /// assert_eq!(client.email(), "researcher@university.edu");
    /// ```
    pub fn new(email: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::new().with_email(email))
    }

    /// Create a client from a full configuration
    ///
    /// Fails only if the underlying HTTP client cannot be built (for
    /// example when no TLS backend is available).
    ///
    /// # Example
    ///
    /// ```
    /// use biolitminer_client::{ClientConfig, PubMedClient};
    /// use std::time::Duration;
    ///
    /// let config = ClientConfig::new()
    ///     .with_email("researcher@university.edu")
    ///     .with_timeout(Duration::from_secs(5));
    ///
    /// let client = PubMedClient::with_config(config).unwrap();
    /// ```
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.effective_user_agent())
            .timeout(config.timeout)
            .build()?;

        Ok(Self::with_client(client, config))
    }

    /// Create a client around an existing `reqwest::Client`
    ///
    /// The timeout and user agent of `config` are not applied; they belong
    /// to the supplied HTTP client.
    pub fn with_client(client: Client, config: ClientConfig) -> Self {
        let base_url = config.effective_base_url().to_string();
        let pacer = config.create_pacer();
        info!(email = %config.email, "Initialized PubMed client");

        Self {
            client,
            base_url,
            pacer,
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Contact address sent with every request
    pub fn email(&self) -> &str {
        &self.config.email
    }

    /// Replace the contact address; pacing state is kept
    pub fn set_email(&mut self, email: impl Into<String>) {
        self.config.email = email.into();
    }

    /// Pacer shared by all requests of this client
    pub fn pacer(&self) -> &RequestPacer {
        &self.pacer
    }

    /// Search PubMed and return matching PMIDs in relevance order
    ///
    /// At most `max_results` identifiers are returned. An empty query, a
    /// failed request or an unparseable response yields an empty vector.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use biolitminer_client::PubMedClient;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let mut client = PubMedClient::new("researcher@university.edu")?;
    ///     let pmids = client.search_articles("BRCA1 breast cancer", 10).await;
    ///     println!("Found {} articles", pmids.len());
    ///     Ok(())
    /// }
    /// ```
    #[instrument(skip(self), fields(query = %query, max_results = max_results))]
    pub async fn search_articles(&mut self, query: &str, max_results: usize) -> Vec<String> {
        info!("Searching PubMed");

        match self.try_search(query, max_results).await {
            Ok(pmids) => {
                info!(found = pmids.len(), "Search completed");
                debug!(pmids = ?pmids, "Search returned PMIDs");
                pmids
            }
            Err(e) => {
                error!(error = %e, reason = e.retry_reason(), "Error searching PubMed");
                Vec::new()
            }
        }
    }

    async fn try_search(&mut self, query: &str, max_results: usize) -> Result<Vec<String>> {
        if query.trim().is_empty() {
            debug!("Empty query provided, returning empty results");
            return Ok(Vec::new());
        }

        let url = format!(
            "{}/esearch.fcgi?db=pubmed&term={}&retmax={}&retmode=xml",
            self.base_url,
            urlencoding::encode(query),
            max_results
        );

        let body = self.get_text(&url).await?;
        let result = parse_search_response(&body)?;

        if let Some(message) = &result.error {
            warn!(message = %message, "NCBI ESearch reported an error");
        }
        if let Some(count) = result.count {
            debug!(total = count, "Total matches reported by ESearch");
        }

        let mut pmids = result.ids;
        pmids.truncate(max_results);
        Ok(pmids)
    }

    /// Fetch full records for the given PMIDs in one batch request
    ///
    /// Returns the records that could be parsed, which may be fewer than
    /// requested. An empty input returns immediately without a request.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use biolitminer_client::PubMedClient;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let mut client = PubMedClient::new("researcher@university.edu")?;
    ///     let articles = client.fetch_articles(&["31978945", "33515491"]).await;
    ///     for article in &articles {
    ///         println!("{}: {}", article.pmid, article.title);
    ///     }
    ///     Ok(())
    /// }
    /// ```
    #[instrument(skip(self, pmids), fields(pmids_count = pmids.len()))]
    pub async fn fetch_articles<S: AsRef<str>>(&mut self, pmids: &[S]) -> Vec<Article> {
        if pmids.is_empty() {
            warn!("No PMIDs provided for fetching details");
            return Vec::new();
        }

        info!("Fetching article details");

        match self.try_fetch(pmids).await {
            Ok(articles) => {
                info!(
                    requested = pmids.len(),
                    parsed = articles.len(),
                    "Batch fetch completed"
                );
                articles
            }
            Err(e) => {
                error!(error = %e, reason = e.retry_reason(), "Error fetching article details");
                Vec::new()
            }
        }
    }

    async fn try_fetch<S: AsRef<str>>(&mut self, pmids: &[S]) -> Result<Vec<Article>> {
        let ids: Vec<&str> = pmids
            .iter()
            .map(|pmid| pmid.as_ref().trim())
            .filter(|pmid| !pmid.is_empty())
            .collect();

        if ids.is_empty() {
            warn!("All provided PMIDs were empty");
            return Ok(Vec::new());
        }

        debug!(pmids = ?ids, "PMIDs to fetch");

        // One request for the whole batch; very long lists are not split
        let url = format!(
            "{}/efetch.fcgi?db=pubmed&id={}&retmode=xml&rettype=abstract",
            self.base_url,
            urlencoding::encode(&ids.join(","))
        );

        let body = self.get_text(&url).await?;
        if body.trim().is_empty() {
            warn!("EFetch returned an empty body");
            return Ok(Vec::new());
        }

        parse_articles_from_xml(&body)
    }

    /// Search and fetch full records in one step
    ///
    /// Returns an empty vector without a fetch request when the search
    /// finds nothing.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use biolitminer_client::PubMedClient;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let mut client = PubMedClient::new("researcher@university.edu")?;
    ///     for article in client.search_and_fetch("COVID-19", 5).await {
    ///         println!("{}: {}", article.pmid, article.title);
    ///     }
    ///     Ok(())
    /// }
    /// ```
    #[instrument(skip(self), fields(query = %query, max_results = max_results))]
    pub async fn search_and_fetch(&mut self, query: &str, max_results: usize) -> Vec<Article> {
        info!("Starting search and fetch");

        let pmids = self.search_articles(query, max_results).await;
        if pmids.is_empty() {
            warn!("No PMIDs found, returning empty list");
            return Vec::new();
        }

        let articles = self.fetch_articles(pmids.as_slice()).await;
        info!(retrieved = articles.len(), "Search and fetch completed");
        articles
    }

    /// GET `url` (plus the contact address) and return the body
    ///
    /// Retries according to the configured [`RetryConfig`](crate::retry::RetryConfig),
    /// which by default allows one retry after a rate-limit response.
    async fn get_text(&mut self, url: &str) -> Result<String> {
        let final_url = format!("{}&email={}", url, urlencoding::encode(&self.config.email));
        let retry = self.config.retry_config;
        let mut attempt: u32 = 1;

        loop {
            match self.send_once(&final_url).await {
                Err(e) if retry.should_retry(attempt, &e) => {
                    warn!(
                        attempt,
                        delay_secs = retry.delay.as_secs_f64(),
                        reason = e.retry_reason(),
                        "Rate limit exceeded, waiting before retry"
                    );
                    sleep(retry.delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn send_once(&mut self, url: &str) -> Result<String> {
        self.pacer.wait().await;

        debug!("Making API request to: {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status.as_u16() == 429 {
            return Err(PubMedError::RateLimitExceeded);
        }

        if !status.is_success() {
            warn!("API request failed with status: {}", status);
            return Err(PubMedError::ApiError {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string(),
            });
        }

        Ok(response.text().await?)
    }
}
