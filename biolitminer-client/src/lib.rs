//! # BioLitMiner Client
//!
//! A Rust client for retrieving biomedical literature metadata from PubMed
//! through the NCBI E-utilities API.
//!
//! ## Features
//!
//! - **Search**: ESearch queries returning PMIDs in relevance order
//! - **Batch fetch**: one EFetch request per PMID list, parsed record by record
//! - **Rate limiting**: a minimum gap between requests (500 ms by default)
//! - **Retry**: one retry after 10 seconds when NCBI answers HTTP 429
//! - **Defensive parsing**: malformed records are skipped, missing fields
//!   are replaced by fixed placeholders
//! - **Export**: JSON output and summary statistics for result sets
//!
//! ## Quick Start
//!
//! ```no_run
//! use biolitminer_client::PubMedClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = PubMedClient::new("researcher@university.edu")?;
//!
//!     let articles = client.search_and_fetch("BRCA1 breast cancer", 5).await;
//!
//!     for article in &articles {
//!         println!("{} ({})", article.title, article.journal);
//!         for author in &article.authors {
//!             println!("  {}", author);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! ```
//! use biolitminer_client::{ClientConfig, PubMedClient, RetryConfig};
//! use std::time::Duration;
//!
//! let config = ClientConfig::new()
//!     .with_email("researcher@university.edu")
//!     .with_timeout(Duration::from_secs(30))
//!     .with_retry_config(RetryConfig::new().with_delay(Duration::from_secs(5)));
//!
//! let client = PubMedClient::with_config(config).unwrap();
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod pubmed;
pub mod rate_limit;
pub mod retry;
pub mod xml;

// Re-export main types for convenience
pub use config::ClientConfig;
pub use error::{PubMedError, Result};
pub use export::{SearchExport, SearchSummary, export_filename, write_articles_json};
pub use pubmed::{Article, Author, PubMedClient};
pub use rate_limit::RequestPacer;
pub use retry::{RetryConfig, RetryableError};
