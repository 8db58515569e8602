//! PubMed search and fetch
//!
//! - `client` - rate-limited ESearch/EFetch client
//! - `models` - flattened article and author records
//! - `parser` - defensive XML parsing of ESearch/EFetch responses

pub mod client;
pub mod models;
pub mod parser;

pub use client::PubMedClient;
pub use models::{Article, Author, NO_TITLE, UNKNOWN_JOURNAL, UNKNOWN_PMID};
pub use parser::{SearchResult, parse_article, parse_articles_from_xml, parse_search_response};
