use std::result;

use crate::retry::RetryableError;
use thiserror::Error;

/// Error types for PubMed client operations
///
/// These never escape the public search/fetch operations of
/// [`PubMedClient`](crate::PubMedClient); they are logged and turned into
/// empty or shorter result lists there.
#[derive(Error, Debug)]
pub enum PubMedError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// JSON serialization failed
    #[error("JSON serialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    /// XML parsing failed
    #[error("XML parsing failed: {0}")]
    XmlError(String),

    /// A record fragment lacks an element it cannot be parsed without
    #[error("Missing <{element}> element in record {pmid}")]
    MissingElement { element: &'static str, pmid: String },

    /// API rate limit exceeded (HTTP 429)
    #[error("API rate limit exceeded")]
    RateLimitExceeded,

    /// Generic API error with HTTP status code
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    /// IO error for file operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = result::Result<T, PubMedError>;

impl RetryableError for PubMedError {
    fn is_retryable(&self) -> bool {
        match self {
            PubMedError::RateLimitExceeded => true,
            PubMedError::ApiError { status, .. } => *status == 429,
            PubMedError::RequestError(err) => err.status().is_some_and(|s| s.as_u16() == 429),

            // Everything else is terminal for the call
            PubMedError::JsonError(_)
            | PubMedError::XmlError(_)
            | PubMedError::MissingElement { .. }
            | PubMedError::IoError(_) => false,
        }
    }

    fn retry_reason(&self) -> &str {
        if self.is_retryable() {
            "Rate limit exceeded"
        } else {
            match self {
                PubMedError::RequestError(err) if err.is_timeout() => "Request timeout",
                PubMedError::RequestError(err) if err.is_connect() => "Connection error",
                PubMedError::RequestError(_) => "Network error",
                PubMedError::ApiError { status, .. } => match status {
                    500..=599 => "Server error",
                    _ => "Client error",
                },
                PubMedError::XmlError(_) => "Invalid XML response",
                PubMedError::MissingElement { .. } => "Incomplete record",
                PubMedError::JsonError(_) => "Invalid JSON",
                PubMedError::IoError(_) => "File system error",
                PubMedError::RateLimitExceeded => "Rate limit exceeded",
            }
        }
    }
}
