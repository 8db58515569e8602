//! JSON export and result statistics
//!
//! The CLI writes a plain article array; the dashboard offers a download
//! that wraps the articles with the query and an export timestamp.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::Result;
use crate::pubmed::models::Article;

/// How many journals [`SearchSummary::top_journals`] keeps
pub const TOP_JOURNALS: usize = 5;

/// Write `articles` as an indented JSON array to `path`
#[instrument(skip(path, articles), fields(path = %path.as_ref().display(), count = articles.len()))]
pub fn write_articles_json(path: impl AsRef<Path>, articles: &[Article]) -> Result<()> {
    let json = serde_json::to_string_pretty(articles)?;
    fs::write(path.as_ref(), json)?;
    info!("Saved articles to file");
    Ok(())
}

/// Downloadable search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchExport {
    pub search_query: String,
    /// Local time of the export, ISO-8601
    pub export_date: String,
    pub total_articles: usize,
    pub articles: Vec<Article>,
}

impl SearchExport {
    pub fn new(query: impl Into<String>, articles: Vec<Article>) -> Self {
        Self {
            search_query: query.into(),
            export_date: Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            total_articles: articles.len(),
            articles,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Timestamped download name, e.g. `biolitminer_results_20240131_154501.json`
pub fn export_filename(extension: &str) -> String {
    format!(
        "biolitminer_results_{}.{}",
        Local::now().format("%Y%m%d_%H%M%S"),
        extension
    )
}

/// Summary statistics over one result set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchSummary {
    /// Records that were parsed
    pub articles: usize,
    /// Identifiers the search returned
    pub total_ids: usize,
    pub unique_journals: usize,
    pub total_authors: usize,
    /// Most frequent journals with their counts; ties keep first-seen order
    pub top_journals: Vec<(String, usize)>,
}

impl SearchSummary {
    pub fn from_articles(articles: &[Article], total_ids: usize) -> Self {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for article in articles {
            match counts.iter_mut().find(|(journal, _)| *journal == article.journal) {
                Some((_, count)) => *count += 1,
                None => counts.push((article.journal.clone(), 1)),
            }
        }

        let unique_journals = articles
            .iter()
            .map(|a| a.journal.as_str())
            .collect::<HashSet<_>>()
            .len();

        // Stable sort keeps first-seen order among equal counts
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts.truncate(TOP_JOURNALS);

        Self {
            articles: articles.len(),
            total_ids,
            unique_journals,
            total_authors: articles.iter().map(|a| a.authors.len()).sum(),
            top_journals: counts,
        }
    }

    /// Whether some identifiers did not yield a record
    pub fn is_partial(&self) -> bool {
        self.articles < self.total_ids
    }
}
