use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use biolitminer_client::config::DEFAULT_EMAIL;
use biolitminer_client::{Article, Author, write_articles_json};
use clap::Args;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use indicatif::ProgressStyle;
use owo_colors::OwoColorize;
use tracing::{Instrument, info, info_span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use super::create_client;

const TITLE_WIDTH: usize = 50;
const JOURNAL_WIDTH: usize = 20;
const LISTED_AUTHORS: usize = 2;

#[derive(Args, Debug)]
pub struct Search {
    /// Search query for PubMed
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Maximum number of results
    #[arg(short, long, default_value_t = 10)]
    pub max: usize,

    /// Contact email sent to the PubMed API
    #[arg(short, long, env = "NCBI_EMAIL", default_value = DEFAULT_EMAIL)]
    pub email: String,

    /// Save results to file (JSON)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,
}

impl Search {
    pub async fn execute(&self) -> Result<()> {
        println!("{} {}", "Searching PubMed for:".bold().blue(), self.query);
        println!(
            "{}\n",
            format!("Max results: {}, Email: {}", self.max, self.email).dimmed()
        );

        let mut client = create_client(&self.email, self.timeout)?;
        let style = spinner_style()?;

        let search_span = info_span!("search");
        search_span.pb_set_style(&style);
        search_span.pb_set_message("Searching PubMed...");
        let pmids = client
            .search_articles(&self.query, self.max)
            .instrument(search_span)
            .await;

        if pmids.is_empty() {
            println!("{}", "No articles found!".red());
            return Ok(());
        }
        info!("Found {} PMIDs", pmids.len());

        let fetch_span = info_span!("fetch");
        fetch_span.pb_set_style(&style);
        fetch_span.pb_set_message("Fetching article details...");
        let articles = client.fetch_articles(&pmids).instrument(fetch_span).await;

        if articles.is_empty() {
            println!("{}", "No articles could be parsed!".red());
            return Ok(());
        }

        if articles.len() < pmids.len() {
            println!(
                "{}",
                format!(
                    "Warning: Successfully parsed {}/{} articles",
                    articles.len(),
                    pmids.len()
                )
                .yellow()
            );
        }

        println!("{}", render_table(&articles));
        println!(
            "\n{}",
            format!("Successfully retrieved {} articles", articles.len())
                .bold()
                .green()
        );

        if let Some(path) = &self.output {
            save_results(path, &articles)?;
            println!("{}", format!("Results saved to {}", path.display()).green());
        }

        Ok(())
    }
}

fn spinner_style() -> Result<ProgressStyle> {
    Ok(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?)
}

fn save_results(path: &Path, articles: &[Article]) -> Result<()> {
    write_articles_json(path, articles)
        .with_context(|| format!("Failed to write results to {}", path.display()))
}

/// Results table: PMID, shortened title and journal, leading authors
pub fn render_table(articles: &[Article]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(comfy_table::presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            ["PMID", "Title", "Journal", "Authors"]
                .into_iter()
                .map(|name| Cell::new(name).add_attribute(Attribute::Bold).fg(Color::Magenta)),
        );

    for article in articles {
        table.add_row(vec![
            Cell::new(&article.pmid).fg(Color::Cyan),
            Cell::new(truncate(&article.title, TITLE_WIDTH)),
            Cell::new(truncate(&article.journal, JOURNAL_WIDTH)).fg(Color::Green),
            Cell::new(format_authors(&article.authors)).fg(Color::Yellow),
        ]);
    }

    table
}

/// Shorten `text` to `width` characters, ending in "..." when cut
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let kept: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        text.to_string()
    }
}

/// First two authors, "et al." when there are more
fn format_authors(authors: &[Author]) -> String {
    if authors.is_empty() {
        return "No authors".to_string();
    }

    let mut names: Vec<String> = authors
        .iter()
        .take(LISTED_AUTHORS)
        .map(Author::display_name)
        .collect();
    if authors.len() > LISTED_AUTHORS {
        names.push("et al.".to_string());
    }
    names.join(", ")
}
