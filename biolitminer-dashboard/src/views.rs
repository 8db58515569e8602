//! HTML rendering for the dashboard pages
//!
//! Pages are assembled from plain strings. Every value that comes from the
//! user or from PubMed passes through [`escape_html`] before it is embedded.

use std::fmt::Write;

use biolitminer_client::{Article, Author, SearchSummary};

pub const EXAMPLE_QUERIES: [(&str, &str); 3] = [
    ("COVID-19 research", "COVID-19"),
    ("BRCA1 breast cancer", "BRCA1 breast cancer"),
    ("AI in medicine", "artificial intelligence medicine"),
];

/// Authors listed per article before "et al."
const LISTED_AUTHORS: usize = 5;

const STYLE: &str = "body{font-family:sans-serif;margin:0;display:flex}\
aside{width:18rem;padding:1rem;background:#f3f4f6;min-height:100vh}\
main{flex:1;padding:1rem 2rem}\
.warning{background:#fef3c7;padding:.75rem}\
.error{background:#fee2e2;padding:.75rem}\
.info{background:#dbeafe;padding:.75rem}\
.stats{display:flex;gap:2rem}\
.stat b{display:block;font-size:1.5rem}\
details{border-bottom:1px solid #ddd;padding:.5rem 0}";

/// Settings echoed back into the search form
#[derive(Debug, Clone)]
pub struct FormState {
    pub query: String,
    pub email: String,
    pub max_results: usize,
    pub verbose: bool,
    pub show_abstracts: bool,
}

/// What a search produced
#[derive(Debug)]
pub enum SearchOutcome<'a> {
    /// Search returned no identifiers
    NoArticles,
    /// Identifiers were found but no record could be parsed
    Unparsed,
    Found {
        articles: &'a [Article],
        total_ids: usize,
    },
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Landing page: configuration, search form and example queries
pub fn index_page(form: &FormState, version: &str) -> String {
    layout(form, version, "")
}

/// Page shown when the form was submitted without a query
pub fn missing_query_page(form: &FormState, version: &str) -> String {
    layout(
        form,
        version,
        &notice("warning", "Please enter a search query."),
    )
}

/// Results page for one search
pub fn results_page(form: &FormState, version: &str, outcome: &SearchOutcome<'_>) -> String {
    let mut body = format!(
        "<h2>Results for: <em>{}</em></h2>",
        escape_html(&form.query)
    );

    match outcome {
        SearchOutcome::NoArticles => {
            body.push_str(&notice("warning", "No articles found. Try different keywords."));
        }
        SearchOutcome::Unparsed => {
            body.push_str(&notice("error", "Found articles but couldn't parse details."));
        }
        SearchOutcome::Found {
            articles,
            total_ids,
        } => {
            let summary = SearchSummary::from_articles(articles, *total_ids);
            body.push_str(&summary_section(&summary));
            body.push_str(&articles_section(articles, form.show_abstracts));
            body.push_str(&export_section(&summary));
        }
    }

    layout(form, version, &body)
}

fn layout(form: &FormState, version: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>BioLitMiner</title>
<style>{style}</style>
</head>
<body>
<form action="/search" method="get" style="display:contents">
{sidebar}
<main>
<h1>BioLitMiner</h1>
<p>Biomedical Literature Mining and Analysis</p>
{search}
{content}
{examples}
</main>
</form>
</body>
</html>
"#,
        style = STYLE,
        sidebar = sidebar(form, version),
        search = search_section(form),
        content = content,
        examples = examples_section(form),
    )
}

fn sidebar(form: &FormState, version: &str) -> String {
    format!(
        r#"<aside>
<h2>Configuration</h2>
<p class="info">Version: {version}</p>
<label>Email for PubMed API<br>
<input type="email" name="email" value="{email}" title="Required by NCBI for API access"></label>
<p><label>Max Results<br>
<input type="number" name="max_results" min="1" max="100" value="{max}"></label></p>
<h3>Advanced Options</h3>
<p><label><input type="checkbox" name="verbose"{verbose}> Enable verbose logging</label></p>
<p><label><input type="checkbox" name="show_abstracts"{abstracts}> Show abstracts in results</label></p>
</aside>"#,
        version = escape_html(version),
        email = escape_html(&form.email),
        max = form.max_results,
        verbose = checked(form.verbose),
        abstracts = checked(form.show_abstracts),
    )
}

fn search_section(form: &FormState) -> String {
    format!(
        r#"<section>
<h2>Search PubMed</h2>
<input type="text" name="query" size="60" value="{query}" placeholder="e.g., COVID-19, BRCA1 breast cancer, machine learning genomics">
<button type="submit">Search</button>
<a href="/clear">Clear</a>
</section>"#,
        query = escape_html(&form.query),
    )
}

fn examples_section(form: &FormState) -> String {
    let mut links = String::new();
    for (label, query) in EXAMPLE_QUERIES {
        let _ = write!(
            links,
            r#"<li><a href="{}">{}</a></li>"#,
            escape_html(&search_link(form, query)),
            escape_html(label)
        );
    }
    format!("<section>\n<h2>Example Queries</h2>\n<ul>{links}</ul>\n</section>")
}

/// URL running `query` with the current form settings
pub fn search_link(form: &FormState, query: &str) -> String {
    let mut link = format!(
        "/search?query={}&email={}&max_results={}",
        urlencoding::encode(query),
        urlencoding::encode(&form.email),
        form.max_results
    );
    if form.verbose {
        link.push_str("&verbose=on");
    }
    if form.show_abstracts {
        link.push_str("&show_abstracts=on");
    }
    link
}

fn summary_section(summary: &SearchSummary) -> String {
    let mut html = String::from("<section>\n<h3>Summary Statistics</h3>\n<div class=\"stats\">");
    for (label, value) in [
        ("Articles Found", summary.articles.to_string()),
        (
            "Successfully Parsed",
            format!("{}/{}", summary.articles, summary.total_ids),
        ),
        ("Unique Journals", summary.unique_journals.to_string()),
        ("Total Authors", summary.total_authors.to_string()),
    ] {
        let _ = write!(
            html,
            r#"<div class="stat"><b>{value}</b>{label}</div>"#
        );
    }
    html.push_str("</div>\n<h4>Top Journals</h4>\n<ul>");
    for (journal, count) in &summary.top_journals {
        let _ = write!(
            html,
            "<li>{}: {} article{}</li>",
            escape_html(journal),
            count,
            if *count == 1 { "" } else { "s" }
        );
    }
    html.push_str("</ul>\n</section>");
    html
}

fn articles_section(articles: &[Article], show_abstracts: bool) -> String {
    let mut html = String::from("<section>\n<h3>Articles</h3>");
    for (i, article) in articles.iter().enumerate() {
        let _ = write!(
            html,
            "<details><summary><b>{}. {}</b></summary>\n\
             <p><b>PMID:</b> {}<br><b>Journal:</b> {}",
            i + 1,
            escape_html(&article.title),
            escape_html(&article.pmid),
            escape_html(&article.journal)
        );
        if !article.authors.is_empty() {
            let _ = write!(
                html,
                "<br><b>Authors:</b> {}",
                escape_html(&format_authors(&article.authors))
            );
        }
        if let Some(year) = &article.publication_date {
            let _ = write!(html, "<br><b>Year:</b> {}", escape_html(year));
        }
        html.push_str("</p>");

        if show_abstracts {
            if article.has_abstract() {
                let _ = write!(
                    html,
                    "<p><b>Abstract:</b></p><p>{}</p>",
                    escape_html(&article.abstract_text)
                );
            } else {
                html.push_str("<p><i>No abstract available</i></p>");
            }
        }
        html.push_str("</details>\n");
    }
    html.push_str("</section>");
    html
}

fn export_section(summary: &SearchSummary) -> String {
    format!(
        r#"<section>
<h3>Export Results</h3>
<p><a href="/export.json" download>Download JSON</a></p>
<p class="info">Found {} articles from {} journals</p>
</section>"#,
        summary.articles, summary.unique_journals
    )
}

/// Up to five authors, then "et al."
fn format_authors(authors: &[Author]) -> String {
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

fn notice(class: &str, message: &str) -> String {
    format!(r#"<p class="{class}">{}</p>"#, escape_html(message))
}

fn checked(on: bool) -> &'static str {
    if on { " checked" } else { "" }
}
