//! PubMed E-utilities XML parsing
//!
//! [`parse_search_response`] reads ESearch results; [`parse_articles_from_xml`]
//! turns an EFetch `PubmedArticleSet` into [`Article`]s. Records are parsed
//! independently: a fragment that lacks its citation or article element is
//! logged and skipped, and a broken author entry only drops that author.

use tracing::{debug, instrument, warn};

use crate::error::{PubMedError, Result};
use crate::pubmed::models::{Article, Author, NO_TITLE, UNKNOWN_JOURNAL, UNKNOWN_PMID};
use crate::xml::XmlElement;

/// Identifiers and bookkeeping from an ESearch response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    /// PMIDs in response (relevance) order
    pub ids: Vec<String>,
    /// Total number of matches reported by NCBI
    pub count: Option<usize>,
    /// Error message NCBI embeds in an otherwise successful response
    pub error: Option<String>,
}

/// Parse an ESearch XML response
///
/// Every non-empty `Id` element is returned in document order.
#[instrument(skip(xml), fields(xml_size = xml.len()))]
pub fn parse_search_response(xml: &str) -> Result<SearchResult> {
    let root = XmlElement::parse(xml)?;

    let ids = root
        .descendants("Id")
        .into_iter()
        .filter_map(XmlElement::non_empty_text)
        .collect();
    let count = root
        .child("Count")
        .and_then(|c| c.text().parse::<usize>().ok());
    let error = root.child("ERROR").and_then(XmlElement::non_empty_text);

    Ok(SearchResult { ids, count, error })
}

/// Parse every `PubmedArticle` in an EFetch response
///
/// Fails only when the response as a whole is not well-formed XML. Records
/// that cannot be parsed are skipped, so the result may be shorter than the
/// number of fragments.
///
/// # Example
///
/// ```
/// use biolitminer_client::pubmed::parser::parse_articles_from_xml;
///
/// let xml = r#"<PubmedArticleSet>
///   <PubmedArticle>
///     <MedlineCitation>
///       <PMID>12345678</PMID>
///       <Article>
///         <ArticleTitle>Example Article</ArticleTitle>
///         <Journal><Title>Example Journal</Title></Journal>
///       </Article>
///     </MedlineCitation>
///   </PubmedArticle>
/// </PubmedArticleSet>"#;
///
/// let articles = parse_articles_from_xml(xml).unwrap();
/// assert_eq!(articles[0].title, "Example Article");
/// ```
#[instrument(skip(xml), fields(xml_size = xml.len()))]
pub fn parse_articles_from_xml(xml: &str) -> Result<Vec<Article>> {
    let root = XmlElement::parse(xml)?;

    let fragments = root.descendants("PubmedArticle");
    let total = fragments.len();

    let articles: Vec<Article> = fragments
        .into_iter()
        .filter_map(|fragment| match parse_article(fragment) {
            Ok(article) => Some(article),
            Err(e) => {
                let pmid = salvage_pmid(fragment);
                warn!(pmid = %pmid, error = %e, "Failed to parse article, skipping");
                None
            }
        })
        .collect();

    debug!(fragments = total, parsed = articles.len(), "Parsed EFetch response");
    Ok(articles)
}

/// Parse one `PubmedArticle` fragment
pub fn parse_article(fragment: &XmlElement) -> Result<Article> {
    let citation = fragment
        .descendant("MedlineCitation")
        .ok_or_else(|| PubMedError::MissingElement {
            element: "MedlineCitation",
            pmid: UNKNOWN_PMID.to_string(),
        })?;

    let pmid = citation
        .descendant("PMID")
        .and_then(XmlElement::non_empty_text)
        .unwrap_or_else(|| UNKNOWN_PMID.to_string());

    let article = citation
        .descendant("Article")
        .ok_or_else(|| PubMedError::MissingElement {
            element: "Article",
            pmid: pmid.clone(),
        })?;

    let title = article
        .descendant("ArticleTitle")
        .and_then(XmlElement::non_empty_text)
        .unwrap_or_else(|| NO_TITLE.to_string());

    let parsed = Article {
        abstract_text: extract_abstract(article),
        authors: extract_authors(article, &pmid),
        journal: extract_journal(citation, article),
        publication_date: extract_publication_year(article),
        pmid,
        title,
    };

    let title_preview: String = parsed.title.chars().take(50).collect();
    debug!(
        pmid = %parsed.pmid,
        title = %title_preview,
        authors = parsed.authors.len(),
        "Parsed article"
    );
    Ok(parsed)
}

/// Best-effort identifier for log records about a fragment
fn salvage_pmid(fragment: &XmlElement) -> String {
    fragment
        .descendant("PMID")
        .and_then(XmlElement::non_empty_text)
        .unwrap_or_else(|| UNKNOWN_PMID.to_string())
}

/// Join all abstract sections, prefixing labelled ones with `"Label: "`
fn extract_abstract(article: &XmlElement) -> String {
    article
        .find_all("Abstract/AbstractText")
        .into_iter()
        .filter_map(|section| {
            let text = section.non_empty_text()?;
            match section.attr("Label").map(str::trim).filter(|l| !l.is_empty()) {
                Some(label) => Some(format!("{label}: {text}")),
                None => Some(text),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Authors in document order; unusable entries are dropped individually
fn extract_authors(article: &XmlElement, pmid: &str) -> Vec<Author> {
    article
        .find_all("AuthorList/Author")
        .into_iter()
        .enumerate()
        .filter_map(|(position, author)| match parse_author(author) {
            Some(parsed) => Some(parsed),
            None => {
                debug!(pmid = %pmid, position, "Skipping author without a name");
                None
            }
        })
        .collect()
}

fn parse_author(author: &XmlElement) -> Option<Author> {
    let field = |name: &str| author.child(name).and_then(XmlElement::non_empty_text);

    if let Some(last_name) = field("LastName") {
        return Some(Author {
            last_name,
            first_name: field("ForeName").unwrap_or_default(),
            initials: field("Initials").unwrap_or_default(),
        });
    }

    field("CollectiveName").map(Author::collective)
}

/// Journal title, then ISO abbreviation, then the MEDLINE abbreviation
fn extract_journal(citation: &XmlElement, article: &XmlElement) -> String {
    [
        article.find("Journal/Title"),
        article.find("Journal/ISOAbbreviation"),
        citation.find("MedlineJournalInfo/MedlineTA"),
    ]
    .into_iter()
    .flatten()
    .find_map(XmlElement::non_empty_text)
    .unwrap_or_else(|| UNKNOWN_JOURNAL.to_string())
}

fn extract_publication_year(article: &XmlElement) -> Option<String> {
    article
        .find("Journal/JournalIssue/PubDate/Year")
        .and_then(XmlElement::non_empty_text)
}
