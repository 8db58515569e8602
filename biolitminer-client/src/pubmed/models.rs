use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier substituted when a record carries no `PMID`
pub const UNKNOWN_PMID: &str = "Unknown";
/// Title substituted when a record has no usable `ArticleTitle`
pub const NO_TITLE: &str = "No title available";
/// Journal substituted when every journal-name path is missing
pub const UNKNOWN_JOURNAL: &str = "Unknown journal";

/// An article author
///
/// Group authors ("World Health Organization") are stored with the group
/// name in `last_name` and empty `first_name` / `initials`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub last_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub initials: String,
}

impl Author {
    pub fn new(
        last_name: impl Into<String>,
        first_name: impl Into<String>,
        initials: impl Into<String>,
    ) -> Self {
        Self {
            last_name: last_name.into(),
            first_name: first_name.into(),
            initials: initials.into(),
        }
    }

    /// A collective (group) author
    pub fn collective(name: impl Into<String>) -> Self {
        Self::new(name, "", "")
    }

    /// Name as shown in listings: "First Last", falling back to the
    /// initials and then to the last name alone
    pub fn display_name(&self) -> String {
        let given = if self.first_name.is_empty() {
            &self.initials
        } else {
            &self.first_name
        };

        if given.is_empty() {
            self.last_name.clone()
        } else {
            format!("{} {}", given, self.last_name)
        }
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// A PubMed article flattened into plain fields
///
/// The serialized field names (`pmid`, `title`, `abstract`, `authors`,
/// `journal`, `publication_date`) are what the CLI output file and the
/// dashboard export contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// PubMed ID, or `"Unknown"` when the record had none
    pub pmid: String,
    /// Article title, or `"No title available"`
    pub title: String,
    /// Abstract sections joined in document order; empty when absent
    #[serde(rename = "abstract", default)]
    pub abstract_text: String,
    /// Authors in document order
    #[serde(default)]
    pub authors: Vec<Author>,
    /// Journal name, or `"Unknown journal"`
    pub journal: String,
    /// Publication year
    #[serde(default)]
    pub publication_date: Option<String>,
}

impl Article {
    /// Whether the abstract is non-empty
    pub fn has_abstract(&self) -> bool {
        !self.abstract_text.is_empty()
    }
}

impl fmt::Display for Article {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short: String = self.title.chars().take(50).collect();
        write!(f, "Article(pmid={}, title='{}...')", self.pmid, short)
    }
}
