use crate::search::{LexicalIndex, SearchMode};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a logical guidance document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub i64);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of one dated revision of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionId(pub i64);

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stored fields of a document version, as they appear in a corpus file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub id: VersionId,
    pub document_id: DocumentId,
    pub title: String,
    pub slug: String,
    pub effective_date: NaiveDate,
    #[serde(default)]
    pub termination_date: Option<NaiveDate>,
    pub content: String,
}

/// A document version together with its precomputed lexical index.
///
/// The index is built by the store when the content changes and may lag the
/// content under an incrementally maintained store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentVersion {
    pub record: VersionRecord,
    pub index: LexicalIndex,
}

/// One result row: a matching document version with its rendered headline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: VersionId,
    pub title: String,
    pub slug: String,
    pub document_id: DocumentId,
    pub effective_date: NaiveDate,
    pub termination_date: Option<NaiveDate>,
    /// HTML fragment with highlight markers; empty when no snippet could be produced.
    pub headline: String,
}

/// Distinct documents and versions matching a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCount {
    pub num_documents: usize,
    pub num_document_versions: usize,
}

/// A query string with its matching mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub mode: SearchMode,
    /// Only meaningful for the `string` and `regex` modes.
    pub case_sensitive: bool,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>, mode: SearchMode) -> Self {
        Self {
            text: text.into(),
            mode,
            case_sensitive: false,
        }
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }
}

/// Raw pagination arguments. Pagination is disabled unless both are present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// Zero-indexed page number.
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl PageRequest {
    pub const fn all() -> Self {
        Self {
            page: None,
            page_size: None,
        }
    }

    pub const fn page(page: i64, page_size: i64) -> Self {
        Self {
            page: Some(page),
            page_size: Some(page_size),
        }
    }
}
