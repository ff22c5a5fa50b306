//! Error handling types and utilities.

use crate::types::VersionId;
use std::time::Duration;

/// A specialized Result type for application-level operations (CLI, config, server startup).
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` methods at the application boundary.
pub type Result<T> = anyhow::Result<T>;

/// Errors surfaced by the search engine to its callers.
///
/// None of these are ever swallowed into an empty result set: a malformed request
/// always reaches the caller unmodified.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The query string was empty or whitespace only.
    #[error("search query must not be empty")]
    EmptyQuery,

    /// The requested mode is not one of the six known modes.
    #[error("invalid search mode '{mode}'{}", suggestion_suffix(.suggestion.as_deref()))]
    InvalidSearchMode {
        mode: String,
        suggestion: Option<&'static str>,
    },

    /// A `string`/`regex` query failed to compile.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A `normal` mode query has malformed operator syntax.
    #[error("invalid query syntax at offset {offset}: {reason}")]
    InvalidQuery { offset: usize, reason: String },

    /// Pagination was requested with a non-positive page size or a negative page.
    #[error("invalid pagination argument: {0}")]
    InvalidPaginationArgument(String),

    /// Pattern evaluation exceeded its time budget.
    #[error("search exceeded its time limit of {limit:?}")]
    SearchTimeout { limit: Duration },

    /// The caller cancelled the invocation before ranking finished.
    #[error("search was cancelled")]
    Cancelled,

    /// The underlying document store failed.
    #[error("search execution failed: {0}")]
    SearchExecution(#[from] StoreError),
}

fn suggestion_suffix(suggestion: Option<&str>) -> String {
    suggestion
        .map(|s| format!(" (did you mean '{}'?)", s))
        .unwrap_or_default()
}

/// Error returned by a [`DocumentStore`](crate::store::DocumentStore) implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached or read.
    #[error("document store unavailable: {0}")]
    Unavailable(String),

    /// The corpus file could not be read.
    #[error("failed to read corpus: {0}")]
    Io(#[from] std::io::Error),

    /// The corpus file is not valid corpus JSON.
    #[error("failed to parse corpus: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two records in one corpus share a version id.
    #[error("duplicate version id {0} in corpus")]
    DuplicateVersion(VersionId),

    /// The lexical index cache could not be encoded.
    #[error("failed to encode index cache: {0}")]
    Cache(#[from] postcard::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn test_invalid_mode_message_includes_suggestion() {
        let err = SearchError::InvalidSearchMode {
            mode: "regx".to_string(),
            suggestion: Some("regex"),
        };
        check!(err.to_string() == "invalid search mode 'regx' (did you mean 'regex'?)");

        let err = SearchError::InvalidSearchMode {
            mode: "zzz".to_string(),
            suggestion: None,
        };
        check!(err.to_string() == "invalid search mode 'zzz'");
    }

    #[test]
    fn test_store_error_converts_into_execution_error() {
        let err: SearchError = StoreError::Unavailable("connection reset".to_string()).into();
        check!(matches!(err, SearchError::SearchExecution(_)));
        check!(
            err.to_string()
                == "search execution failed: document store unavailable: connection reset"
        );
    }
}
