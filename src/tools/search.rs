//! The `search` tool: ranked, paginated rows with headlines.

use crate::error::SearchError;
use crate::format::format_search_results;
use crate::search::SearchMode;
use crate::types::{PageRequest, SearchQuery, SearchResult};
use rmcp::schemars;
use serde::Deserialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::{SharedEngine, parse_mode};

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchRequest {
    /// Query text
    pub query: String,
    /// Matching mode: phrase, simple, plain, normal, string or regex (default: simple)
    #[serde(default)]
    pub mode: Option<String>,
    /// Match case exactly; only applies to the string and regex modes (default: false)
    #[serde(default)]
    pub case_sensitive: bool,
    /// Zero-indexed page of documents; pagination applies only together with page_size
    #[serde(default)]
    pub page: Option<i64>,
    /// Documents per page
    #[serde(default)]
    pub page_size: Option<i64>,
}

impl SearchRequest {
    pub fn to_query(&self) -> Result<SearchQuery, SearchError> {
        let mode = parse_mode(self.mode.as_deref(), SearchMode::Simple)?;
        Ok(SearchQuery::new(self.query.clone(), mode).case_sensitive(self.case_sensitive))
    }

    pub const fn page_request(&self) -> PageRequest {
        PageRequest {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

/// Run a search on a blocking worker and render the page.
///
/// Dropping the returned future (for instance when the client cancels the
/// request) cancels the search.
pub async fn handle_search(engine: &SharedEngine, request: SearchRequest) -> Result<String, String> {
    let query = request.to_query().map_err(|e| e.to_string())?;
    let page = request.page_request();

    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();
    let engine = Arc::clone(engine);

    tokio::task::spawn_blocking(move || {
        let stream = engine.search_with_cancel(&query, page, cancel)?;
        let total_documents = stream.total_documents();
        let rows: Vec<SearchResult> = stream.collect();
        Ok::<_, SearchError>(format_search_results(&query, &rows, total_documents, page))
    })
    .await
    .map_err(|e| format!("Search task failed: {}", e))?
    .map_err(|e| e.to_string())
}
