//! The `search_count` tool: matching document and version totals.

use crate::error::SearchError;
use crate::format::format_count;
use crate::search::SearchMode;
use crate::types::SearchQuery;
use rmcp::schemars;
use serde::Deserialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::{SharedEngine, parse_mode};

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchCountRequest {
    /// Query text
    pub query: String,
    /// Matching mode: phrase, simple, plain, normal, string or regex (default: normal)
    #[serde(default)]
    pub mode: Option<String>,
    /// Match case exactly; only applies to the string and regex modes (default: false)
    #[serde(default)]
    pub case_sensitive: bool,
}

impl SearchCountRequest {
    pub fn to_query(&self) -> Result<SearchQuery, SearchError> {
        let mode = parse_mode(self.mode.as_deref(), SearchMode::Normal)?;
        Ok(SearchQuery::new(self.query.clone(), mode).case_sensitive(self.case_sensitive))
    }
}

/// Count matches on a blocking worker.
pub async fn handle_search_count(
    engine: &SharedEngine,
    request: SearchCountRequest,
) -> Result<String, String> {
    let query = request.to_query().map_err(|e| e.to_string())?;

    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();
    let engine = Arc::clone(engine);

    tokio::task::spawn_blocking(move || {
        let count = engine.search_count_with_cancel(&query, cancel)?;
        Ok::<_, SearchError>(format_count(&query, &count))
    })
    .await
    .map_err(|e| format!("Count task failed: {}", e))?
    .map_err(|e| e.to_string())
}
