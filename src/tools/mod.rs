pub mod count;
pub mod search;

pub use count::*;
pub use search::*;

use crate::engine::SearchEngine;
use crate::error::SearchError;
use crate::search::SearchMode;
use crate::store::DocumentStore;
use std::sync::Arc;

/// The engine as shared by tool handlers, over any store.
pub type SharedEngine = Arc<SearchEngine<Arc<dyn DocumentStore>>>;

/// Parses a tool's optional mode argument, falling back to `default`.
fn parse_mode(mode: Option<&str>, default: SearchMode) -> Result<SearchMode, SearchError> {
    mode.map_or(Ok(default), str::parse)
}
