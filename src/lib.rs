//! Ranked, paginated full-text and pattern search over versioned guidance documents.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod headline;
pub mod search;
pub mod server;
pub mod store;
pub mod tools;
pub mod tracing;
pub mod types;

pub use config::EngineConfig;
pub use engine::{ResultStream, SearchEngine};
pub use error::{SearchError, StoreError};
pub use search::{Family, SearchMode};
pub use store::{Corpus, DocumentStore, InMemoryStore};
pub use types::{
    DocumentId, DocumentVersion, MatchCount, PageRequest, SearchQuery, SearchResult, VersionId,
    VersionRecord,
};
