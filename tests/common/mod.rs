//! Shared test fixtures and utilities for integration tests.
//!
//! # Available Fixtures
//!
//! - `guidance_corpus`: the records of a small public-health guidance corpus
//! - `engine`: a [`SearchEngine`] over that corpus in an [`InMemoryStore`]
//! - `shared_engine`: the same engine behind the type-erased handle the MCP tools use
//! - `d1_engine`: a single document "D1" with two versions mentioning "guidance"
//!
//! [`TempCorpus`] writes records to a corpus file in a temporary directory for
//! tests that exercise file loading and the index cache.

use chrono::NaiveDate;
use guidance_search::tools::SharedEngine;
use guidance_search::{
    DocumentId, DocumentStore, EngineConfig, InMemoryStore, PageRequest, SearchEngine,
    SearchQuery, SearchResult, VersionId, VersionRecord,
};
use rstest::fixture;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Builds a version record dated `date` (`YYYY-MM-DD`).
pub fn record(id: i64, document_id: i64, title: &str, date: &str, content: &str) -> VersionRecord {
    VersionRecord {
        id: VersionId(id),
        document_id: DocumentId(document_id),
        title: title.to_string(),
        slug: title.to_lowercase().replace(' ', "-"),
        effective_date: NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap_or_else(|e| panic!("Bad fixture date '{}': {}", date, e)),
        termination_date: None,
        content: content.to_string(),
    }
}

/// Five documents, eight versions.
#[fixture]
pub fn guidance_corpus() -> Vec<VersionRecord> {
    let mut first_masks = record(
        101,
        10,
        "Face Coverings",
        "2020-04-01",
        "Face masks are required in all public indoor settings. Masks must cover the nose and mouth.",
    );
    first_masks.termination_date = NaiveDate::from_ymd_opt(2020, 7, 14);

    vec![
        first_masks,
        record(
            102,
            10,
            "Face Coverings",
            "2020-07-15",
            "Face masks are recommended indoors. Cloth masks and surgical masks are both acceptable.",
        ),
        record(
            201,
            20,
            "Office Reopening",
            "2020-05-01",
            "Offices may reopen at reduced capacity. Employers should provide hand sanitizer and masks for staff.",
        ),
        record(
            301,
            30,
            "School Guidance",
            "2020-08-01",
            "Schools must screen students daily. Guidance on quarantine for close contacts is provided below.",
        ),
        record(
            302,
            30,
            "School Guidance",
            "2021-01-10",
            "Updated guidance: schools may resume in-person instruction with distancing and masks.",
        ),
        record(
            401,
            40,
            "Vaccination Clinics",
            "2021-02-01",
            "Vaccination clinics operate by appointment. Bring identification. COVID-19 vaccine doses are free (no insurance needed).",
        ),
        record(
            501,
            50,
            "Travel Advisory",
            "2020-03-20",
            "Non-essential travel is discouraged. Travelers returning from abroad should self-quarantine for 14 days. GUIDANCE applies statewide.",
        ),
        record(
            402,
            40,
            "Vaccination Clinics",
            "2021-03-01",
            "Walk-in vaccination is now available at all clinics.",
        ),
    ]
}

/// Builds an engine over `records` with the default configuration.
pub fn engine_for(records: Vec<VersionRecord>) -> SearchEngine<InMemoryStore> {
    let config = EngineConfig::default();
    let store = InMemoryStore::from_records(records, &config.analysis)
        .unwrap_or_else(|e| panic!("Failed to build fixture store: {}", e));
    SearchEngine::new(store, config)
}

#[fixture]
pub fn engine(guidance_corpus: Vec<VersionRecord>) -> SearchEngine<InMemoryStore> {
    engine_for(guidance_corpus)
}

#[fixture]
pub fn shared_engine(guidance_corpus: Vec<VersionRecord>) -> SharedEngine {
    let config = EngineConfig::default();
    let store = InMemoryStore::from_records(guidance_corpus, &config.analysis)
        .unwrap_or_else(|e| panic!("Failed to build fixture store: {}", e));
    let store: Arc<dyn DocumentStore> = Arc::new(store);
    Arc::new(SearchEngine::new(store, config))
}

/// Document "D1" with two versions: "pandemic guidance" and "office guidance".
#[fixture]
pub fn d1_engine() -> SearchEngine<InMemoryStore> {
    engine_for(vec![
        record(1, 1, "D1", "2020-03-01", "pandemic guidance"),
        record(2, 1, "D1", "2020-06-01", "office guidance"),
    ])
}

/// Runs a query and collects every row, panicking on error.
#[allow(dead_code)] // Used across different integration test crates
pub fn collect<S: DocumentStore>(
    engine: &SearchEngine<S>,
    query: &SearchQuery,
    page: PageRequest,
) -> Vec<SearchResult> {
    engine
        .search(query, page)
        .unwrap_or_else(|e| panic!("Search {:?} failed: {}", query, e))
        .collect()
}

/// Distinct document ids in row order.
#[allow(dead_code)] // Used across different integration test crates
pub fn document_ids(rows: &[SearchResult]) -> Vec<i64> {
    let mut ids: Vec<i64> = rows.iter().map(|r| r.document_id.0).collect();
    ids.dedup();
    ids
}

/// A corpus file in a temporary directory, removed on drop.
#[allow(dead_code)] // Used across different integration test crates
pub struct TempCorpus {
    _temp: TempDir,
    root: PathBuf,
}

#[allow(dead_code)] // Used across different integration test crates
impl TempCorpus {
    /// Writes `records` to `corpus.json` in a fresh temporary directory.
    pub fn new(records: &[VersionRecord]) -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().to_path_buf();
        let json = serde_json::to_string_pretty(records).expect("Failed to encode corpus");
        std::fs::write(root.join("corpus.json"), json).expect("Failed to write corpus");
        Self { _temp: temp, root }
    }

    pub fn corpus_path(&self) -> PathBuf {
        self.root.join("corpus.json")
    }

    pub fn cache_path(&self) -> PathBuf {
        self.root.join("cache").join("indexes.bin")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
