//! In-process corpus store loaded from a JSON corpus file.

use crate::config::AnalysisConfig;
use crate::error::StoreError;
use crate::search::{Analyzer, LexicalIndex};
use crate::types::{DocumentVersion, VersionRecord};
use ahash::AHashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use super::cache::IndexCache;
use super::{Corpus, DocumentStore};

/// Reads a corpus file: a JSON array of version records.
pub fn read_records(path: &Path) -> Result<Vec<VersionRecord>, StoreError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// A store holding the whole corpus in memory.
///
/// Lexical indexes are built when records are loaded (optionally reusing an
/// on-disk [`IndexCache`]), and [`replace`](Self::replace) swaps in a new corpus
/// atomically. Invocations holding an older snapshot finish against it.
#[derive(Debug)]
pub struct InMemoryStore {
    corpus: RwLock<Arc<Corpus>>,
    analyzer: Analyzer,
    cache_path: Option<PathBuf>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            corpus: RwLock::new(Arc::new(Corpus::default())),
            analyzer: Analyzer::new(config.language),
            cache_path: None,
        }
    }

    /// Persists built indexes to `path` and reuses them on later loads.
    pub fn with_cache(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    /// Creates a store over the given records.
    pub fn from_records(
        records: Vec<VersionRecord>,
        config: &AnalysisConfig,
    ) -> Result<Self, StoreError> {
        let store = Self::new(config);
        store.replace(records)?;
        Ok(store)
    }

    /// Loads a corpus file, using an index cache when `cache_path` is given.
    pub fn load(
        path: &Path,
        config: &AnalysisConfig,
        cache_path: Option<&Path>,
    ) -> Result<Self, StoreError> {
        let records = read_records(path)?;
        let mut store = Self::new(config);
        if let Some(cache_path) = cache_path {
            store = store.with_cache(cache_path);
        }
        store.replace(records)?;

        tracing::info!(
            "Loaded {} versions of {} documents from {}",
            store.len(),
            store.document_count(),
            path.display()
        );
        Ok(store)
    }

    /// Replaces the corpus with `records`, rebuilding (or reusing cached) indexes.
    ///
    /// Fails without touching the current corpus if two records share a version id.
    pub fn replace(&self, records: Vec<VersionRecord>) -> Result<(), StoreError> {
        let mut seen = AHashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.id) {
                return Err(StoreError::DuplicateVersion(record.id));
            }
        }

        let versions = match &self.cache_path {
            Some(path) => {
                let mut cache = IndexCache::open(path, self.analyzer.language());
                let versions = index_records(records, |content| {
                    cache.get_or_build(content, &self.analyzer)
                });
                tracing::debug!(
                    hits = cache.hits(),
                    misses = cache.misses(),
                    "Lexical index cache lookups"
                );
                if let Err(e) = cache.save() {
                    tracing::warn!("Failed to write index cache to {}: {}", path.display(), e);
                }
                versions
            }
            None => index_records(records, |content| {
                LexicalIndex::build(content, &self.analyzer)
            }),
        };

        let corpus = Arc::new(Corpus::new(versions));
        let mut guard = self
            .corpus
            .write()
            .map_err(|_| StoreError::Unavailable("corpus lock poisoned".to_string()))?;
        *guard = corpus;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.snapshot().map_or(0, |corpus| corpus.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn document_count(&self) -> usize {
        self.snapshot().map_or(0, |corpus| corpus.document_count())
    }
}

fn index_records(
    records: Vec<VersionRecord>,
    mut build: impl FnMut(&str) -> LexicalIndex,
) -> Vec<DocumentVersion> {
    records
        .into_iter()
        .map(|record| DocumentVersion {
            index: build(&record.content),
            record,
        })
        .collect()
}

impl DocumentStore for InMemoryStore {
    fn snapshot(&self) -> Result<Arc<Corpus>, StoreError> {
        self.corpus
            .read()
            .map(|corpus| Arc::clone(&corpus))
            .map_err(|_| StoreError::Unavailable("corpus lock poisoned".to_string()))
    }
}
