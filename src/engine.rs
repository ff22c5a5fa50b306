//! The search engine: resolves a query, ranks documents, windows a page and
//! streams version rows with headlines.

use crate::config::EngineConfig;
use crate::error::SearchError;
use crate::search::{
    Analyzer, Deadline, MatchStrategy, Matcher, Page, RankedDocument, rank_documents, window,
};
use crate::store::{Corpus, DocumentStore};
use crate::types::{DocumentId, MatchCount, PageRequest, SearchQuery, SearchResult};
use ahash::{AHashMap, AHashSet};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Ranked, paginated search over a [`DocumentStore`].
///
/// The engine holds only immutable configuration and the store handle, so one
/// instance can serve concurrent invocations. Each invocation reads a single
/// corpus snapshot.
#[derive(Debug)]
pub struct SearchEngine<S> {
    store: S,
    config: EngineConfig,
    analyzer: Arc<Analyzer>,
}

impl<S: DocumentStore> SearchEngine<S> {
    pub fn new(store: S, config: EngineConfig) -> Self {
        let analyzer = Arc::new(Analyzer::new(config.analysis.language));
        Self {
            store,
            config,
            analyzer,
        }
    }

    /// Runs a query and returns its rows for the requested page.
    ///
    /// Ranking and windowing happen eagerly; headlines are rendered lazily as the
    /// returned stream is consumed.
    pub fn search(
        &self,
        query: &SearchQuery,
        page: PageRequest,
    ) -> Result<ResultStream, SearchError> {
        self.search_with_cancel(query, page, CancellationToken::new())
    }

    /// Like [`search`](Self::search), aborting with [`SearchError::Cancelled`] once
    /// `cancel` fires. Cancelling after this returns ends the stream early.
    pub fn search_with_cancel(
        &self,
        query: &SearchQuery,
        page: PageRequest,
        cancel: CancellationToken,
    ) -> Result<ResultStream, SearchError> {
        let started = Instant::now();
        let deadline = Deadline::new(self.config.pattern.timeout(), cancel);
        let matcher = Matcher::resolve(query, &self.analyzer, &self.config, &deadline)?;
        let page = Page::from_request(page)?;

        let corpus = self.store.snapshot()?;
        let ranking = rank(&corpus, &matcher, &deadline)?;
        let selected = window(&ranking.documents, page);

        let mut rows = Vec::with_capacity(selected.iter().map(|doc| doc.matching_versions).sum());
        for doc in selected {
            if let Some(offsets) = ranking.versions.get(&doc.document_id) {
                rows.extend_from_slice(offsets);
            }
        }

        tracing::debug!(
            query = %query.text,
            mode = %query.mode,
            family = ?matcher.family(),
            ranked_documents = ranking.documents.len(),
            page_documents = selected.len(),
            rows = rows.len(),
            elapsed = ?started.elapsed(),
            "Search ranked"
        );

        Ok(ResultStream {
            total_documents: ranking.documents.len(),
            page_documents: selected.len(),
            corpus,
            matcher,
            rows: rows.into_iter(),
            deadline,
        })
    }

    /// Counts matching documents and versions without rendering headlines.
    pub fn search_count(&self, query: &SearchQuery) -> Result<MatchCount, SearchError> {
        self.search_count_with_cancel(query, CancellationToken::new())
    }

    pub fn search_count_with_cancel(
        &self,
        query: &SearchQuery,
        cancel: CancellationToken,
    ) -> Result<MatchCount, SearchError> {
        let started = Instant::now();
        let deadline = Deadline::new(self.config.pattern.timeout(), cancel);
        let matcher = Matcher::resolve(query, &self.analyzer, &self.config, &deadline)?;
        let corpus = self.store.snapshot()?;

        let mut documents = AHashSet::new();
        let mut num_document_versions = 0;
        for version in corpus.versions() {
            deadline.check()?;
            if matcher.matches(version, &deadline)? {
                num_document_versions += 1;
                documents.insert(version.record.document_id);
            }
        }

        let count = MatchCount {
            num_documents: documents.len(),
            num_document_versions,
        };
        tracing::debug!(
            query = %query.text,
            mode = %query.mode,
            num_documents = count.num_documents,
            num_document_versions = count.num_document_versions,
            elapsed = ?started.elapsed(),
            "Search counted"
        );
        Ok(count)
    }
}

/// Ranked documents plus, per document, the corpus offsets of its matching versions.
struct Ranking {
    documents: Vec<RankedDocument>,
    versions: AHashMap<DocumentId, Vec<usize>>,
}

fn rank(corpus: &Corpus, matcher: &Matcher, deadline: &Deadline) -> Result<Ranking, SearchError> {
    let mut scores = vec![];
    let mut versions: AHashMap<DocumentId, Vec<usize>> = AHashMap::new();

    for (offset, version) in corpus.versions().iter().enumerate() {
        deadline.check()?;
        if let Some(score) = matcher.score(version, deadline)? {
            let document_id = version.record.document_id;
            scores.push((document_id, score));
            // Corpus order is already effective date ascending within a document
            versions.entry(document_id).or_default().push(offset);
        }
    }

    Ok(Ranking {
        documents: rank_documents(scores),
        versions,
    })
}

/// A lazy, one-shot sequence of result rows in ranked-document order.
///
/// Within a document, rows follow effective date ascending. The stream keeps the
/// corpus snapshot it was ranked against alive until dropped. A headline that
/// cannot be produced degrades to an empty string for that row; cancellation ends
/// the stream.
#[derive(Debug)]
pub struct ResultStream {
    corpus: Arc<Corpus>,
    matcher: Matcher,
    rows: std::vec::IntoIter<usize>,
    deadline: Deadline,
    total_documents: usize,
    page_documents: usize,
}

impl ResultStream {
    /// Documents matching the query across all pages.
    pub fn total_documents(&self) -> usize {
        self.total_documents
    }

    /// Documents selected for this page.
    pub fn page_documents(&self) -> usize {
        self.page_documents
    }

    /// Stops the stream; no further rows are produced.
    pub fn cancel(&self) {
        self.deadline.cancel();
    }
}

impl Iterator for ResultStream {
    type Item = SearchResult;

    fn next(&mut self) -> Option<Self::Item> {
        if self.deadline.is_cancelled() {
            return None;
        }

        let version = self.corpus.versions().get(self.rows.next()?)?;
        let record = &version.record;

        // Each headline gets its own budget; the stream may be consumed slowly
        let headline = match self
            .matcher
            .headline(&record.content, &self.deadline.restart())
        {
            Ok(headline) => headline,
            Err(SearchError::Cancelled) => return None,
            Err(e) => {
                tracing::warn!(
                    version = %record.id,
                    document = %record.document_id,
                    "Headline generation failed, using empty headline: {}",
                    e
                );
                String::new()
            }
        };

        Some(SearchResult {
            id: record.id,
            title: record.title.clone(),
            slug: record.slug.clone(),
            document_id: record.document_id,
            effective_date: record.effective_date,
            termination_date: record.termination_date,
            headline,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.rows.size_hint().1)
    }
}
