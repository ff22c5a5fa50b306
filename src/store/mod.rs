//! Document store seam: the engine's read path into the versioned corpus.

mod cache;
mod memory;

pub use cache::{IndexCache, content_hash};
pub use memory::{InMemoryStore, read_records};

use crate::error::StoreError;
use crate::types::DocumentVersion;
use std::fmt;
use std::sync::Arc;

/// A source of immutable corpus snapshots.
///
/// The engine takes one snapshot per invocation and never writes through it, so
/// a store may swap its contents at any time without coordinating with readers.
pub trait DocumentStore: fmt::Debug + Send + Sync {
    fn snapshot(&self) -> Result<Arc<Corpus>, StoreError>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for Arc<S> {
    fn snapshot(&self) -> Result<Arc<Corpus>, StoreError> {
        (**self).snapshot()
    }
}

/// An immutable set of document versions with their lexical indexes.
///
/// Versions are kept grouped by document and, within a document, ordered by
/// effective date then version id.
#[derive(Debug, Default)]
pub struct Corpus {
    versions: Vec<DocumentVersion>,
}

impl Corpus {
    pub fn new(mut versions: Vec<DocumentVersion>) -> Self {
        versions.sort_by(|a, b| {
            let (a, b) = (&a.record, &b.record);
            a.document_id
                .cmp(&b.document_id)
                .then(a.effective_date.cmp(&b.effective_date))
                .then(a.id.cmp(&b.id))
        });
        Self { versions }
    }

    pub fn versions(&self) -> &[DocumentVersion] {
        &self.versions
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn document_count(&self) -> usize {
        self.versions
            .chunk_by(|a, b| a.record.document_id == b.record.document_id)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::LexicalIndex;
    use crate::types::{DocumentId, VersionId, VersionRecord};
    use assert2::check;
    use chrono::NaiveDate;

    fn version(id: i64, document_id: i64, date: (i32, u32, u32)) -> DocumentVersion {
        DocumentVersion {
            record: VersionRecord {
                id: VersionId(id),
                document_id: DocumentId(document_id),
                title: format!("Document {}", document_id),
                slug: format!("document-{}", document_id),
                effective_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
                termination_date: None,
                content: String::new(),
            },
            index: LexicalIndex::default(),
        }
    }

    #[test]
    fn test_versions_grouped_and_dated() {
        let corpus = Corpus::new(vec![
            version(5, 2, (2021, 1, 1)),
            version(3, 1, (2020, 6, 1)),
            version(4, 2, (2020, 1, 1)),
            version(1, 1, (2020, 6, 1)),
        ]);

        let ids: Vec<i64> = corpus.versions().iter().map(|v| v.record.id.0).collect();
        check!(ids == vec![1, 3, 4, 5]);
        check!(corpus.document_count() == 2);
        check!(corpus.len() == 4);
    }

    #[test]
    fn test_empty_corpus() {
        let corpus = Corpus::default();
        check!(corpus.is_empty());
        check!(corpus.document_count() == 0);
    }
}
