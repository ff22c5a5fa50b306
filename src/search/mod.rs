//! Matching, ranking and pagination over versioned guidance documents.
//!
//! Four lexical modes run against the precomputed [`LexicalIndex`] of each version
//! and are scored with a length-normalized proximity rank. Two pattern modes run
//! literal or regular-expression matching over the raw content and score by
//! occurrence count.

pub(crate) mod deadline;
pub(crate) mod index;
pub(crate) mod mode;
pub(crate) mod paginate;
pub(crate) mod pattern;
pub(crate) mod query;
pub(crate) mod scoring;
pub(crate) mod tokenize;

// Public re-exports (used via lib.rs)
pub use deadline::Deadline;
pub use index::LexicalIndex;
pub use mode::{Family, SearchMode};
pub use paginate::{Page, window};

// Internal re-exports
pub(crate) use mode::{MatchStrategy, Matcher};
pub(crate) use scoring::{RankedDocument, rank_documents};
pub(crate) use tokenize::{Analyzer, Word};
