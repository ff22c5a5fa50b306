//! Per-version positional lexical index.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::tokenize::Analyzer;

/// A precomputed lexeme -> positions map for one document version.
///
/// Built once by the store whenever a version's text changes and never mutated
/// during search. Positions are zero-based word offsets and count stop words.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexicalIndex {
    /// Map from lexeme to its sorted positions
    terms: HashMap<String, Vec<u32>>,
    /// Total number of indexed lexeme occurrences
    length: u32,
}

impl LexicalIndex {
    /// Builds the index for a text body.
    pub(crate) fn build(text: &str, analyzer: &Analyzer) -> Self {
        let mut grouped: AHashMap<String, Vec<u32>> = AHashMap::new();
        let mut length = 0;

        for (position, lexeme) in analyzer.lexemes(text) {
            grouped.entry(lexeme).or_default().push(position);
            length += 1;
        }

        // Positions arrive in text order, so every list is already sorted
        Self {
            terms: grouped.into_iter().collect(),
            length,
        }
    }

    /// Positions of an exact lexeme.
    pub fn positions(&self, lexeme: &str) -> &[u32] {
        self.terms.get(lexeme).map_or(&[], Vec::as_slice)
    }

    /// Positions of every lexeme starting with `prefix`, merged and sorted.
    pub fn prefix_positions(&self, prefix: &str) -> Vec<u32> {
        let mut merged: Vec<u32> = self
            .terms
            .iter()
            .filter(|(lexeme, _)| lexeme.starts_with(prefix))
            .flat_map(|(_, positions)| positions.iter().copied())
            .collect();
        merged.sort_unstable();
        merged
    }

    pub fn contains(&self, lexeme: &str) -> bool {
        self.terms.contains_key(lexeme)
    }

    pub fn contains_prefix(&self, prefix: &str) -> bool {
        self.terms.keys().any(|lexeme| lexeme.starts_with(prefix))
    }

    /// Total lexeme occurrences (document length).
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Number of distinct lexemes.
    pub fn unique_terms(&self) -> usize {
        self.terms.len()
    }
}
