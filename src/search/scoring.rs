//! Relevance scoring and document ranking.
//!
//! Lexical versions are scored with a positional rank compatible with PostgreSQL's
//! `ts_rank` (all positions carry the default `D` weight). Pattern versions are
//! scored by occurrence count. Documents are ranked by the arithmetic mean of their
//! matching versions' scores.

use crate::config::RankingConfig;
use crate::types::DocumentId;
use ahash::AHashMap;
use std::cmp::Ordering;

use super::index::LexicalIndex;
use super::query::LexicalQuery;

/// Weight of an unlabelled position.
const DEFAULT_WEIGHT: f64 = 0.1;

/// Limit of sum(1/i^2) for i = 1..inf, i.e. pi^2 / 6.
const HARMONIC_LIMIT: f64 = 1.644_934_066_85;

/// Floor reported for matching documents with no measurable proximity.
const MIN_RANK: f64 = 1e-20;

/// Proximity contribution of two positions `distance` words apart.
fn word_distance(distance: u32) -> f64 {
    if distance > 100 {
        return 1e-30;
    }
    1.0 / (1.005 + 0.05 * (f64::from(distance) / 1.5 - 2.0).exp())
}

/// Scores a lexical index against a query. Callers check membership first.
pub(crate) fn lexical_rank(query: &LexicalQuery, index: &LexicalIndex, ranking: &RankingConfig) -> f64 {
    let positions: Vec<Vec<u32>> = query
        .positive_terms()
        .iter()
        .map(|term| term.positions(index))
        .collect();

    let mut rank = if query.is_conjunctive() && positions.len() >= 2 {
        rank_and(&positions)
    } else {
        rank_or(&positions)
    };

    if rank < 0.0 {
        rank = MIN_RANK;
    }

    normalize(rank, index, ranking.normalization)
}

/// Pairwise proximity between every two query terms.
fn rank_and(positions: &[Vec<u32>]) -> f64 {
    let mut rank = -1.0_f64;

    for i in 1..positions.len() {
        for k in 0..i {
            for &l in &positions[i] {
                for &p in &positions[k] {
                    let distance = l.abs_diff(p);
                    if distance == 0 {
                        continue;
                    }
                    let weight =
                        (DEFAULT_WEIGHT * DEFAULT_WEIGHT * word_distance(distance)).sqrt();
                    rank = if rank < 0.0 {
                        weight
                    } else {
                        1.0 - (1.0 - rank) * (1.0 - weight)
                    };
                }
            }
        }
    }

    rank
}

/// Per-term harmonic sum over occurrences, averaged across terms.
fn rank_or(positions: &[Vec<u32>]) -> f64 {
    if positions.is_empty() {
        return 0.0;
    }

    let mut rank = 0.0;
    for term_positions in positions.iter().filter(|p| !p.is_empty()) {
        let harmonic: f64 = (1..=term_positions.len())
            .map(|j| DEFAULT_WEIGHT / (j * j) as f64)
            .sum();
        rank += harmonic / HARMONIC_LIMIT;
    }

    rank / positions.len() as f64
}

fn normalize(mut rank: f64, index: &LexicalIndex, flags: u32) -> f64 {
    let length = f64::from(index.length());
    let unique = index.unique_terms() as f64;

    if flags & RankingConfig::LOG_LENGTH != 0 && unique > 0.0 {
        rank /= (length + 1.0).log2();
    }
    if flags & RankingConfig::LENGTH != 0 && length > 0.0 {
        rank /= length;
    }
    if flags & RankingConfig::UNIQUE_WORDS != 0 && unique > 0.0 {
        rank /= unique;
    }
    if flags & RankingConfig::LOG_UNIQUE_WORDS != 0 && unique > 0.0 {
        rank /= (unique + 1.0).log2();
    }
    if flags & RankingConfig::RANK_PLUS_ONE != 0 {
        rank /= rank + 1.0;
    }

    rank
}

/// A document's aggregate score over its matching versions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RankedDocument {
    pub(crate) document_id: DocumentId,
    pub(crate) score: f64,
    pub(crate) matching_versions: usize,
}

/// Aggregates per-version scores into a total document order.
///
/// Only scored (matching) versions are passed in, so a document never appears
/// unless at least one of its versions matched. Documents are ordered by mean
/// score descending, ties broken by document id ascending.
pub(crate) fn rank_documents(
    version_scores: impl IntoIterator<Item = (DocumentId, f64)>,
) -> Vec<RankedDocument> {
    let mut totals: AHashMap<DocumentId, (f64, usize)> = AHashMap::new();
    for (document_id, score) in version_scores {
        let entry = totals.entry(document_id).or_insert((0.0, 0));
        entry.0 += score;
        entry.1 += 1;
    }

    let mut ranked: Vec<RankedDocument> = totals
        .into_iter()
        .map(|(document_id, (sum, count))| RankedDocument {
            document_id,
            score: sum / count as f64,
            matching_versions: count,
        })
        .collect();

    ranked.sort_by(compare_ranked);
    ranked
}

fn compare_ranked(a: &RankedDocument, b: &RankedDocument) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.document_id.cmp(&b.document_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Language;
    use crate::search::tokenize::Analyzer;
    use assert2::check;

    fn analyzer() -> Analyzer {
        Analyzer::new(Language::English)
    }

    fn rank(query: &LexicalQuery, text: &str, normalization: u32) -> f64 {
        let index = LexicalIndex::build(text, &analyzer());
        lexical_rank(query, &index, &RankingConfig { normalization })
    }

    #[test]
    fn test_word_distance_decays() {
        check!(word_distance(1) > word_distance(2));
        check!(word_distance(2) > word_distance(10));
        check!(word_distance(101) == 1e-30);
    }

    #[test]
    fn test_more_occurrences_rank_higher() {
        let query = LexicalQuery::plain("guidance", &analyzer());
        let once = rank(&query, "guidance issued today", 0);
        let thrice = rank(&query, "guidance guidance guidance", 0);
        check!(thrice > once);
        check!(once > 0.0);
    }

    #[test]
    fn test_single_term_rank_matches_known_value() {
        let query = LexicalQuery::plain("guidance", &analyzer());
        let score = rank(&query, "guidance", 0);
        check!((score - 0.1 / HARMONIC_LIMIT).abs() < 1e-9);
    }

    #[test]
    fn test_proximity_rewards_close_terms() {
        let query = LexicalQuery::plain("wash hands", &analyzer());
        let close = rank(&query, "wash hands", 0);
        let far = rank(
            &query,
            "wash often and carefully with plenty of soap and warm running water your hands",
            0,
        );
        check!(close > far);
    }

    #[test]
    fn test_log_length_normalization_penalizes_long_bodies() {
        let query = LexicalQuery::plain("guidance", &analyzer());
        let short = rank(&query, "guidance memo", RankingConfig::LOG_LENGTH);
        let long = rank(
            &query,
            "guidance memo covering schools offices transit venues",
            RankingConfig::LOG_LENGTH,
        );
        check!(short > long);
    }

    #[test]
    fn test_rank_plus_one_bounded() {
        let query = LexicalQuery::plain("guidance", &analyzer());
        let score = rank(&query, "guidance guidance", RankingConfig::RANK_PLUS_ONE);
        check!(score > 0.0);
        check!(score < 1.0);
    }

    #[test]
    fn test_rank_documents_orders_by_mean_then_id() {
        let ranked = rank_documents([
            (DocumentId(3), 1.0),
            (DocumentId(1), 4.0),
            (DocumentId(1), 2.0),
            (DocumentId(2), 3.0),
            (DocumentId(5), 1.0),
        ]);

        let order: Vec<i64> = ranked.iter().map(|d| d.document_id.0).collect();
        check!(order == vec![1, 2, 3, 5]);
        check!(ranked[0].score == 3.0);
        check!(ranked[0].matching_versions == 2);
    }

    #[test]
    fn test_rank_documents_is_deterministic() {
        let scores: Vec<(DocumentId, f64)> =
            (0..50).map(|i| (DocumentId(i % 7), f64::from(i as u8 % 3))).collect();
        let first = rank_documents(scores.clone());
        let second = rank_documents(scores);
        check!(first == second);
    }
}
