//! Mode resolution: maps a requested mode to a lexical or pattern matching strategy.

use crate::config::{EngineConfig, HeadlineConfig, RankingConfig};
use crate::error::SearchError;
use crate::headline;
use crate::types::{DocumentVersion, SearchQuery};
use rapidfuzz::distance::jaro_winkler;
use rmcp::schemars;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use std::sync::Arc;

use super::deadline::Deadline;
use super::pattern::PatternMatcher;
use super::query::{LexicalQuery, QueryTerm};
use super::scoring::lexical_rank;
use super::tokenize::Analyzer;

/// Minimum similarity for suggesting a mode name on a typo.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// The six recognized search modes.
///
/// DO NOT add doc comments to individual variants - this causes schemars to generate
/// `oneOf` schemas instead of simple `enum` arrays, breaking MCP client enum handling.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Phrase,
    #[default]
    Simple,
    Plain,
    Normal,
    String,
    Regex,
}

/// The two matching paradigms behind the six modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// Ranked full-text matching against the precomputed lexical index.
    Lexical,
    /// Literal or regular-expression matching against the raw body.
    Pattern,
}

impl SearchMode {
    pub const ALL: [Self; 6] = [
        Self::Phrase,
        Self::Simple,
        Self::Plain,
        Self::Normal,
        Self::String,
        Self::Regex,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Phrase => "phrase",
            Self::Simple => "simple",
            Self::Plain => "plain",
            Self::Normal => "normal",
            Self::String => "string",
            Self::Regex => "regex",
        }
    }

    pub const fn family(self) -> Family {
        match self {
            Self::Phrase | Self::Simple | Self::Plain | Self::Normal => Family::Lexical,
            Self::String | Self::Regex => Family::Pattern,
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        if let Some(mode) = Self::ALL.into_iter().find(|m| m.as_str() == normalized) {
            return Ok(mode);
        }

        let suggestion = Self::ALL
            .into_iter()
            .map(|m| {
                let score = jaro_winkler::similarity(normalized.chars(), m.as_str().chars());
                (m, score)
            })
            .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(m, _)| m.as_str());

        Err(SearchError::InvalidSearchMode {
            mode: s.to_string(),
            suggestion,
        })
    }
}

/// The strategy contract shared by both families.
pub(crate) trait MatchStrategy {
    fn family(&self) -> Family;

    /// Whether the version satisfies the query, without scoring.
    fn matches(&self, version: &DocumentVersion, deadline: &Deadline) -> Result<bool, SearchError>;

    /// Relevance of a version, or `None` when it does not match.
    fn score(
        &self,
        version: &DocumentVersion,
        deadline: &Deadline,
    ) -> Result<Option<f64>, SearchError>;

    /// Byte spans of the matches within a body, in document order.
    fn find_matches(&self, body: &str, deadline: &Deadline)
    -> Result<Vec<Range<usize>>, SearchError>;

    /// Highlighted headline for a body.
    fn headline(&self, body: &str, deadline: &Deadline) -> Result<String, SearchError>;
}

/// Full-text strategy for `phrase`, `simple`, `plain` and `normal`.
#[derive(Debug)]
pub(crate) struct LexicalStrategy {
    query: LexicalQuery,
    terms: Vec<QueryTerm>,
    analyzer: Arc<Analyzer>,
    ranking: RankingConfig,
    headline: HeadlineConfig,
}

impl LexicalStrategy {
    fn is_hit(&self, lexeme: Option<&str>) -> bool {
        lexeme.is_some_and(|lexeme| self.terms.iter().any(|t| t.matches_lexeme(lexeme)))
    }
}

impl MatchStrategy for LexicalStrategy {
    fn family(&self) -> Family {
        Family::Lexical
    }

    fn matches(&self, version: &DocumentVersion, _: &Deadline) -> Result<bool, SearchError> {
        Ok(self.query.matches(&version.index))
    }

    fn score(
        &self,
        version: &DocumentVersion,
        _: &Deadline,
    ) -> Result<Option<f64>, SearchError> {
        if !self.query.matches(&version.index) {
            return Ok(None);
        }
        Ok(Some(lexical_rank(&self.query, &version.index, &self.ranking)))
    }

    fn find_matches(
        &self,
        body: &str,
        _: &Deadline,
    ) -> Result<Vec<Range<usize>>, SearchError> {
        Ok(self
            .analyzer
            .words(body)
            .into_iter()
            .filter(|word| self.is_hit(word.lexeme.as_deref()))
            .map(|word| word.start..word.end)
            .collect())
    }

    fn headline(&self, body: &str, deadline: &Deadline) -> Result<String, SearchError> {
        deadline.check()?;
        let words = self.analyzer.words(body);
        Ok(headline::lexical_headline(
            body,
            &words,
            |word| self.is_hit(word.lexeme.as_deref()),
            &self.headline,
        ))
    }
}

/// Raw-text strategy for `string` and `regex`.
#[derive(Debug)]
pub(crate) struct PatternStrategy {
    matcher: PatternMatcher,
    context_words: usize,
    headline: HeadlineConfig,
}

impl MatchStrategy for PatternStrategy {
    fn family(&self) -> Family {
        Family::Pattern
    }

    fn matches(&self, version: &DocumentVersion, deadline: &Deadline) -> Result<bool, SearchError> {
        deadline.check()?;
        Ok(self.matcher.is_match(&version.record.content))
    }

    fn score(
        &self,
        version: &DocumentVersion,
        deadline: &Deadline,
    ) -> Result<Option<f64>, SearchError> {
        deadline.check()?;
        let count = self.matcher.count(&version.record.content, deadline)?;
        Ok((count > 0).then_some(count as f64))
    }

    fn find_matches(
        &self,
        body: &str,
        deadline: &Deadline,
    ) -> Result<Vec<Range<usize>>, SearchError> {
        self.matcher.spans(body, deadline)
    }

    fn headline(&self, body: &str, deadline: &Deadline) -> Result<String, SearchError> {
        let spans = self.find_matches(body, deadline)?;
        Ok(headline::pattern_headline(
            body,
            &spans,
            self.context_words,
            &self.headline,
        ))
    }
}

/// A resolved strategy, dispatched by family.
#[derive(Debug)]
pub(crate) enum Matcher {
    Lexical(LexicalStrategy),
    Pattern(PatternStrategy),
}

impl Matcher {
    /// Resolves a query into a compiled matcher.
    ///
    /// Fails with [`SearchError::EmptyQuery`] for blank input, [`SearchError::InvalidQuery`]
    /// for malformed `normal` syntax and [`SearchError::InvalidPattern`] for patterns that
    /// do not compile.
    pub(crate) fn resolve(
        query: &SearchQuery,
        analyzer: &Arc<Analyzer>,
        config: &EngineConfig,
        deadline: &Deadline,
    ) -> Result<Self, SearchError> {
        if query.text.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let text = query.text.as_str();
        let lexical = |parsed: LexicalQuery| {
            Self::Lexical(LexicalStrategy {
                terms: parsed.positive_terms(),
                query: parsed,
                analyzer: Arc::clone(analyzer),
                ranking: config.ranking.clone(),
                headline: config.headline.clone(),
            })
        };
        let pattern = |literal: bool| {
            PatternMatcher::compile(
                text,
                literal,
                query.case_sensitive,
                &config.pattern,
                deadline,
            )
            .map(|matcher| {
                Self::Pattern(PatternStrategy {
                    matcher,
                    context_words: config.pattern.context_words,
                    headline: config.headline.clone(),
                })
            })
        };

        let matcher = match query.mode {
            SearchMode::Plain => lexical(LexicalQuery::plain(text, analyzer)),
            SearchMode::Phrase => lexical(LexicalQuery::phrase(text, analyzer)),
            SearchMode::Simple => lexical(LexicalQuery::web(text, analyzer)),
            SearchMode::Normal => lexical(LexicalQuery::normal(text, analyzer)?),
            SearchMode::String => pattern(true)?,
            SearchMode::Regex => pattern(false)?,
        };

        if let Self::Lexical(strategy) = &matcher
            && strategy.query.is_empty()
        {
            tracing::debug!(query = text, mode = %query.mode, "Query reduced to stop words only");
        }

        Ok(matcher)
    }

    fn strategy(&self) -> &dyn MatchStrategy {
        match self {
            Self::Lexical(strategy) => strategy,
            Self::Pattern(strategy) => strategy,
        }
    }
}

impl MatchStrategy for Matcher {
    fn family(&self) -> Family {
        self.strategy().family()
    }

    fn matches(&self, version: &DocumentVersion, deadline: &Deadline) -> Result<bool, SearchError> {
        self.strategy().matches(version, deadline)
    }

    fn score(
        &self,
        version: &DocumentVersion,
        deadline: &Deadline,
    ) -> Result<Option<f64>, SearchError> {
        self.strategy().score(version, deadline)
    }

    fn find_matches(
        &self,
        body: &str,
        deadline: &Deadline,
    ) -> Result<Vec<Range<usize>>, SearchError> {
        self.strategy().find_matches(body, deadline)
    }

    fn headline(&self, body: &str, deadline: &Deadline) -> Result<String, SearchError> {
        self.strategy().headline(body, deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Language;
    use crate::search::LexicalIndex;
    use crate::types::{DocumentId, VersionId, VersionRecord};
    use assert2::{check, let_assert};
    use chrono::NaiveDate;
    use rstest::rstest;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    fn deadline() -> Deadline {
        Deadline::new(Duration::from_secs(60), CancellationToken::new())
    }

    fn resolve(text: &str, mode: SearchMode, case_sensitive: bool) -> Result<Matcher, SearchError> {
        let analyzer = Arc::new(Analyzer::new(Language::English));
        let query = SearchQuery::new(text, mode).case_sensitive(case_sensitive);
        Matcher::resolve(&query, &analyzer, &EngineConfig::default(), &deadline())
    }

    fn version(content: &str) -> DocumentVersion {
        let analyzer = Analyzer::new(Language::English);
        DocumentVersion {
            index: LexicalIndex::build(content, &analyzer),
            record: VersionRecord {
                id: VersionId(1),
                document_id: DocumentId(1),
                title: "Title".to_string(),
                slug: "title".to_string(),
                effective_date: NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
                termination_date: None,
                content: content.to_string(),
            },
        }
    }

    #[rstest]
    #[case("phrase", SearchMode::Phrase)]
    #[case("simple", SearchMode::Simple)]
    #[case("PLAIN", SearchMode::Plain)]
    #[case(" normal ", SearchMode::Normal)]
    #[case("string", SearchMode::String)]
    #[case("regex", SearchMode::Regex)]
    fn test_parse_modes(#[case] input: &str, #[case] expected: SearchMode) {
        check!(input.parse::<SearchMode>().unwrap() == expected);
    }

    #[rstest]
    #[case("regx", Some("regex"))]
    #[case("phrse", Some("phrase"))]
    #[case("fuzzy", None)]
    fn test_invalid_mode_suggestions(#[case] input: &str, #[case] expected: Option<&str>) {
        let_assert!(Err(SearchError::InvalidSearchMode { mode, suggestion }) = input.parse::<SearchMode>());
        check!(mode == input);
        check!(suggestion == expected);
    }

    #[test]
    fn test_default_mode_is_simple() {
        check!(SearchMode::default() == SearchMode::Simple);
    }

    #[rstest]
    #[case(SearchMode::Phrase, Family::Lexical)]
    #[case(SearchMode::Simple, Family::Lexical)]
    #[case(SearchMode::Plain, Family::Lexical)]
    #[case(SearchMode::Normal, Family::Lexical)]
    #[case(SearchMode::String, Family::Pattern)]
    #[case(SearchMode::Regex, Family::Pattern)]
    fn test_families(#[case] mode: SearchMode, #[case] family: Family) {
        check!(mode.family() == family);
        check!(resolve("guidance", mode, false).unwrap().family() == family);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\t\n")]
    fn test_empty_query_rejected(#[case] text: &str) {
        for mode in SearchMode::ALL {
            let_assert!(Err(SearchError::EmptyQuery) = resolve(text, mode, false));
        }
    }

    #[test]
    fn test_malformed_regex_surfaces() {
        let_assert!(Err(SearchError::InvalidPattern { .. }) = resolve("gui(dance", SearchMode::Regex, false));
        // The same text is a literal in string mode
        check!(resolve("gui(dance", SearchMode::String, false).is_ok());
    }

    #[test]
    fn test_lexical_ignores_case_sensitivity() {
        let doc = version("Office GUIDANCE update");
        let matcher = resolve("guidance", SearchMode::Simple, true).unwrap();
        check!(matcher.matches(&doc, &deadline()).unwrap());
    }

    #[test]
    fn test_pattern_score_is_occurrence_count() {
        let doc = version("mask, Mask, MASK and a glove");
        let matcher = resolve("mask", SearchMode::String, false).unwrap();
        check!(matcher.score(&doc, &deadline()).unwrap() == Some(3.0));

        let matcher = resolve("mask", SearchMode::String, true).unwrap();
        check!(matcher.score(&doc, &deadline()).unwrap() == Some(1.0));

        let matcher = resolve("respirator", SearchMode::String, false).unwrap();
        check!(matcher.score(&doc, &deadline()).unwrap().is_none());
    }

    #[test]
    fn test_lexical_find_matches_locates_stemmed_words() {
        let body = "Masks are masking nothing";
        let matcher = resolve("mask", SearchMode::Plain, false).unwrap();
        let spans = matcher.find_matches(body, &deadline()).unwrap();
        let found: Vec<&str> = spans.into_iter().map(|r| &body[r]).collect();
        check!(found == vec!["Masks", "masking"]);
    }

    #[test]
    fn test_stop_word_query_matches_nothing() {
        let doc = version("the and of");
        let matcher = resolve("the", SearchMode::Plain, false).unwrap();
        check!(!matcher.matches(&doc, &deadline()).unwrap());
        check!(matcher.score(&doc, &deadline()).unwrap().is_none());
    }
}
