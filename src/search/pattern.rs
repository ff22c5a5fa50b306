//! Literal and regular-expression matching against raw version text.

use crate::config::PatternConfig;
use crate::error::SearchError;
use regex::{Regex, RegexBuilder};
use std::ops::Range;

use super::deadline::{CHECK_INTERVAL, Deadline};

/// A compiled `string` or `regex` mode pattern.
#[derive(Debug, Clone)]
pub(crate) struct PatternMatcher {
    regex: Regex,
}

impl PatternMatcher {
    /// Compiles a pattern, escaping it first when `literal` is set.
    ///
    /// The compiled program and lazy DFA are capped by the configured size limits,
    /// and patterns that can match the empty string are rejected since they would
    /// match every version at every offset.
    pub(crate) fn compile(
        text: &str,
        literal: bool,
        case_sensitive: bool,
        config: &PatternConfig,
        deadline: &Deadline,
    ) -> Result<Self, SearchError> {
        let pattern = if literal {
            regex::escape(text)
        } else {
            text.to_string()
        };

        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(!case_sensitive)
            .size_limit(config.size_limit)
            .dfa_size_limit(config.dfa_size_limit)
            .build()
            .map_err(|e| {
                let reason = match e {
                    regex::Error::CompiledTooBig(limit) => {
                        format!("compiled pattern exceeds the size limit of {} bytes", limit)
                    }
                    other => other.to_string(),
                };
                SearchError::InvalidPattern {
                    pattern: text.to_string(),
                    reason,
                }
            })?;

        deadline.check()?;

        if regex.is_match("") {
            return Err(SearchError::InvalidPattern {
                pattern: text.to_string(),
                reason: "pattern matches the empty string".to_string(),
            });
        }

        Ok(Self { regex })
    }

    pub(crate) fn is_match(&self, body: &str) -> bool {
        self.regex.is_match(body)
    }

    /// Number of non-overlapping occurrences in `body`.
    pub(crate) fn count(&self, body: &str, deadline: &Deadline) -> Result<usize, SearchError> {
        let mut count = 0;
        for _ in self.regex.find_iter(body) {
            count += 1;
            if count % CHECK_INTERVAL == 0 {
                deadline.check()?;
            }
        }
        Ok(count)
    }

    /// Byte spans of non-overlapping occurrences in `body`, in order.
    pub(crate) fn spans(
        &self,
        body: &str,
        deadline: &Deadline,
    ) -> Result<Vec<Range<usize>>, SearchError> {
        let mut spans = vec![];
        for m in self.regex.find_iter(body) {
            spans.push(m.range());
            if spans.len() % CHECK_INTERVAL == 0 {
                deadline.check()?;
            }
        }
        Ok(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use rstest::rstest;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    fn deadline() -> Deadline {
        Deadline::new(Duration::from_secs(60), CancellationToken::new())
    }

    fn compile(text: &str, literal: bool, case_sensitive: bool) -> Result<PatternMatcher, SearchError> {
        PatternMatcher::compile(text, literal, case_sensitive, &PatternConfig::default(), &deadline())
    }

    #[rstest]
    #[case("gui.*nce", false, false, "Guidance", true)]
    #[case("gui.*nce", false, false, "guinonce", true)]
    #[case("gui.*nce", false, true, "Guidance", false)]
    #[case("a.b", true, false, "axb", false)]
    #[case("a.b", true, false, "A.B", true)]
    #[case("a.b", true, true, "A.B", false)]
    #[case("(c)", true, false, "see (c) below", true)]
    fn test_matching(
        #[case] pattern: &str,
        #[case] literal: bool,
        #[case] case_sensitive: bool,
        #[case] body: &str,
        #[case] expected: bool,
    ) {
        let matcher = compile(pattern, literal, case_sensitive).unwrap();
        check!(matcher.is_match(body) == expected);
    }

    #[rstest]
    #[case("(unclosed")]
    #[case("[z-a]")]
    #[case(".*")]
    #[case("x*")]
    #[case("^")]
    fn test_rejected_patterns(#[case] pattern: &str) {
        let_assert!(Err(SearchError::InvalidPattern { .. }) = compile(pattern, false, false));
    }

    #[test]
    fn test_size_limit_rejects_huge_programs() {
        let config = PatternConfig {
            size_limit: 1024,
            ..PatternConfig::default()
        };
        let result = PatternMatcher::compile(r"\w{500}", false, false, &config, &deadline());
        let_assert!(Err(SearchError::InvalidPattern { reason, .. }) = result);
        check!(reason.contains("size limit"));
    }

    #[test]
    fn test_count_and_spans_are_non_overlapping() {
        let matcher = compile("aa", true, false).unwrap();
        check!(matcher.count("aaaaa", &deadline()).unwrap() == 2);
        check!(matcher.spans("aaaaa", &deadline()).unwrap() == vec![0..2, 2..4]);
    }

    #[test]
    fn test_cancelled_scan_stops() {
        let token = CancellationToken::new();
        let deadline = Deadline::new(Duration::from_secs(60), token.clone());
        token.cancel();
        let matcher = compile("a", true, false).unwrap();
        let body = "a".repeat(CHECK_INTERVAL * 2);
        let_assert!(Err(SearchError::Cancelled) = matcher.count(&body, &deadline));
    }
}
