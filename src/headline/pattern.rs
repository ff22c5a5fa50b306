//! Whitespace-token context snippets for the pattern modes.

use crate::config::HeadlineConfig;
use std::ops::Range;

use super::{push_escaped, push_marked};

/// Builds a snippet around each match span, in document order.
///
/// The highlight covers the whole whitespace-delimited token(s) containing the match,
/// with up to `context_words` whitespace tokens on either side. Scanning resumes after
/// each fragment, so a match already inside an earlier fragment's context does not
/// start a new one.
pub(crate) fn pattern_headline(
    body: &str,
    spans: &[Range<usize>],
    context_words: usize,
    options: &HeadlineConfig,
) -> String {
    let mut out = String::new();
    let mut floor = 0;

    for span in spans {
        if span.start < floor {
            continue;
        }

        let mark_start = token_start(body, span.start, floor);
        let mark_end = token_end(body, span.end);
        let before = words_before(body, mark_start, floor, context_words);
        let after = words_after(body, mark_end, context_words);

        if !out.is_empty() {
            out.push_str(&options.fragment_delimiter);
        }
        push_escaped(&mut out, &body[before..mark_start]);
        push_marked(&mut out, &body[mark_start..mark_end], options);
        push_escaped(&mut out, &body[mark_end..after]);

        floor = after;
    }

    out
}

/// Start of the whitespace token containing `at`, not before `floor`.
fn token_start(body: &str, at: usize, floor: usize) -> usize {
    body[floor..at]
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map_or(floor, |(i, c)| floor + i + c.len_utf8())
}

/// End of the whitespace token containing the byte before `at`.
fn token_end(body: &str, at: usize) -> usize {
    body[at..]
        .char_indices()
        .find(|(_, c)| c.is_whitespace())
        .map_or(body.len(), |(i, _)| at + i)
}

/// Offset where the `count` whitespace tokens preceding `at` begin, not before `floor`.
fn words_before(body: &str, at: usize, floor: usize, count: usize) -> usize {
    let mut start = at;
    let mut taken = 0;
    let mut in_token = false;

    for (i, c) in body[floor..at].char_indices().rev() {
        if c.is_whitespace() {
            if in_token {
                taken += 1;
                in_token = false;
                if taken == count {
                    break;
                }
            }
        } else {
            if !in_token && taken == count {
                break;
            }
            in_token = true;
        }
        start = floor + i;
    }

    if in_token {
        return start;
    }
    if taken == 0 {
        return at;
    }
    // Drop leading whitespace in front of the first captured token
    start + body[start..at].len() - body[start..at].trim_start().len()
}

/// Offset where the `count` whitespace tokens following `at` end.
fn words_after(body: &str, at: usize, count: usize) -> usize {
    let mut end = at;
    let mut taken = 0;
    let mut in_token = false;

    for (i, c) in body[at..].char_indices() {
        if c.is_whitespace() {
            if in_token {
                in_token = false;
                if taken == count {
                    break;
                }
            }
        } else {
            if !in_token {
                if taken == count {
                    break;
                }
                taken += 1;
                in_token = true;
            }
            end = at + i + c.len_utf8();
        }
    }

    end
}
