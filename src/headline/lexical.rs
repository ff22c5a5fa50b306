//! Fragment-based headlines for the lexical modes.

use crate::config::HeadlineConfig;
use crate::search::Word;

use super::{push_escaped, push_marked};

/// Builds a headline from analyzed words, marking every word for which `is_hit` holds.
///
/// Hits are grouped into fragments spanning at most `max_words` words, each padded
/// with surrounding context up to `min_words`. Fragments never overlap, at most
/// `max_fragments` are emitted, and they are joined with the fragment delimiter. A
/// body without hits yields its first `min_words` words unmarked.
pub(crate) fn lexical_headline(
    body: &str,
    words: &[Word],
    is_hit: impl Fn(&Word) -> bool,
    options: &HeadlineConfig,
) -> String {
    if words.is_empty() {
        return String::new();
    }

    let hits: Vec<bool> = words.iter().map(is_hit).collect();
    let mut fragments = select_fragments(&hits, options);
    if fragments.is_empty() {
        let end = options.min_words.clamp(1, words.len()) - 1;
        fragments.push((0, end));
    }

    let mut out = String::new();
    for (i, &(start, end)) in fragments.iter().enumerate() {
        if i > 0 {
            out.push_str(&options.fragment_delimiter);
        }
        render(&mut out, body, words, &hits, start, end, options);
    }
    out
}

/// Word index ranges (inclusive) of the fragments to render.
fn select_fragments(hits: &[bool], options: &HeadlineConfig) -> Vec<(usize, usize)> {
    let len = hits.len();
    let max_words = options.max_words.max(1);
    let mut fragments = vec![];
    let mut floor = 0;

    while fragments.len() < options.max_fragments {
        let Some(first) = (floor..len).find(|&i| hits[i]) else {
            break;
        };
        let last = (first..len.min(first + max_words))
            .rev()
            .find(|&i| hits[i])
            .unwrap_or(first);

        let (start, end) = pad(first, last, floor, len, options.min_words.min(max_words));
        fragments.push((start, end));
        floor = end + 1;
    }

    fragments
}

/// Grows `[start, end]` alternately forward and backward until it holds `target` words.
fn pad(mut start: usize, mut end: usize, floor: usize, len: usize, target: usize) -> (usize, usize) {
    while end - start + 1 < target {
        let mut grew = false;
        if end + 1 < len {
            end += 1;
            grew = true;
        }
        if end - start + 1 < target && start > floor {
            start -= 1;
            grew = true;
        }
        if !grew {
            break;
        }
    }
    (start, end)
}

fn render(
    out: &mut String,
    body: &str,
    words: &[Word],
    hits: &[bool],
    start: usize,
    end: usize,
    options: &HeadlineConfig,
) {
    for i in start..=end {
        if i > start {
            push_escaped(out, &body[words[i - 1].end..words[i].start]);
        }
        let text = &body[words[i].start..words[i].end];
        if hits[i] {
            push_marked(out, text, options);
        } else {
            push_escaped(out, text);
        }
    }
}
