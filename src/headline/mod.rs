//! Headline generation: highlighted fragments of a version's body around its matches.
//!
//! Lexical headlines are built from analyzed words and grouped into bounded
//! fragments; pattern snippets capture whitespace-token context around each raw
//! match. Both escape the body text so the highlight markers are the only markup.

mod clean;
mod lexical;
mod pattern;

pub use clean::clean_headline;
pub(crate) use lexical::lexical_headline;
pub(crate) use pattern::pattern_headline;

use crate::config::HeadlineConfig;

/// Appends `text` with `&`, `<` and `>` escaped.
fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

/// Appends `text` wrapped in the configured highlight markers.
fn push_marked(out: &mut String, text: &str, options: &HeadlineConfig) {
    out.push_str(&options.start_sel);
    push_escaped(out, text);
    out.push_str(&options.stop_sel);
}
