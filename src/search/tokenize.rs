//! Text tokenization and stemming for lexical indexing and querying.

use crate::config::Language;
use rust_stemmers::Stemmer;
use std::fmt;

/// Common English stop words to filter out from indexing.
/// These still consume a word position so phrase distances stay faithful to the text.
pub(crate) const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "did", "do", "does", "doing", "don", "down", "during", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself",
    "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself",
    "just", "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on",
    "once", "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "s",
    "same", "she", "should", "so", "some", "such", "t", "than", "that", "the", "their",
    "theirs", "them", "themselves", "then", "there", "these", "they", "this", "those",
    "through", "to", "too", "under", "until", "up", "very", "was", "we", "were", "what", "when",
    "where", "which", "while", "who", "whom", "why", "will", "with", "you", "your", "yours",
    "yourself", "yourselves",
];

/// One word of source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Word {
    /// Byte offset of the first character.
    pub(crate) start: usize,
    /// Byte offset one past the last character.
    pub(crate) end: usize,
    /// Zero-based word position, counting stop words.
    pub(crate) position: u32,
    /// Normalized lexeme, or `None` for stop words.
    pub(crate) lexeme: Option<String>,
}

/// Lowercases, drops stop words and stems, for one configured language.
pub(crate) struct Analyzer {
    language: Language,
    stemmer: Stemmer,
}

impl fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer")
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

impl Analyzer {
    pub(crate) fn new(language: Language) -> Self {
        Self {
            language,
            stemmer: Stemmer::create(language.algorithm()),
        }
    }

    pub(crate) fn language(&self) -> Language {
        self.language
    }

    /// Splits text into words (maximal alphanumeric runs) with spans, positions and lexemes.
    pub(crate) fn words(&self, text: &str) -> Vec<Word> {
        let mut words = vec![];
        let mut word_start = None;

        for (i, c) in text.char_indices() {
            match (c.is_alphanumeric(), word_start) {
                (true, None) => word_start = Some(i),
                (false, Some(start)) => {
                    self.push_word(text, start, i, &mut words);
                    word_start = None;
                }
                _ => {}
            }
        }

        if let Some(start) = word_start {
            self.push_word(text, start, text.len(), &mut words);
        }

        words
    }

    /// Returns `(position, lexeme)` pairs for every non-stop word.
    pub(crate) fn lexemes(&self, text: &str) -> Vec<(u32, String)> {
        self.words(text)
            .into_iter()
            .filter_map(|word| word.lexeme.map(|lexeme| (word.position, lexeme)))
            .collect()
    }

    fn push_word(&self, text: &str, start: usize, end: usize, words: &mut Vec<Word>) {
        let position = words.len() as u32;
        words.push(Word {
            start,
            end,
            position,
            lexeme: self.normalize(&text[start..end]),
        });
    }

    /// Normalizes a single token, returning `None` for stop words.
    pub(crate) fn normalize(&self, token: &str) -> Option<String> {
        let lowercase = token.to_lowercase();

        if self.language == Language::English && STOP_WORDS.contains(&lowercase.as_str()) {
            return None;
        }

        Some(self.stemmer.stem(&lowercase).into_owned())
    }
}
