//! Engine configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) yields the
//! stock configuration:
//!
//! ```toml
//! [analysis]
//! language = "english"
//!
//! [headline]
//! start_sel = "<mark>"
//! stop_sel = "</mark>"
//! max_fragments = 100
//! min_words = 25
//! max_words = 50
//! fragment_delimiter = " ... "
//!
//! [pattern]
//! context_words = 25
//! timeout_ms = 5000
//! size_limit = 10485760
//! dfa_size_limit = 2097152
//!
//! [ranking]
//! normalization = 1
//! ```

use crate::error::Result;
use anyhow::{Context, bail};
use rust_stemmers::Algorithm;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub analysis: AnalysisConfig,
    pub headline: HeadlineConfig,
    pub pattern: PatternConfig,
    pub ranking: RankingConfig,
}

impl EngineConfig {
    /// Parse and validate a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).context("Failed to parse engine configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file, falling back to defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        tracing::debug!(path = %path.display(), ?config, "Loaded engine configuration");
        Ok(config)
    }

    /// Reject settings the headline and pattern code cannot honour.
    pub fn validate(&self) -> Result<()> {
        let h = &self.headline;
        if h.min_words == 0 {
            bail!("headline.min_words must be positive");
        }
        if h.min_words >= h.max_words {
            bail!(
                "headline.min_words ({}) must be less than headline.max_words ({})",
                h.min_words,
                h.max_words
            );
        }
        if h.max_fragments == 0 {
            bail!("headline.max_fragments must be positive");
        }
        if h.start_sel.is_empty() || h.stop_sel.is_empty() {
            bail!("headline.start_sel and headline.stop_sel must not be empty");
        }
        if self.pattern.timeout_ms == 0 {
            bail!("pattern.timeout_ms must be positive");
        }
        if self.ranking.normalization & !RankingConfig::KNOWN_FLAGS != 0 {
            bail!(
                "ranking.normalization {} contains unknown flags",
                self.ranking.normalization
            );
        }
        Ok(())
    }
}

/// The single language used for lexical analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    French,
    German,
    Spanish,
    Italian,
    Portuguese,
    Dutch,
}

impl Language {
    pub(crate) const fn algorithm(self) -> Algorithm {
        match self {
            Self::English => Algorithm::English,
            Self::French => Algorithm::French,
            Self::German => Algorithm::German,
            Self::Spanish => Algorithm::Spanish,
            Self::Italian => Algorithm::Italian,
            Self::Portuguese => Algorithm::Portuguese,
            Self::Dutch => Algorithm::Dutch,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub language: Language,
}

/// Lexical headline shape. Pattern snippets share the markers and delimiter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeadlineConfig {
    pub start_sel: String,
    pub stop_sel: String,
    pub max_fragments: usize,
    pub min_words: usize,
    pub max_words: usize,
    pub fragment_delimiter: String,
}

impl Default for HeadlineConfig {
    fn default() -> Self {
        Self {
            start_sel: "<mark>".to_string(),
            stop_sel: "</mark>".to_string(),
            max_fragments: 100,
            min_words: 25,
            max_words: 50,
            fragment_delimiter: " ... ".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PatternConfig {
    /// Whitespace tokens of context captured on each side of a match.
    pub context_words: usize,
    /// Wall-clock budget for one invocation's pattern work.
    pub timeout_ms: u64,
    /// Upper bound on compiled program size, in bytes.
    pub size_limit: usize,
    /// Upper bound on the lazy DFA cache, in bytes.
    pub dfa_size_limit: usize,
}

impl PatternConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            context_words: 25,
            timeout_ms: 5_000,
            size_limit: 10 * (1 << 20),
            dfa_size_limit: 2 * (1 << 20),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RankingConfig {
    /// Length normalization bitmask applied to lexical scores.
    pub normalization: u32,
}

impl RankingConfig {
    pub const LOG_LENGTH: u32 = 1;
    pub const LENGTH: u32 = 2;
    pub const UNIQUE_WORDS: u32 = 8;
    pub const LOG_UNIQUE_WORDS: u32 = 16;
    pub const RANK_PLUS_ONE: u32 = 32;
    const KNOWN_FLAGS: u32 = Self::LOG_LENGTH
        | Self::LENGTH
        | Self::UNIQUE_WORDS
        | Self::LOG_UNIQUE_WORDS
        | Self::RANK_PLUS_ONE;
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            normalization: Self::LOG_LENGTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config = EngineConfig::from_toml("").unwrap();
        check!(config == EngineConfig::default());
        check!(config.headline.max_fragments == 100);
        check!(config.headline.min_words == 25);
        check!(config.headline.max_words == 50);
        check!(config.pattern.context_words == 25);
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = EngineConfig::from_toml(
            r#"
            [headline]
            start_sel = "<b>"
            stop_sel = "</b>"

            [pattern]
            timeout_ms = 250
            "#,
        )
        .unwrap();
        check!(config.headline.start_sel == "<b>");
        check!(config.headline.max_words == 50);
        check!(config.pattern.timeout() == Duration::from_millis(250));
        check!(config.analysis.language == Language::English);
    }

    #[rstest]
    #[case("[headline]\nmin_words = 50\nmax_words = 50")]
    #[case("[headline]\nmin_words = 0")]
    #[case("[headline]\nmax_fragments = 0")]
    #[case("[pattern]\ntimeout_ms = 0")]
    #[case("[ranking]\nnormalization = 4")]
    #[case("[analysis]\nlanguage = \"klingon\"")]
    #[case("[unknown]\nfield = 1")]
    fn test_invalid_configs_rejected(#[case] text: &str) {
        check!(EngineConfig::from_toml(text).is_err());
    }

    #[test]
    fn test_load_without_path_is_default() {
        check!(EngineConfig::load(None).unwrap() == EngineConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(&path, "[analysis]\nlanguage = \"german\"\n").unwrap();
        let config = EngineConfig::load(Some(&path)).unwrap();
        check!(config.analysis.language == Language::German);
    }
}
