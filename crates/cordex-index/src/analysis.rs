//! Text analysis for literal-indexed fields.
//!
//! Stemming stays with the external indexer. The analyzers here only cover
//! the paths that must match literally: author names and controlled
//! vocabulary codes.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

/// Turns text into index terms.
pub trait Analyzer: Send + Sync {
    fn analyze(&self, text: &str) -> Vec<String>;
}

lazy_static! {
    /// Unicode word runs.
    static ref WORD: Regex = Regex::new(r"\w+").unwrap();
    /// Trailing English possessive, straight or curly apostrophe.
    static ref POSSESSIVE: Regex = Regex::new(r"(?i)\b(\w+)['\x{2019}]s\b").unwrap();
    static ref ENGLISH_STOP_WORDS: HashSet<&'static str> = [
        "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if",
        "in", "into", "is", "it", "no", "not", "of", "on", "or", "such",
        "that", "the", "their", "then", "there", "these", "they", "this",
        "to", "was", "will", "with",
    ]
    .into_iter()
    .collect();
}

/// Word tokenizer with lower-casing and optional English cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardAnalyzer {
    strip_possessives: bool,
    remove_stop_words: bool,
}

impl StandardAnalyzer {
    /// Lower-cased word tokens, nothing removed. Used for author and
    /// annotation fields.
    pub fn non_stemming() -> Self {
        Self { strip_possessives: false, remove_stop_words: false }
    }

    /// Query-side analysis: possessives stripped, English stop words dropped.
    pub fn syntax() -> Self {
        Self { strip_possessives: true, remove_stop_words: true }
    }
}

impl Default for StandardAnalyzer {
    fn default() -> Self {
        Self::non_stemming()
    }
}

impl Analyzer for StandardAnalyzer {
    fn analyze(&self, text: &str) -> Vec<String> {
        let text = if self.strip_possessives {
            POSSESSIVE.replace_all(text, "$1")
        } else {
            std::borrow::Cow::Borrowed(text)
        };

        WORD.find_iter(&text)
            .map(|m| m.as_str().to_lowercase())
            .filter(|t| !(self.remove_stop_words && ENGLISH_STOP_WORDS.contains(t.as_str())))
            .collect()
    }
}
