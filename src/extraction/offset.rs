//! Single-token window correction for surgical pathology pages.
//!
//! OCR sometimes inserts one nonsensical token into the fixed-offset header
//! that precedes the diagnosis. The corrector checks exactly one token, the
//! first token of the diagnosis window. When that token is not recognizable
//! the window start moves forward by exactly one.
//!
//! A token is recognizable when it is a single punctuation character, parses
//! as a number (`1.`, `2`, `(3)`), is a one-letter enumerator (`A.`, `b)`),
//! or its letters, stripped of surrounding punctuation, form a word in the
//! lexicon. The lexicon also accepts regular inflections of its entries.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::tokenizer::PageTokens;

const BUILTIN_WORDS: &str = include_str!("../../data/english_words.txt");

/// Word lists shipped by common distributions, first match wins
pub const SYSTEM_WORD_LISTS: &[&str] = &[
    "/usr/share/dict/words",
    "/usr/share/dict/american-english",
    "/usr/share/dict/british-english",
];

/// Shortest stem accepted when matching an inflected form
const MIN_STEM_LEN: usize = 3;

/// Dictionary lookup used by the window correction
pub trait Lexicon: Send + Sync {
    /// `word` is already lowercased
    fn contains(&self, word: &str) -> bool;
}

/// Lowercased word list, one entry per line
#[derive(Debug, Clone, Default)]
pub struct WordList {
    words: HashSet<String>,
}

impl WordList {
    pub fn builtin() -> Self {
        Self::parse(BUILTIN_WORDS)
    }

    /// Built-in list merged with the first system word list found on this host
    pub fn with_system_words() -> Self {
        let mut words = Self::builtin();
        if let Some(path) = system_word_list() {
            match Self::from_file(&path) {
                Ok(system) => {
                    info!("Loaded {} words from {}", system.len(), path.display());
                    words.extend(system);
                }
                Err(e) => debug!("Ignoring system word list: {:#}", e),
            }
        }
        words
    }

    pub fn parse(contents: &str) -> Self {
        let words = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_lowercase)
            .collect();
        Self { words }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read word list {}", path.display()))?;
        Ok(Self::parse(&contents))
    }

    pub fn extend(&mut self, other: WordList) {
        self.words.extend(other.words);
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    fn contains_stem(&self, stem: &str) -> bool {
        stem.len() >= MIN_STEM_LEN && self.words.contains(stem)
    }

    /// Regular English inflections: plurals, past tense, -ing and -ly
    fn contains_inflection(&self, word: &str) -> bool {
        if let Some(stem) = word.strip_suffix("ies") {
            if self.contains_stem(&format!("{}y", stem)) {
                return true;
            }
        }
        for suffix in ["es", "s", "ed", "d", "ly"] {
            if let Some(stem) = word.strip_suffix(suffix) {
                if self.contains_stem(stem) {
                    return true;
                }
            }
        }
        if let Some(stem) = word.strip_suffix("ing") {
            if self.contains_stem(stem) || self.contains_stem(&format!("{}e", stem)) {
                return true;
            }
        }
        false
    }
}

impl Lexicon for WordList {
    fn contains(&self, word: &str) -> bool {
        self.words.contains(word) || self.contains_inflection(word)
    }
}

fn system_word_list() -> Option<PathBuf> {
    SYSTEM_WORD_LISTS
        .iter()
        .map(PathBuf::from)
        .find(|path| path.is_file())
}

#[derive(Clone)]
pub struct OffsetCorrector {
    lexicon: Arc<dyn Lexicon>,
}

impl OffsetCorrector {
    pub fn new(lexicon: Arc<dyn Lexicon>) -> Self {
        Self { lexicon }
    }

    /// Whether `token` reads as real text rather than OCR noise
    pub fn is_known_token(&self, token: &str) -> bool {
        let mut chars = token.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_punctuation() {
                return true;
            }
        }
        if token.parse::<f64>().is_ok() {
            return true;
        }

        let core = token.trim_matches(|c: char| c.is_ascii_punctuation());
        if core.is_empty() {
            return false;
        }
        if core.parse::<f64>().is_ok() {
            return true;
        }
        let mut letters = core.chars();
        if let (Some(c), None) = (letters.next(), letters.next()) {
            return c.is_alphabetic();
        }
        self.lexicon.contains(&core.to_lowercase())
    }

    /// Window start after checking the token at `start`.
    ///
    /// Returns `start + 1` when that token is not recognizable, `start` when
    /// it is or when the page ends before `start`.
    pub fn adjust_start(&self, tokens: &PageTokens<'_>, start: usize) -> usize {
        match tokens.get(start) {
            Some(token) if !self.is_known_token(token) => {
                debug!("Token '{}' is not a known word, shifting window by one", token);
                start + 1
            }
            _ => start,
        }
    }
}

impl std::fmt::Debug for OffsetCorrector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OffsetCorrector").finish_non_exhaustive()
    }
}
