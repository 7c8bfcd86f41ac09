//! Whitespace tokenization of one page of OCR text.
//!
//! No normalization happens here. Case and punctuation are left alone so each
//! consumer can decide what to strip.

use std::ops::Range;

#[derive(Debug, Clone, Default)]
pub struct PageTokens<'a> {
    tokens: Vec<&'a str>,
}

impl<'a> PageTokens<'a> {
    pub fn new(page_text: &'a str) -> Self {
        Self {
            tokens: page_text.split_whitespace().collect(),
        }
    }

    /// Index of the first token equal to `literal`
    pub fn position(&self, literal: &str) -> Option<usize> {
        self.tokens.iter().position(|token| *token == literal)
    }

    /// First anchor of `candidates` present on the page, in candidate order
    pub fn position_of_any(&self, candidates: &[&str]) -> Option<(usize, &'a str)> {
        candidates.iter().find_map(|candidate| {
            self.position(candidate)
                .map(|index| (index, self.tokens[index]))
        })
    }

    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.tokens.get(index).copied()
    }

    /// Tokens in `range`, clamped to the page
    pub fn window(&self, range: Range<usize>) -> &[&'a str] {
        let end = range.end.min(self.tokens.len());
        let start = range.start.min(end);
        &self.tokens[start..end]
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn as_slice(&self) -> &[&'a str] {
        &self.tokens
    }
}
