//! Accession identifier parsing.
//!
//! An accession follows an area anchor token (`CCY`, `CSP`, `(CSP`) in one of
//! two surface forms:
//!
//! * spaced: `CSP 24 1234),` with year and number in separate tokens
//! * hyphenated: `(CSP 24-01234)` with both in a single token
//!
//! A missing anchor is not an error, the page simply carries no accession.
//! Tokens that are present but do not parse are reported as
//! [`ExtractionError`] so the caller can skip the page with a warning.

use super::error::ExtractionError;
use super::tokenizer::PageTokens;
use crate::models::{Accession, AccessionArea};

/// Surface formats accepted after the area anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessionFormat {
    /// `<anchor> <yy> <number>` only
    Spaced,
    /// Either the spaced form or `<anchor> <yy>-<number>`
    SpacedOrHyphenated,
}

#[derive(Debug, Clone, Copy)]
pub struct AccessionLayout {
    pub area: AccessionArea,
    /// Anchor spellings, tried in order
    pub anchors: &'static [&'static str],
    pub format: AccessionFormat,
}

/// Find the area anchor and parse the accession that follows it
pub fn parse_accession(
    tokens: &PageTokens<'_>,
    layout: &AccessionLayout,
) -> Result<Option<Accession>, ExtractionError> {
    match tokens.position_of_any(layout.anchors) {
        Some((anchor_index, _)) => {
            parse_accession_at(tokens, anchor_index, layout.area, layout.format).map(Some)
        }
        None => Ok(None),
    }
}

/// Parse the accession following the anchor at `anchor_index`
pub fn parse_accession_at(
    tokens: &PageTokens<'_>,
    anchor_index: usize,
    area: AccessionArea,
    format: AccessionFormat,
) -> Result<Accession, ExtractionError> {
    let anchor = tokens.get(anchor_index).unwrap_or_default();
    let first = tokens
        .get(anchor_index + 1)
        .ok_or_else(|| ExtractionError::TruncatedAccession {
            anchor: anchor.to_string(),
            expected: "a year token",
        })?;

    if format == AccessionFormat::SpacedOrHyphenated {
        if let Some((year_part, number_part)) = split_hyphenated(first) {
            let year = parse_year(year_part).map_err(|_| ExtractionError::MalformedYear {
                token: first.to_string(),
            })?;
            let number = parse_number(number_part).map_err(|_| {
                ExtractionError::MalformedNumber {
                    token: first.to_string(),
                }
            })?;
            return Ok(Accession::new(area, year, number));
        }
    }

    let number_token = tokens
        .get(anchor_index + 2)
        .ok_or_else(|| ExtractionError::TruncatedAccession {
            anchor: anchor.to_string(),
            expected: "a number token",
        })?;

    let year = parse_year(first)?;
    let number = parse_number(number_token)?;
    Ok(Accession::new(area, year, number))
}

/// Normalize a two-digit year token to four digits (`24` -> `2024`)
pub fn parse_year(token: &str) -> Result<u16, ExtractionError> {
    let digits = token.trim_matches(|c: char| c.is_ascii_punctuation());
    if digits.len() != 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ExtractionError::MalformedYear {
            token: token.to_string(),
        });
    }

    digits
        .parse::<u16>()
        .map(|yy| 2000 + yy)
        .map_err(|_| ExtractionError::MalformedYear {
            token: token.to_string(),
        })
}

/// Parse an accession number, dropping leading punctuation and any trailing
/// non-digit characters (`1234),` -> `1234`)
pub fn parse_number(token: &str) -> Result<u32, ExtractionError> {
    let digits = token
        .trim_start_matches(|c: char| c.is_ascii_punctuation())
        .trim_end_matches(|c: char| !c.is_ascii_digit());

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ExtractionError::MalformedNumber {
            token: token.to_string(),
        });
    }

    digits.parse::<u32>().map_err(|_| ExtractionError::MalformedNumber {
        token: token.to_string(),
    })
}

/// Split `YY-NNNNN` at its first hyphen. A leading hyphen does not count.
fn split_hyphenated(token: &str) -> Option<(&str, &str)> {
    match token.find('-') {
        Some(position) if position > 0 => Some((&token[..position], &token[position + 1..])),
        _ => None,
    }
}
