//! Diagnosis text assembly.
//!
//! Each report kind owns a [`SubstitutionTable`]: an optional preamble, a list
//! of literal token rules and a fallback for every other token. Tables are
//! plain data so a new report kind only needs a new table.

use std::ops::Range;

use super::tokenizer::PageTokens;

/// What to do with a token that matches a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenAction {
    /// Append the replacement text verbatim (it carries its own spacing)
    Replace(&'static str),
    /// Drop the last character built so far and close the sentence with ". "
    JoinSentence,
    /// Append `prefix`, then the token and a space
    Marker(&'static str),
}

/// Treatment of tokens that match no rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    Verbatim,
    /// Remove every listed character from the token
    Strip(&'static [char]),
}

#[derive(Debug, Clone, Copy)]
pub struct SubstitutionTable {
    pub preamble: &'static str,
    pub rules: &'static [(&'static str, TokenAction)],
    pub fallback: Fallback,
}

impl SubstitutionTable {
    fn action_for(&self, token: &str) -> Option<TokenAction> {
        self.rules
            .iter()
            .find(|(literal, _)| *literal == token)
            .map(|(_, action)| *action)
    }
}

/// No corrections at all: tokens joined with single spaces
pub const VERBATIM_TABLE: SubstitutionTable = SubstitutionTable {
    preamble: "",
    rules: &[],
    fallback: Fallback::Verbatim,
};

/// GYN cytology: OCR noise around the molecular results block
pub const GYN_CYTOLOGY_TABLE: SubstitutionTable = SubstitutionTable {
    preamble: "PAP and/or Molecular Results: ",
    rules: &[
        ("HPV.mRNA", TokenAction::Replace("HPV mRNA ")),
        ("po", TokenAction::JoinSentence),
    ],
    fallback: Fallback::Strip(&[':', '&', '-', '\'', '"', '\u{2018}', '\u{201C}']),
};

/// Surgical pathology: missed spaces and inline section labels.
///
/// Marker prefixes stay empty because the report log holds one line per report.
pub const SURGICAL_TABLE: SubstitutionTable = SubstitutionTable {
    preamble: "",
    rules: &[
        ("Nota", TokenAction::Replace("Not a ")),
        ("COMMENT:", TokenAction::Marker("")),
        ("TCO1:", TokenAction::Marker("")),
        ("TCO7:", TokenAction::Marker("")),
    ],
    fallback: Fallback::Verbatim,
};

/// Build the corrected diagnosis from the tokens in `range`.
///
/// Rules are applied independently to each token in page order. An empty or
/// inverted range yields only the preamble.
pub fn build_diagnosis(
    tokens: &PageTokens<'_>,
    range: Range<usize>,
    table: &SubstitutionTable,
) -> String {
    build_from_tokens(tokens.window(range), table)
}

pub fn build_from_tokens(tokens: &[&str], table: &SubstitutionTable) -> String {
    let mut diagnosis = String::from(table.preamble);

    for token in tokens {
        match table.action_for(token) {
            Some(TokenAction::Replace(replacement)) => diagnosis.push_str(replacement),
            Some(TokenAction::JoinSentence) => {
                diagnosis.pop();
                diagnosis.push_str(". ");
            }
            Some(TokenAction::Marker(prefix)) => {
                diagnosis.push_str(prefix);
                diagnosis.push_str(token);
                diagnosis.push(' ');
            }
            None => {
                match table.fallback {
                    Fallback::Verbatim => diagnosis.push_str(token),
                    Fallback::Strip(chars) => {
                        diagnosis.extend(token.chars().filter(|c| !chars.contains(c)))
                    }
                }
                diagnosis.push(' ');
            }
        }
    }

    diagnosis
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surgical_table_rules_apply_per_token() {
        let tokens = PageTokens::new("Nota tumor COMMENT: clear");
        let diagnosis = build_diagnosis(&tokens, 0..tokens.len(), &SURGICAL_TABLE);
        assert_eq!(diagnosis, "Not a tumor COMMENT: clear ");
    }

    #[test]
    fn test_gyn_preamble_and_replacement() {
        let tokens = PageTokens::new("HPV.mRNA Negative");
        let diagnosis = build_diagnosis(&tokens, 0..2, &GYN_CYTOLOGY_TABLE);
        assert_eq!(diagnosis, "PAP and/or Molecular Results: HPV mRNA Negative ");
    }

    #[test]
    fn test_gyn_join_sentence_replaces_trailing_space() {
        let tokens = PageTokens::new("Satisfactory po Negative");
        let diagnosis = build_diagnosis(&tokens, 0..3, &GYN_CYTOLOGY_TABLE);
        assert_eq!(
            diagnosis,
            "PAP and/or Molecular Results: Satisfactory. Negative "
        );
    }

    #[test]
    fn test_gyn_strips_symbol_noise() {
        let tokens = PageTokens::new("\u{201C}NILM\" high-risk: &lesion's");
        let diagnosis = build_from_tokens(tokens.as_slice(), &GYN_CYTOLOGY_TABLE);
        assert_eq!(
            diagnosis,
            "PAP and/or Molecular Results: NILM highrisk lesions "
        );
    }

    #[test]
    fn test_verbatim_table_joins_with_spaces() {
        let tokens = PageTokens::new("A. Skin, left arm: basal cell carcinoma");
        let diagnosis = build_diagnosis(&tokens, 1..4, &VERBATIM_TABLE);
        assert_eq!(diagnosis, "Skin, left arm: ");
    }

    #[test]
    fn test_empty_window_yields_preamble_only() {
        let tokens = PageTokens::new("a b c");
        assert_eq!(build_diagnosis(&tokens, 2..1, &VERBATIM_TABLE), "");
        assert_eq!(
            build_diagnosis(&tokens, 3..3, &GYN_CYTOLOGY_TABLE),
            GYN_CYTOLOGY_TABLE.preamble
        );
    }
}
