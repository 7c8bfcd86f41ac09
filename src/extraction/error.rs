use thiserror::Error;

/// Recoverable failures while reading one page.
///
/// None of these abort a document: the page is skipped with a warning and
/// extraction continues with the next page.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("accession anchor '{anchor}' is not followed by {expected}")]
    TruncatedAccession {
        anchor: String,
        expected: &'static str,
    },

    #[error("malformed accession year token '{token}'")]
    MalformedYear { token: String },

    #[error("malformed accession number token '{token}'")]
    MalformedNumber { token: String },
}
