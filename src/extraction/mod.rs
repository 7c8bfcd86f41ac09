//! Report classification and field extraction from OCR page text.
//!
//! Everything in this module is synchronous and free of I/O. The only state
//! kept across pages is the per-document [`DeduplicationRegistry`], which
//! [`ReportExtractor::extract_document`] creates and drops for each document.

pub mod accession;
pub mod classifier;
pub mod dedup;
pub mod diagnosis;
pub mod error;
pub mod family;
pub mod offset;
pub mod tissue_committee;
pub mod tokenizer;

pub use classifier::{classify_document, classify_first_page};
pub use dedup::DeduplicationRegistry;
pub use error::ExtractionError;
pub use family::{
    DocumentExtraction, ExtractionProfile, PageOutcome, PageTally, ReportExtractor, ReportFamily,
    SkipReason,
};
pub use offset::{Lexicon, OffsetCorrector, WordList};
pub use tokenizer::PageTokens;
