//! Turning a reports directory into an ordered list of records.

pub mod aggregator;
pub mod discovery;
pub mod pipeline;

pub use aggregator::{start_banner, ReportAggregator, RunSummary, SkippedDocument};
pub use discovery::{discover_documents, DiscoveredDocument, Discovery, SkippedFile};
pub use pipeline::{process_document, DocumentResult, ExtractionPipeline, RunOutput};
