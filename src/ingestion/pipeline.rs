//! Top-level orchestration: discover, read, classify, extract, aggregate.

use anyhow::Result;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::aggregator::{start_banner, ReportAggregator, RunSummary};
use super::discovery::{discover_documents, DiscoveredDocument, Discovery};
use crate::extraction::{classify_document, DocumentExtraction, ReportExtractor, ReportFamily};
use crate::models::PathologyReport;
use crate::ocr::PageReader;

/// What happened to one document
#[derive(Debug)]
pub enum DocumentResult {
    Extracted {
        family: ReportFamily,
        extraction: DocumentExtraction,
    },
    Unrecognized,
    Failed(String),
}

/// Records of a run, in discovery order, with its summary
#[derive(Debug)]
pub struct RunOutput {
    pub reports: Vec<PathologyReport>,
    pub summary: RunSummary,
}

pub struct ExtractionPipeline {
    reader: Arc<dyn PageReader>,
    extractor: ReportExtractor,
    concurrency: usize,
    /// Files the run writes into the reports directory
    excluded: Vec<PathBuf>,
}

impl ExtractionPipeline {
    pub fn new(reader: Arc<dyn PageReader>, extractor: ReportExtractor, concurrency: usize) -> Self {
        Self {
            reader,
            extractor,
            concurrency: concurrency.max(1),
            excluded: Vec::new(),
        }
    }

    pub fn with_excluded_paths(mut self, excluded: Vec<PathBuf>) -> Self {
        self.excluded = excluded;
        self
    }

    /// Extract every document in `reports_dir`
    pub async fn run(&self, reports_dir: &Path) -> Result<RunOutput> {
        let started = Instant::now();
        let dir = reports_dir.to_path_buf();
        let excluded = self.excluded.clone();
        let discovery =
            tokio::task::spawn_blocking(move || discover_documents(&dir, &excluded)).await??;
        Ok(self.process(discovery, started).await)
    }

    /// Extract the given documents. Records come back in the order of `discovery`.
    pub async fn process(&self, discovery: Discovery, started: Instant) -> RunOutput {
        let Discovery { documents, skipped } = discovery;
        let mut aggregator = ReportAggregator::new();

        info!("{}", start_banner(documents.len()));
        aggregator.record_discovered(documents.len() + skipped.len());
        for file in &skipped {
            aggregator.record_skipped(&file.path, file.reason.clone());
        }

        let results: Vec<(PathBuf, DocumentResult)> = stream::iter(documents)
            .map(|document| {
                let path = document.path.clone();
                let task = tokio::spawn(process_document(
                    Arc::clone(&self.reader),
                    self.extractor.clone(),
                    document,
                ));
                async move {
                    let result = match task.await {
                        Ok(result) => result,
                        Err(e) => {
                            warn!("Processing {} did not complete: {}", path.display(), e);
                            DocumentResult::Failed(format!("processing task failed: {}", e))
                        }
                    };
                    (path, result)
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        for (path, result) in results {
            match result {
                DocumentResult::Extracted { family, extraction } => {
                    aggregator.record_extraction(family, extraction)
                }
                DocumentResult::Unrecognized => aggregator.record_unrecognized(&path),
                DocumentResult::Failed(reason) => aggregator.record_skipped(&path, reason),
            }
        }

        let (reports, summary) = aggregator.finish(started.elapsed());
        RunOutput { reports, summary }
    }
}

/// Read, classify and extract one document with its own deduplication registry
pub async fn process_document(
    reader: Arc<dyn PageReader>,
    extractor: ReportExtractor,
    document: DiscoveredDocument,
) -> DocumentResult {
    info!("Reading {}", document.path.display());

    let pages = match reader.read_pages(&document.path).await {
        Ok(pages) => pages,
        Err(e) => {
            warn!("Skipping {}: {}", document.path.display(), e);
            return DocumentResult::Failed(e.to_string());
        }
    };

    let Some(family) = classify_document(&pages) else {
        return DocumentResult::Unrecognized;
    };
    info!("{}: {}", document.path.display(), family);

    let extraction = extractor.extract_document(family, &pages, &document.path);
    DocumentResult::Extracted { family, extraction }
}
