use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::extraction::{DocumentExtraction, PageTally, ReportFamily};
use crate::models::PathologyReport;

/// A document that produced no pages, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedDocument {
    pub path: String,
    pub reason: String,
}

/// Totals of one extraction run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub documents_discovered: usize,
    pub documents_processed: usize,
    pub documents_skipped: usize,
    pub documents_unrecognized: usize,
    pub records: usize,
    pub pages: PageTally,
    pub elapsed_seconds: f64,
    pub skipped: Vec<SkippedDocument>,
}

impl RunSummary {
    pub fn elapsed_minutes(&self) -> f64 {
        self.elapsed_seconds / 60.0
    }

    pub fn log(&self) {
        info!(
            "Processed {} of {} document(s): {} record(s), {} duplicate page(s), {} unrecognized, {} skipped",
            self.documents_processed,
            self.documents_discovered,
            self.records,
            self.pages.duplicates,
            self.documents_unrecognized,
            self.documents_skipped
        );
        for skipped in &self.skipped {
            warn!("Skipped {}: {}", skipped.path, skipped.reason);
        }
        info!(
            "Total time: {:.2} seconds ({:.2} minutes)",
            self.elapsed_seconds,
            self.elapsed_minutes()
        );
    }
}

/// Start-of-run banner, e.g. "Begin extraction: 3 files"
pub fn start_banner(document_count: usize) -> String {
    let noun = if document_count == 1 { "file" } else { "files" };
    format!("Begin extraction: {} {}", document_count, noun)
}

/// Collects records in the order documents are handed to it.
///
/// Records are never re-sorted or re-grouped. Feeding documents in discovery
/// order yields records in discovery order, page order within a document.
#[derive(Debug, Default)]
pub struct ReportAggregator {
    reports: Vec<PathologyReport>,
    summary: RunSummary,
}

impl ReportAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_discovered(&mut self, count: usize) {
        self.summary.documents_discovered += count;
    }

    pub fn record_extraction(&mut self, family: ReportFamily, extraction: DocumentExtraction) {
        let DocumentExtraction { reports, tally } = extraction;
        info!("Read {} report(s) from a {} document", reports.len(), family);

        self.summary.documents_processed += 1;
        self.summary.records += reports.len();
        self.summary.pages.extracted += tally.extracted;
        self.summary.pages.duplicates += tally.duplicates;
        self.summary.pages.skipped += tally.skipped;
        self.summary.pages.malformed += tally.malformed;
        self.summary.pages.unsupported += tally.unsupported;
        self.reports.extend(reports);
    }

    pub fn record_unrecognized(&mut self, path: &Path) {
        info!("{} does not match any known report type", path.display());
        self.summary.documents_unrecognized += 1;
    }

    pub fn record_skipped(&mut self, path: &Path, reason: impl Into<String>) {
        self.summary.documents_skipped += 1;
        self.summary.skipped.push(SkippedDocument {
            path: path.display().to_string(),
            reason: reason.into(),
        });
    }

    pub fn finish(mut self, elapsed: Duration) -> (Vec<PathologyReport>, RunSummary) {
        self.summary.elapsed_seconds = elapsed.as_secs_f64();
        (self.reports, self.summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Accession, AccessionArea, ReportKind};
    use std::path::PathBuf;

    fn report(number: u32) -> PathologyReport {
        PathologyReport {
            accession: Accession::new(AccessionArea::Ccy, 2024, number),
            kind: ReportKind::GynCytology,
            tissue_committee: None,
            diagnosis: "PAP and/or Molecular Results: Negative ".to_string(),
            source_file: PathBuf::from("gyn.pdf"),
            page_number: number as usize,
        }
    }

    fn extraction(numbers: &[u32]) -> DocumentExtraction {
        DocumentExtraction {
            reports: numbers.iter().map(|n| report(*n)).collect(),
            tally: PageTally {
                extracted: numbers.len(),
                ..PageTally::default()
            },
        }
    }

    #[test]
    fn test_start_banner_pluralizes() {
        assert_eq!(start_banner(1), "Begin extraction: 1 file");
        assert_eq!(start_banner(0), "Begin extraction: 0 files");
        assert_eq!(start_banner(12), "Begin extraction: 12 files");
    }

    #[test]
    fn test_records_keep_document_order() {
        let mut aggregator = ReportAggregator::new();
        aggregator.record_discovered(3);
        aggregator.record_extraction(ReportFamily::GynCytology, extraction(&[7, 3]));
        aggregator.record_unrecognized(Path::new("memo.pdf"));
        aggregator.record_extraction(ReportFamily::GynCytology, extraction(&[1]));

        let (reports, summary) = aggregator.finish(Duration::from_secs(90));
        let numbers: Vec<u32> = reports.iter().map(|r| r.accession.number).collect();

        assert_eq!(numbers, vec![7, 3, 1]);
        assert_eq!(summary.documents_discovered, 3);
        assert_eq!(summary.documents_processed, 2);
        assert_eq!(summary.documents_unrecognized, 1);
        assert_eq!(summary.records, 3);
        assert_eq!(summary.pages.extracted, 3);
        assert_eq!(summary.elapsed_minutes(), 1.5);
    }

    #[test]
    fn test_skipped_documents_are_listed() {
        let mut aggregator = ReportAggregator::new();
        aggregator.record_skipped(Path::new("/reports/bad.pdf"), "rasterization failed");

        let (reports, summary) = aggregator.finish(Duration::ZERO);
        assert!(reports.is_empty());
        assert_eq!(summary.documents_skipped, 1);
        assert_eq!(
            summary.skipped,
            vec![SkippedDocument {
                path: "/reports/bad.pdf".to_string(),
                reason: "rasterization failed".to_string(),
            }]
        );
    }
}
