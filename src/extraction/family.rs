//! Report families and per-page extraction.
//!
//! A document belongs to exactly one [`ReportFamily`]. Every page of the
//! document is then read with an [`ExtractionProfile`]: the anchor pair that
//! bounds the diagnosis, the window offsets relative to those anchors, the
//! accession layout and the substitution table. The surgical family picks one
//! of three profiles per page from the page's content.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::accession::{parse_accession, AccessionFormat, AccessionLayout};
use super::dedup::DeduplicationRegistry;
use super::diagnosis::{
    build_diagnosis, SubstitutionTable, GYN_CYTOLOGY_TABLE, SURGICAL_TABLE, VERBATIM_TABLE,
};
use super::error::ExtractionError;
use super::offset::OffsetCorrector;
use super::tissue_committee::detect_tissue_committee;
use super::tokenizer::PageTokens;
use crate::models::{Accession, AccessionArea, PathologyReport, ReportKind};

/// Page marker of non-GYN cytology reports mixed into surgical faxes
const NON_GYN_CYTOLOGY_MARKER: &str = "CCY";
/// Page marker of supplemental mismatch repair IHC reports
const SUPPLEMENTAL_MARKER: &str = "MISMATCH REPAIR PROTEIN IMMUNOHISTOCHEMISTRY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFamily {
    GynCytology,
    Dermatopathology,
    /// Surgical pathology, embedded non-GYN cytology and supplemental reports
    Surgical,
}

impl std::fmt::Display for ReportFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFamily::GynCytology => write!(f, "GYN Cytology"),
            ReportFamily::Dermatopathology => write!(f, "Dermatopathology"),
            ReportFamily::Surgical => write!(
                f,
                "Surgical pathology, non-GYN cytology, and supplemental reports"
            ),
        }
    }
}

/// Diagnosis window relative to the anchor pair: `[start + skip, end - trim)`
#[derive(Debug, Clone, Copy)]
pub struct WindowBounds {
    pub skip_after_start: usize,
    pub trim_before_end: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct ExtractionProfile {
    pub kind: ReportKind,
    pub start_anchor: &'static str,
    pub end_anchor: &'static str,
    pub bounds: WindowBounds,
    pub accession: AccessionLayout,
    pub table: &'static SubstitutionTable,
    /// Check the first window token for a spurious OCR insertion
    pub offset_correction: bool,
    pub tissue_committee: bool,
}

pub const GYN_CYTOLOGY_PROFILE: ExtractionProfile = ExtractionProfile {
    kind: ReportKind::GynCytology,
    start_anchor: "Results:",
    end_anchor: "Molecular",
    bounds: WindowBounds {
        skip_after_start: 1,
        trim_before_end: 0,
    },
    accession: AccessionLayout {
        area: AccessionArea::Ccy,
        anchors: &["CCY"],
        format: AccessionFormat::Spaced,
    },
    table: &GYN_CYTOLOGY_TABLE,
    offset_correction: false,
    tissue_committee: false,
};

/// The diagnosis ends four tokens before the electronic signature line
pub const DERMATOPATHOLOGY_PROFILE: ExtractionProfile = ExtractionProfile {
    kind: ReportKind::Dermatopathology,
    start_anchor: "DIAGNOSIS:",
    end_anchor: "Electronic",
    bounds: WindowBounds {
        skip_after_start: 1,
        trim_before_end: 4,
    },
    accession: AccessionLayout {
        area: AccessionArea::Csp,
        anchors: &["CSP"],
        format: AccessionFormat::Spaced,
    },
    table: &VERBATIM_TABLE,
    offset_correction: false,
    tissue_committee: false,
};

/// The diagnosis starts 15 tokens past the accession header
pub const SURGICAL_PATHOLOGY_PROFILE: ExtractionProfile = ExtractionProfile {
    kind: ReportKind::SurgicalPathology,
    start_anchor: "ACCESSION#",
    end_anchor: "Pathologist:",
    bounds: WindowBounds {
        skip_after_start: 15,
        trim_before_end: 1,
    },
    accession: AccessionLayout {
        area: AccessionArea::Csp,
        anchors: &["(CSP"],
        format: AccessionFormat::SpacedOrHyphenated,
    },
    table: &SURGICAL_TABLE,
    offset_correction: true,
    tissue_committee: true,
};

/// Keeps the `Interpretation` heading in the diagnosis
pub const SUPPLEMENTAL_PROFILE: ExtractionProfile = ExtractionProfile {
    kind: ReportKind::Supplemental,
    start_anchor: "Interpretation",
    end_anchor: "Electronically",
    bounds: WindowBounds {
        skip_after_start: 0,
        trim_before_end: 1,
    },
    accession: AccessionLayout {
        area: AccessionArea::Csp,
        anchors: &["(CSP"],
        format: AccessionFormat::SpacedOrHyphenated,
    },
    table: &VERBATIM_TABLE,
    offset_correction: false,
    tissue_committee: false,
};

/// How a page of a given family is read
#[derive(Debug, Clone, Copy)]
pub enum PageProfile {
    Extract(&'static ExtractionProfile),
    /// A recognized page layout without an extraction profile
    Unsupported(ReportKind),
}

impl ReportFamily {
    pub fn page_profile(&self, page_text: &str) -> PageProfile {
        match self {
            ReportFamily::GynCytology => PageProfile::Extract(&GYN_CYTOLOGY_PROFILE),
            ReportFamily::Dermatopathology => PageProfile::Extract(&DERMATOPATHOLOGY_PROFILE),
            ReportFamily::Surgical => {
                if page_text.contains(NON_GYN_CYTOLOGY_MARKER) {
                    PageProfile::Unsupported(ReportKind::NonGynCytology)
                } else if page_text.contains(SUPPLEMENTAL_MARKER) {
                    PageProfile::Extract(&SUPPLEMENTAL_PROFILE)
                } else {
                    PageProfile::Extract(&SURGICAL_PATHOLOGY_PROFILE)
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingAnchor(&'static str),
    AnchorsOutOfOrder,
    MissingAccession,
    EmptyDiagnosis,
}

/// Result of reading one page. At most one report per page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    Extracted(PathologyReport),
    Duplicate { kind: ReportKind, accession: Accession },
    Skipped(SkipReason),
    Malformed(ExtractionError),
    Unsupported(ReportKind),
}

impl PageOutcome {
    pub fn into_report(self) -> Option<PathologyReport> {
        match self {
            PageOutcome::Extracted(report) => Some(report),
            _ => None,
        }
    }
}

/// Per-outcome page counts for one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageTally {
    pub extracted: usize,
    pub duplicates: usize,
    pub skipped: usize,
    pub malformed: usize,
    pub unsupported: usize,
}

impl PageTally {
    fn record(&mut self, outcome: &PageOutcome) {
        match outcome {
            PageOutcome::Extracted(_) => self.extracted += 1,
            PageOutcome::Duplicate { .. } => self.duplicates += 1,
            PageOutcome::Skipped(_) => self.skipped += 1,
            PageOutcome::Malformed(_) => self.malformed += 1,
            PageOutcome::Unsupported(_) => self.unsupported += 1,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DocumentExtraction {
    /// Reports in page order
    pub reports: Vec<PathologyReport>,
    pub tally: PageTally,
}

#[derive(Debug, Clone)]
pub struct ReportExtractor {
    corrector: OffsetCorrector,
}

impl ReportExtractor {
    pub fn new(corrector: OffsetCorrector) -> Self {
        Self { corrector }
    }

    /// Read every page of one document with a fresh deduplication registry
    pub fn extract_document(
        &self,
        family: ReportFamily,
        pages: &[String],
        source_file: &Path,
    ) -> DocumentExtraction {
        let mut registry = DeduplicationRegistry::new();
        let mut extraction = DocumentExtraction::default();

        for (index, page_text) in pages.iter().enumerate() {
            let outcome = self.extract_page(family, page_text, index + 1, source_file, &mut registry);
            extraction.tally.record(&outcome);
            if let Some(report) = outcome.into_report() {
                extraction.reports.push(report);
            }
        }

        extraction
    }

    /// Read one page into at most one report.
    ///
    /// Accessions already in `registry` are reported as duplicates. An emitted
    /// report is registered before it is returned.
    pub fn extract_page(
        &self,
        family: ReportFamily,
        page_text: &str,
        page_number: usize,
        source_file: &Path,
        registry: &mut DeduplicationRegistry,
    ) -> PageOutcome {
        let profile = match family.page_profile(page_text) {
            PageProfile::Extract(profile) => profile,
            PageProfile::Unsupported(kind) => {
                info!(
                    "Page {} of {} is a {} report, no extraction available",
                    page_number,
                    source_file.display(),
                    kind
                );
                return PageOutcome::Unsupported(kind);
            }
        };

        let outcome = self.extract_with_profile(
            profile,
            page_text,
            page_number,
            source_file,
            registry,
        );
        log_outcome(&outcome, page_number, source_file);
        outcome
    }

    fn extract_with_profile(
        &self,
        profile: &ExtractionProfile,
        page_text: &str,
        page_number: usize,
        source_file: &Path,
        registry: &mut DeduplicationRegistry,
    ) -> PageOutcome {
        let tokens = PageTokens::new(page_text);

        let Some(start_index) = tokens.position(profile.start_anchor) else {
            return PageOutcome::Skipped(SkipReason::MissingAnchor(profile.start_anchor));
        };
        let Some(end_index) = tokens.position(profile.end_anchor) else {
            return PageOutcome::Skipped(SkipReason::MissingAnchor(profile.end_anchor));
        };
        if end_index <= start_index {
            return PageOutcome::Skipped(SkipReason::AnchorsOutOfOrder);
        }

        let accession = match parse_accession(&tokens, &profile.accession) {
            Ok(Some(accession)) => accession,
            Ok(None) => return PageOutcome::Skipped(SkipReason::MissingAccession),
            Err(e) => return PageOutcome::Malformed(e),
        };

        if registry.contains(&accession) {
            return PageOutcome::Duplicate {
                kind: profile.kind,
                accession,
            };
        }

        let mut window_start = start_index + profile.bounds.skip_after_start;
        if profile.offset_correction {
            window_start = self.corrector.adjust_start(&tokens, window_start);
        }
        let window_end = end_index.saturating_sub(profile.bounds.trim_before_end);

        let tissue_committee = if profile.tissue_committee {
            detect_tissue_committee(page_text)
        } else {
            None
        };

        let diagnosis = build_diagnosis(&tokens, window_start..window_end, profile.table);
        if diagnosis.trim().is_empty() {
            return PageOutcome::Skipped(SkipReason::EmptyDiagnosis);
        }

        registry.register(&accession);
        PageOutcome::Extracted(PathologyReport {
            accession,
            kind: profile.kind,
            tissue_committee,
            diagnosis,
            source_file: source_file.to_path_buf(),
            page_number,
        })
    }
}

fn log_outcome(outcome: &PageOutcome, page_number: usize, source_file: &Path) {
    match outcome {
        PageOutcome::Extracted(report) => {
            let tc = report
                .tissue_committee
                .map(|code| format!(" TC: {}", code))
                .unwrap_or_default();
            if report.kind == ReportKind::Supplemental {
                info!("Found supplemental report to: {}, reading report...", report.accession);
            } else {
                info!("Found {}, reading report...{}", report.accession, tc);
            }
        }
        PageOutcome::Duplicate { kind, accession } => {
            if *kind == ReportKind::Supplemental {
                info!("Found supplemental report to: {}, skipping (duplicate report)", accession);
            } else {
                info!("Found {}, skipping (duplicate report)", accession);
            }
        }
        PageOutcome::Skipped(reason) => {
            debug!(
                "No report on page {} of {}: {:?}",
                page_number,
                source_file.display(),
                reason
            );
        }
        PageOutcome::Malformed(e) => {
            warn!(
                "Skipping page {} of {}: {}",
                page_number,
                source_file.display(),
                e
            );
        }
        PageOutcome::Unsupported(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::offset::WordList;
    use crate::models::TissueCommitteeCode;
    use std::sync::Arc;

    fn extractor() -> ReportExtractor {
        ReportExtractor::new(OffsetCorrector::new(Arc::new(WordList::builtin())))
    }

    fn extract(family: ReportFamily, page: &str) -> PageOutcome {
        let mut registry = DeduplicationRegistry::new();
        extractor().extract_page(family, page, 1, Path::new("fax.pdf"), &mut registry)
    }

    fn surgical_page(accession: &str, diagnosis: &str) -> String {
        // ACCESSION# is followed by 14 accession and header tokens before the diagnosis
        let filler = [
            "Patient", "DOE", "JANE", "Collected", "01/02/2024", "Received", "01/03/2024",
            "Reported", "01/05/2024", "Physician", "SMITH", "FINAL", "DX:",
        ];
        let filler_len = 14 - accession.split_whitespace().count();
        format!(
            "AmeriPath Denver, ACCESSION# {} {} {} Primary Pathologist: John Roe MD",
            accession,
            filler[..filler_len].join(" "),
            diagnosis
        )
    }

    #[test]
    fn test_gyn_page_extraction() {
        let page = "GYN CYTOLOGY CCY 24 1001 PAP Results: HPV.mRNA Not Detected po \
                    Molecular testing performed";
        let report = extract(ReportFamily::GynCytology, page).into_report().unwrap();

        assert_eq!(report.accession.to_string(), "CCY: 24 1001");
        assert_eq!(
            report.diagnosis,
            "PAP and/or Molecular Results: HPV mRNA Not Detected. "
        );
        assert_eq!(report.kind, ReportKind::GynCytology);
        assert_eq!(report.tissue_committee, None);
    }

    #[test]
    fn test_dermatopathology_window_stops_before_signature_block() {
        let page = "Indianapolis, CSP 23 4567. DIAGNOSIS: Skin, left cheek: basal cell carcinoma \
                    Dr A Jones MD Electronic signature";
        let report = extract(ReportFamily::Dermatopathology, page).into_report().unwrap();

        assert_eq!(report.accession.number, 4567);
        assert_eq!(report.diagnosis, "Skin, left cheek: basal cell carcinoma ");
    }

    #[test]
    fn test_surgical_extraction_with_tissue_committee() {
        let page = surgical_page("(CSP 24 2468),", "Colon polyp TCO1: Nota malignancy");
        let report = extract(ReportFamily::Surgical, &page).into_report().unwrap();

        assert_eq!(report.accession.to_string(), "CSP: 24 2468");
        assert_eq!(report.kind, ReportKind::SurgicalPathology);
        assert_eq!(report.tissue_committee, Some(TissueCommitteeCode::Code1));
        assert_eq!(report.diagnosis, "Colon polyp TCO1: Not a malignancy ");
    }

    #[test]
    fn test_surgical_offset_correction_skips_spurious_token() {
        let page = surgical_page("(CSP 24-02468)", "zq#x Tubular adenoma");
        let report = extract(ReportFamily::Surgical, &page).into_report().unwrap();

        assert_eq!(report.accession.number, 2468);
        assert!(report.diagnosis.starts_with("Tubular adenoma"));
    }

    #[test]
    fn test_surgical_window_keeps_numbered_part() {
        let page = surgical_page("(CSP 24 2468),", "1. Colon, biopsy: Tubular adenoma");
        let report = extract(ReportFamily::Surgical, &page).into_report().unwrap();

        assert_eq!(report.diagnosis, "1. Colon, biopsy: Tubular adenoma ");
    }

    #[test]
    fn test_surgical_window_keeps_lettered_part() {
        let page = surgical_page("(CSP 24 2468),", "A. Skin, shave: Seborrheic keratosis");
        let report = extract(ReportFamily::Surgical, &page).into_report().unwrap();

        assert_eq!(report.diagnosis, "A. Skin, shave: Seborrheic keratosis ");
    }

    #[test]
    fn test_surgical_window_keeps_leading_english_word() {
        let page = surgical_page("(CSP 24 2468),", "Sessile serrated adenoma");
        let report = extract(ReportFamily::Surgical, &page).into_report().unwrap();

        assert_eq!(report.diagnosis, "Sessile serrated adenoma ");
    }

    #[test]
    fn test_supplemental_page_extraction() {
        let page = "MISMATCH REPAIR PROTEIN IMMUNOHISTOCHEMISTRY Supplemental to (CSP 24-01234) \
                    Interpretation MLH1 intact PMS2 intact Dr Electronically signed";
        let report = extract(ReportFamily::Surgical, page).into_report().unwrap();

        assert_eq!(report.kind, ReportKind::Supplemental);
        assert_eq!(report.accession.year, 2024);
        assert_eq!(report.accession.number, 1234);
        assert_eq!(report.diagnosis, "Interpretation MLH1 intact PMS2 intact ");
        assert_eq!(report.tissue_committee, None);
    }

    #[test]
    fn test_non_gyn_cytology_page_is_unsupported() {
        let page = "AmeriPath CCY 24 55 ACCESSION# Pathologist:";
        assert_eq!(
            extract(ReportFamily::Surgical, page),
            PageOutcome::Unsupported(ReportKind::NonGynCytology)
        );
    }

    #[test]
    fn test_missing_anchor_skips_page() {
        let page = "CCY 24 1001 Results: Negative";
        assert_eq!(
            extract(ReportFamily::GynCytology, page),
            PageOutcome::Skipped(SkipReason::MissingAnchor("Molecular"))
        );
    }

    #[test]
    fn test_anchors_out_of_order_skip_page() {
        let page = "CCY 24 1001 Molecular Results: Negative";
        assert_eq!(
            extract(ReportFamily::GynCytology, page),
            PageOutcome::Skipped(SkipReason::AnchorsOutOfOrder)
        );
    }

    #[test]
    fn test_missing_accession_skips_page() {
        let page = "Results: Negative Molecular";
        assert_eq!(
            extract(ReportFamily::GynCytology, page),
            PageOutcome::Skipped(SkipReason::MissingAccession)
        );
    }

    #[test]
    fn test_malformed_accession_is_recoverable() {
        let page = "CCY 24 l00l Results: Negative Molecular";
        assert!(matches!(
            extract(ReportFamily::GynCytology, page),
            PageOutcome::Malformed(ExtractionError::MalformedNumber { .. })
        ));
    }

    #[test]
    fn test_empty_window_skips_page() {
        let page = "Indianapolis, CSP 23 1 DIAGNOSIS: a b Electronic";
        assert_eq!(
            extract(ReportFamily::Dermatopathology, page),
            PageOutcome::Skipped(SkipReason::EmptyDiagnosis)
        );
    }

    #[test]
    fn test_duplicate_within_document() {
        let page = "CCY 24 1001 Results: Negative Molecular";
        let pages = vec![page.to_string(), page.to_string()];
        let extraction =
            extractor().extract_document(ReportFamily::GynCytology, &pages, Path::new("fax.pdf"));

        assert_eq!(extraction.reports.len(), 1);
        assert_eq!(extraction.reports[0].page_number, 1);
        assert_eq!(extraction.tally.duplicates, 1);
    }

    #[test]
    fn test_preamble_only_report_is_registered() {
        let mut registry = DeduplicationRegistry::new();
        let extractor = extractor();
        let malformed = "CCY 24 1001 Results: Molecular";
        let good = "CCY 24 1001 Results: Negative Molecular";

        let first = extractor.extract_page(
            ReportFamily::GynCytology,
            malformed,
            1,
            Path::new("fax.pdf"),
            &mut registry,
        );
        assert!(first.into_report().is_some(), "preamble alone is a non-empty diagnosis");

        let second = extractor.extract_page(
            ReportFamily::GynCytology,
            good,
            2,
            Path::new("fax.pdf"),
            &mut registry,
        );
        assert!(matches!(second, PageOutcome::Duplicate { .. }));
    }

    #[test]
    fn test_surgical_page_profile_selection() {
        assert!(matches!(
            ReportFamily::Surgical.page_profile("plain surgical page"),
            PageProfile::Extract(profile) if profile.kind == ReportKind::SurgicalPathology
        ));
        assert!(matches!(
            ReportFamily::Surgical.page_profile("MISMATCH REPAIR PROTEIN IMMUNOHISTOCHEMISTRY"),
            PageProfile::Extract(profile) if profile.kind == ReportKind::Supplemental
        ));
    }
}
