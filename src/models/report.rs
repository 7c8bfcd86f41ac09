use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Issuing unit of an accession
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessionArea {
    /// Cytology area
    #[serde(rename = "CCY")]
    Ccy,
    /// Surgical pathology area
    #[serde(rename = "CSP")]
    Csp,
}

impl AccessionArea {
    pub fn code(&self) -> &'static str {
        match self {
            AccessionArea::Ccy => "CCY",
            AccessionArea::Csp => "CSP",
        }
    }
}

impl fmt::Display for AccessionArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Unique identifier of one pathology case.
///
/// The year is always stored with four digits. Two-digit tokens are mapped
/// with a fixed `+2000`, there is no century rollover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Accession {
    pub area: AccessionArea,
    pub year: u16,
    pub number: u32,
}

impl Accession {
    pub fn new(area: AccessionArea, year: u16, number: u32) -> Self {
        Self { area, year, number }
    }

    /// Two-digit year as it appears on the report
    pub fn short_year(&self) -> u16 {
        self.year % 100
    }
}

/// Renders the stable accession string, e.g. `CSP: 24 1234`
impl fmt::Display for Accession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:02} {}", self.area, self.short_year(), self.number)
    }
}

/// Tissue committee classification, only assigned to surgical pathology reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TissueCommitteeCode {
    #[serde(rename = "1")]
    Code1,
    #[serde(rename = "7")]
    Code7,
}

impl TissueCommitteeCode {
    pub fn value(&self) -> u8 {
        match self {
            TissueCommitteeCode::Code1 => 1,
            TissueCommitteeCode::Code7 => 7,
        }
    }
}

impl fmt::Display for TissueCommitteeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// The report layout a page was read with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    GynCytology,
    Dermatopathology,
    SurgicalPathology,
    NonGynCytology,
    Supplemental,
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::GynCytology => write!(f, "GYN cytology"),
            ReportKind::Dermatopathology => write!(f, "dermatopathology"),
            ReportKind::SurgicalPathology => write!(f, "surgical pathology"),
            ReportKind::NonGynCytology => write!(f, "non-GYN cytology"),
            ReportKind::Supplemental => write!(f, "supplemental"),
        }
    }
}

/// One structured pathology report extracted from a single page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathologyReport {
    pub accession: Accession,
    pub kind: ReportKind,
    pub tissue_committee: Option<TissueCommitteeCode>,
    pub diagnosis: String,
    pub source_file: PathBuf,
    /// 1-based page index within the source file
    pub page_number: usize,
}

impl PathologyReport {
    /// Line written to the dated report log
    pub fn log_line(&self) -> String {
        format!("{} {}\n", self.accession, self.diagnosis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accession_string_format() {
        let accession = Accession::new(AccessionArea::Csp, 2024, 1234);
        assert_eq!(accession.to_string(), "CSP: 24 1234");
    }

    #[test]
    fn test_accession_string_pads_single_digit_year() {
        let accession = Accession::new(AccessionArea::Ccy, 2005, 77);
        assert_eq!(accession.to_string(), "CCY: 05 77");
    }

    #[test]
    fn test_log_line_format() {
        let report = PathologyReport {
            accession: Accession::new(AccessionArea::Ccy, 2023, 4410),
            kind: ReportKind::GynCytology,
            tissue_committee: None,
            diagnosis: "PAP and/or Molecular Results: Negative ".to_string(),
            source_file: PathBuf::from("/reports/fax.pdf"),
            page_number: 2,
        };

        assert_eq!(
            report.log_line(),
            "CCY: 23 4410 PAP and/or Molecular Results: Negative \n"
        );
    }

    #[test]
    fn test_tissue_committee_values() {
        assert_eq!(TissueCommitteeCode::Code1.value(), 1);
        assert_eq!(TissueCommitteeCode::Code7.to_string(), "7");
    }
}
