use crate::models::TissueCommitteeCode;

/// Marker spellings seen in OCR output, checked in order against the full page
/// text. Variants cover a dropped or misplaced colon and `O` read for `0`.
const TISSUE_COMMITTEE_MARKERS: &[(&str, TissueCommitteeCode)] = &[
    ("TCO1:", TissueCommitteeCode::Code1),
    ("TC code 1", TissueCommitteeCode::Code1),
    ("TC:O1", TissueCommitteeCode::Code1),
    ("TCO7:", TissueCommitteeCode::Code7),
    ("TCO07 :", TissueCommitteeCode::Code7),
    ("TC code 7", TissueCommitteeCode::Code7),
    ("TC:O7", TissueCommitteeCode::Code7),
];

/// Tissue committee code of a surgical pathology page, if one is marked
pub fn detect_tissue_committee(page_text: &str) -> Option<TissueCommitteeCode> {
    TISSUE_COMMITTEE_MARKERS
        .iter()
        .find(|(marker, _)| page_text.contains(marker))
        .map(|(_, code)| *code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_code_1_variants() {
        for text in ["x TCO1: Neoplasm", "see TC code 1 here", "TC:O1 malignant"] {
            assert_eq!(detect_tissue_committee(text), Some(TissueCommitteeCode::Code1), "{}", text);
        }
    }

    #[test]
    fn test_detects_code_7_variants() {
        for text in ["TCO7: benign", "TCO07 : benign", "TC code 7", "TC:O7"] {
            assert_eq!(detect_tissue_committee(text), Some(TissueCommitteeCode::Code7), "{}", text);
        }
    }

    #[test]
    fn test_code_1_wins_when_both_present() {
        assert_eq!(
            detect_tissue_committee("TCO7: earlier TCO1: later"),
            Some(TissueCommitteeCode::Code1)
        );
    }

    #[test]
    fn test_absent_marker() {
        assert_eq!(detect_tissue_committee("TC code pending"), None);
        assert_eq!(detect_tissue_committee(""), None);
    }
}
