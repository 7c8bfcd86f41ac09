use super::family::ReportFamily;

/// First-page signatures, checked in order. Every marker of an entry must be
/// present for it to match.
const FAMILY_SIGNATURES: &[(&[&str], ReportFamily)] = &[
    (&["CYTOLOGY"], ReportFamily::GynCytology),
    (&["Indianapolis,"], ReportFamily::Dermatopathology),
    (&["Denver,", "AmeriPath"], ReportFamily::Surgical),
];

/// Pick the report family of a document from its first page.
///
/// `None` means the document is not an anatomic pathology fax this tool reads.
pub fn classify_first_page(first_page: &str) -> Option<ReportFamily> {
    FAMILY_SIGNATURES
        .iter()
        .find(|(markers, _)| markers.iter().all(|marker| first_page.contains(marker)))
        .map(|(_, family)| *family)
}

pub fn classify_document(pages: &[String]) -> Option<ReportFamily> {
    pages.first().and_then(|page| classify_first_page(page))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cytology_signature() {
        assert_eq!(
            classify_first_page("GYN CYTOLOGY REPORT"),
            Some(ReportFamily::GynCytology)
        );
    }

    #[test]
    fn test_dermatopathology_signature() {
        assert_eq!(
            classify_first_page("Dermpath Lab Indianapolis, IN"),
            Some(ReportFamily::Dermatopathology)
        );
    }

    #[test]
    fn test_surgical_signature_needs_both_markers() {
        assert_eq!(
            classify_first_page("AmeriPath Central Lab Denver, CO"),
            Some(ReportFamily::Surgical)
        );
        assert_eq!(classify_first_page("AmeriPath Central Lab"), None);
        assert_eq!(classify_first_page("Denver, CO"), None);
    }

    #[test]
    fn test_first_match_wins() {
        assert_eq!(
            classify_first_page("AmeriPath Denver, NON-GYN CYTOLOGY Indianapolis,"),
            Some(ReportFamily::GynCytology)
        );
    }

    #[test]
    fn test_only_first_page_is_inspected() {
        let pages = vec!["cover sheet".to_string(), "GYN CYTOLOGY".to_string()];
        assert_eq!(classify_document(&pages), None);
        assert_eq!(classify_document(&[]), None);
    }
}
