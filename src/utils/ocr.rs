/*!
 * OCR Utility Functions
 *
 * Helper functions to determine how a file in the reports directory is turned
 * into page text: rasterized and OCRed, OCRed directly, or read as text.
 */

use std::path::Path;

/// How a source document is converted into page text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Multi-page PDF, rasterized then OCRed page by page
    Pdf,
    /// Single scanned page
    Image,
    /// Already extracted text, pages separated by form feeds
    Text,
}

/// Determine the document kind from the filename extension
pub fn document_kind(filename: &str) -> Option<DocumentKind> {
    let extension = extract_extension(filename);
    match extension.as_str() {
        ".pdf" => Some(DocumentKind::Pdf),
        ".png" | ".jpg" | ".jpeg" | ".tif" | ".tiff" | ".bmp" => Some(DocumentKind::Image),
        ".txt" => Some(DocumentKind::Text),
        _ => None,
    }
}

pub fn document_kind_for_path(path: &Path) -> Option<DocumentKind> {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(document_kind)
}

/// Check the leading bytes of a file against its claimed kind.
///
/// Text files have no signature and always pass.
pub fn content_matches_kind(header: &[u8], kind: DocumentKind) -> bool {
    match kind {
        DocumentKind::Pdf => infer::archive::is_pdf(header),
        DocumentKind::Image => infer::get(header)
            .map(|t| t.matcher_type() == infer::MatcherType::Image)
            .unwrap_or(false),
        DocumentKind::Text => true,
    }
}

/// Extract file extension from filename (lowercased)
fn extract_extension(filename: &str) -> String {
    if let Some(pos) = filename.rfind('.') {
        filename[pos..].to_lowercase()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scans_are_pdf_or_image() {
        assert_eq!(document_kind("fax_0412.pdf"), Some(DocumentKind::Pdf));
        assert_eq!(document_kind("scan.TIFF"), Some(DocumentKind::Image)); // Test case insensitive
    }

    #[test]
    fn test_text_exports_are_text() {
        assert_eq!(document_kind("fax_0412.TXT"), Some(DocumentKind::Text));
    }

    #[test]
    fn test_unknown_files_have_no_kind() {
        assert_eq!(document_kind("report_index.db"), None);
        assert_eq!(document_kind("README"), None);
        assert_eq!(document_kind("notes.docx"), None);
    }

    #[test]
    fn test_document_kind_for_path() {
        assert_eq!(
            document_kind_for_path(Path::new("/reports/in/fax.PDF")),
            Some(DocumentKind::Pdf)
        );
    }

    #[test]
    fn test_content_signature_check() {
        assert!(content_matches_kind(b"%PDF-1.4\n%", DocumentKind::Pdf));
        assert!(!content_matches_kind(b"not a pdf", DocumentKind::Pdf));
        assert!(content_matches_kind(
            &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A],
            DocumentKind::Image
        ));
        assert!(content_matches_kind(b"anything", DocumentKind::Text));
    }
}
