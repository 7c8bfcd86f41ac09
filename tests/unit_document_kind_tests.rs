/*!
 * Unit Tests for Document Kind Routing
 *
 * These tests verify the utility functions that decide whether a file in the
 * reports directory is rasterized, OCRed directly, or read as exported text.
 */

#[cfg(test)]
mod tests {
    use pathsearch::utils::ocr::{content_matches_kind, document_kind, DocumentKind};

    #[test]
    fn test_pdf_files_are_rasterized() {
        assert_eq!(document_kind("fax.pdf"), Some(DocumentKind::Pdf));
        assert_eq!(document_kind("FAX.PDF"), Some(DocumentKind::Pdf), "case insensitive");
    }

    #[test]
    fn test_image_files_need_ocr() {
        for name in ["scan.png", "scan.jpg", "scan.JPEG", "scan.tif", "scan.tiff", "scan.bmp"] {
            assert_eq!(document_kind(name), Some(DocumentKind::Image), "{} should be an image", name);
        }
    }

    #[test]
    fn test_text_exports_skip_ocr() {
        assert_eq!(document_kind("fax.txt"), Some(DocumentKind::Text));
    }

    #[test]
    fn test_unsupported_files() {
        for name in ["notes.docx", "report_index.db", "archive.tar.gz", "README", ".hidden"] {
            assert_eq!(document_kind(name), None, "{} should not be a document", name);
        }
    }

    #[test]
    fn test_content_signatures() {
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert!(content_matches_kind(b"%PDF-1.7\n", DocumentKind::Pdf));
        assert!(!content_matches_kind(b"plain text", DocumentKind::Pdf));
        assert!(content_matches_kind(&png, DocumentKind::Image));
        assert!(!content_matches_kind(b"%PDF-1.7\n", DocumentKind::Image));
        assert!(content_matches_kind(b"", DocumentKind::Text));
    }
}
