use anyhow::Result;
use std::path::Path;

use crate::extraction::{classify_document, ReportFamily};
use crate::ocr::PageReader;

/// Report family of a single document, `None` when it is not a known report
pub async fn classify_file(reader: &dyn PageReader, path: &Path) -> Result<Option<ReportFamily>> {
    let pages = reader.read_pages(path).await?;
    Ok(classify_document(&pages))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::OcrService;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_classify_text_export() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("derm.txt");
        std::fs::write(&path, "Dermpath Lab Indianapolis, IN\u{000C}page two").unwrap();

        let family = classify_file(&OcrService::new(), &path).await.unwrap();
        assert_eq!(family, Some(ReportFamily::Dermatopathology));
    }

    #[tokio::test]
    async fn test_unreadable_file_is_an_error() {
        let result = classify_file(&OcrService::new(), Path::new("/nonexistent/fax.txt")).await;
        assert!(result.is_err());
    }
}
