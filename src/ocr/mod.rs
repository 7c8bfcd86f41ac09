pub mod error;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

use crate::ocr::error::OcrError;
use crate::utils::ocr::{document_kind_for_path, DocumentKind};

#[cfg(feature = "ocr")]
use tesseract::Tesseract;

/// Page separator written by `pdftotext` and most text exporters
const PAGE_SEPARATOR: char = '\u{000C}';

/// Source of per-page text for one document.
///
/// Pages are returned in document order. A page that OCR could not make sense
/// of is still returned (possibly empty) so page numbering stays stable.
#[async_trait]
pub trait PageReader: Send + Sync {
    async fn read_pages(&self, path: &Path) -> Result<Vec<String>, OcrError>;
}

/// Configuration for the OCR service
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// `pdftoppm` executable used to rasterize PDFs
    pub pdftoppm_path: PathBuf,
    /// Tesseract language, e.g. "eng"
    pub language: String,
    /// Rasterization resolution
    pub dpi: u32,
    /// Directory holding `*.traineddata`, Tesseract's default when unset
    pub tessdata_dir: Option<PathBuf>,
    /// Temporary directory for page images
    pub temp_dir: PathBuf,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            pdftoppm_path: PathBuf::from("pdftoppm"),
            language: "eng".to_string(),
            dpi: 200,
            tessdata_dir: None,
            temp_dir: std::env::var("TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| std::env::temp_dir()),
        }
    }
}

/// Turns scanned faxes into page text: PDFs are rasterized with `pdftoppm`
/// and every page image goes through Tesseract; text exports are split on
/// form feeds.
pub struct OcrService {
    config: OcrConfig,
    scratch_counter: AtomicU64,
}

impl OcrService {
    pub fn new() -> Self {
        Self::new_with_config(OcrConfig::default())
    }

    /// Create OCR service with configuration
    pub fn new_with_config(config: OcrConfig) -> Self {
        Self {
            config,
            scratch_counter: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    pub async fn extract_text_from_image(&self, file_path: &Path) -> Result<String, OcrError> {
        #[cfg(feature = "ocr")]
        {
            let path = file_path.to_path_buf();
            let language = self.config.language.clone();
            let tessdata = self
                .config
                .tessdata_dir
                .as_ref()
                .map(|dir| dir.to_string_lossy().to_string());

            tokio::task::spawn_blocking(move || {
                recognize_image(&path, tessdata.as_deref(), &language)
            })
            .await
            .map_err(|e| OcrError::RecognitionFailed {
                path: file_path.to_path_buf(),
                details: format!("OCR task failed: {}", e),
            })?
        }

        #[cfg(not(feature = "ocr"))]
        {
            let _ = file_path;
            Err(OcrError::TesseractNotInstalled)
        }
    }

    pub async fn extract_pages_from_pdf(&self, file_path: &Path) -> Result<Vec<String>, OcrError> {
        let scratch_dir = self.scratch_dir();
        tokio::fs::create_dir_all(&scratch_dir)
            .await
            .map_err(|e| OcrError::io(&scratch_dir, e))?;

        let result = self.ocr_rasterized_pages(file_path, &scratch_dir).await;

        if let Err(e) = tokio::fs::remove_dir_all(&scratch_dir).await {
            warn!("Failed to remove page images in {}: {}", scratch_dir.display(), e);
        }

        result
    }

    async fn ocr_rasterized_pages(
        &self,
        file_path: &Path,
        scratch_dir: &Path,
    ) -> Result<Vec<String>, OcrError> {
        let page_images = self.rasterize_pdf(file_path, scratch_dir).await?;
        debug!("Rasterized {} into {} page(s)", file_path.display(), page_images.len());

        let mut pages = Vec::with_capacity(page_images.len());
        for image in &page_images {
            pages.push(self.extract_text_from_image(image).await?);
        }
        Ok(pages)
    }

    /// Render every page to PNG and return the images in page order
    async fn rasterize_pdf(
        &self,
        file_path: &Path,
        scratch_dir: &Path,
    ) -> Result<Vec<PathBuf>, OcrError> {
        let output = tokio::process::Command::new(&self.config.pdftoppm_path)
            .arg("-r")
            .arg(self.config.dpi.to_string())
            .arg("-png")
            .arg(file_path)
            .arg(scratch_dir.join("page"))
            .output()
            .await
            .map_err(|e| OcrError::RasterizationFailed {
                path: file_path.to_path_buf(),
                details: format!(
                    "could not run {}: {}",
                    self.config.pdftoppm_path.display(),
                    e
                ),
            })?;

        if !output.status.success() {
            return Err(OcrError::RasterizationFailed {
                path: file_path.to_path_buf(),
                details: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let mut entries = tokio::fs::read_dir(scratch_dir)
            .await
            .map_err(|e| OcrError::io(scratch_dir, e))?;
        let mut images = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| OcrError::io(scratch_dir, e))?
        {
            let path = entry.path();
            if let Some(page) = page_image_number(&path) {
                images.push((page, path));
            }
        }

        if images.is_empty() {
            return Err(OcrError::NoPages {
                path: file_path.to_path_buf(),
            });
        }

        images.sort_by_key(|(page, _)| *page);
        Ok(images.into_iter().map(|(_, path)| path).collect())
    }

    pub async fn read_text_pages(&self, file_path: &Path) -> Result<Vec<String>, OcrError> {
        let text = tokio::fs::read_to_string(file_path)
            .await
            .map_err(|e| OcrError::io(file_path, e))?;
        Ok(split_text_pages(&text))
    }

    fn scratch_dir(&self) -> PathBuf {
        let sequence = self.scratch_counter.fetch_add(1, Ordering::Relaxed);
        self.config
            .temp_dir
            .join(format!("pathsearch_{}_{}", std::process::id(), sequence))
    }
}

impl Default for OcrService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageReader for OcrService {
    async fn read_pages(&self, path: &Path) -> Result<Vec<String>, OcrError> {
        match document_kind_for_path(path) {
            Some(DocumentKind::Pdf) => self.extract_pages_from_pdf(path).await,
            Some(DocumentKind::Image) => Ok(vec![self.extract_text_from_image(path).await?]),
            Some(DocumentKind::Text) => self.read_text_pages(path).await,
            None => Err(OcrError::UnsupportedDocument {
                path: path.to_path_buf(),
            }),
        }
    }
}

#[cfg(feature = "ocr")]
fn recognize_image(path: &Path, tessdata: Option<&str>, language: &str) -> Result<String, OcrError> {
    let image_path = path.to_str().ok_or_else(|| OcrError::RecognitionFailed {
        path: path.to_path_buf(),
        details: "path is not valid UTF-8".to_string(),
    })?;

    let mut tesseract = Tesseract::new(tessdata, Some(language))
        .map_err(|e| OcrError::InitializationFailed {
            details: e.to_string(),
        })?
        .set_image(image_path)
        .map_err(|e| OcrError::RecognitionFailed {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;

    tesseract.get_text().map_err(|e| OcrError::RecognitionFailed {
        path: path.to_path_buf(),
        details: format!("Failed to extract text: {}", e),
    })
}

/// Split exported text into pages. A trailing separator does not start a page.
pub fn split_text_pages(text: &str) -> Vec<String> {
    let mut pages: Vec<String> = text.split(PAGE_SEPARATOR).map(str::to_string).collect();
    if pages.len() > 1 && pages.last().is_some_and(|page| page.trim().is_empty()) {
        pages.pop();
    }
    pages
}

/// Page number of a `pdftoppm` output file (`page-1.png`, `page-07.png`)
fn page_image_number(path: &Path) -> Option<usize> {
    if path.extension().and_then(|ext| ext.to_str()) != Some("png") {
        return None;
    }
    path.file_stem()?
        .to_str()?
        .rsplit_once('-')
        .and_then(|(_, number)| number.parse().ok())
}
