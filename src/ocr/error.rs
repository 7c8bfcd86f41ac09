use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Unsupported document type: {}", .path.display())]
    UnsupportedDocument { path: PathBuf },

    #[error("Tesseract support is not compiled in. Rebuild with the `ocr` feature")]
    TesseractNotInstalled,

    #[error("Failed to initialize Tesseract: {details}")]
    InitializationFailed { details: String },

    #[error("Text recognition failed for {}: {details}", .path.display())]
    RecognitionFailed { path: PathBuf, details: String },

    #[error("Failed to rasterize {}: {details}", .path.display())]
    RasterizationFailed { path: PathBuf, details: String },

    #[error("{} produced no pages", .path.display())]
    NoPages { path: PathBuf },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl OcrError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        OcrError::Io {
            path: path.into(),
            source,
        }
    }
}
