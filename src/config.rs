use std::env;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

use crate::ocr::OcrConfig;

pub const DEFAULT_REPORTS_DIR: &str = "./reports";
pub const INDEX_FILE_NAME: &str = "report_index.db";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{name} must be greater than zero")]
    Zero { name: &'static str },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory scanned for faxed report files
    pub reports_dir: PathBuf,
    /// Directory receiving the dated report log
    pub log_dir: PathBuf,
    pub index_path: PathBuf,
    pub pdftoppm_path: PathBuf,
    pub ocr_language: String,
    pub raster_dpi: u32,
    pub tessdata_dir: Option<PathBuf>,
    pub temp_dir: PathBuf,
    /// Extra word list for the surgical window correction, system word list when unset
    pub dictionary_path: Option<PathBuf>,
    /// Documents processed at the same time
    pub concurrent_documents: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let reports_dir = PathBuf::from(
            env::var("REPORTS_DIR").unwrap_or_else(|_| DEFAULT_REPORTS_DIR.to_string()),
        );
        let log_dir = env::var("LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| reports_dir.clone());
        let index_path = env::var("INDEX_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| reports_dir.join(INDEX_FILE_NAME));

        let config = Config {
            log_dir,
            index_path,
            pdftoppm_path: PathBuf::from(
                env::var("PDFTOPPM_PATH").unwrap_or_else(|_| "pdftoppm".to_string()),
            ),
            ocr_language: env::var("OCR_LANGUAGE").unwrap_or_else(|_| "eng".to_string()),
            raster_dpi: parse_positive("RASTER_DPI", env::var("RASTER_DPI").ok(), 200)?,
            tessdata_dir: env::var("TESSDATA_DIR").ok().map(PathBuf::from),
            temp_dir: env::var("TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| env::temp_dir()),
            dictionary_path: env::var("DICTIONARY_PATH").ok().map(PathBuf::from),
            concurrent_documents: parse_positive(
                "CONCURRENT_DOCUMENTS",
                env::var("CONCURRENT_DOCUMENTS").ok(),
                default_concurrency(),
            )?,
            reports_dir,
        };

        Ok(config)
    }

    /// Point the run at another reports directory. Log and index locations
    /// follow unless they were set explicitly.
    pub fn with_reports_dir(mut self, reports_dir: PathBuf) -> Self {
        if self.log_dir == self.reports_dir {
            self.log_dir = reports_dir.clone();
        }
        if self.index_path == self.reports_dir.join(INDEX_FILE_NAME) {
            self.index_path = reports_dir.join(INDEX_FILE_NAME);
        }
        self.reports_dir = reports_dir;
        self
    }

    pub fn ocr_config(&self) -> OcrConfig {
        OcrConfig {
            pdftoppm_path: self.pdftoppm_path.clone(),
            language: self.ocr_language.clone(),
            dpi: self.raster_dpi,
            tessdata_dir: self.tessdata_dir.clone(),
            temp_dir: self.temp_dir.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.raster_dpi == 0 {
            return Err(ConfigError::Zero { name: "RASTER_DPI" });
        }
        if self.concurrent_documents == 0 {
            return Err(ConfigError::Zero {
                name: "CONCURRENT_DOCUMENTS",
            });
        }
        Ok(())
    }

    pub fn log_summary(&self) {
        info!("📁 Reports directory: {}", self.reports_dir.display());
        info!("📝 Log directory: {}", self.log_dir.display());
        info!("🔍 Index file: {}", self.index_path.display());
        info!(
            "🧠 OCR: {} at {} dpi via {}",
            self.ocr_language,
            self.raster_dpi,
            self.pdftoppm_path.display()
        );
        match &self.dictionary_path {
            Some(path) => info!("📖 Dictionary: {}", path.display()),
            None => info!("📖 Dictionary: built-in and system word lists"),
        }
        info!("⚙️  Concurrent documents: {}", self.concurrent_documents);
    }
}

fn parse_positive<T>(name: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialEq + Default,
{
    let Some(raw) = value else {
        return Ok(default);
    };

    let parsed = raw
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidNumber {
            name,
            value: raw.clone(),
        })?;

    if parsed == T::default() {
        return Err(ConfigError::Zero { name });
    }
    Ok(parsed)
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|cores| cores.get())
        .unwrap_or(1)
}
