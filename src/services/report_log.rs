//! Dated plain-text log of extracted reports.
//!
//! One file per run date (`log_YYYY-MM-DD.txt`), appended to by every run on
//! that day, one line per report: `<area>: <yy> <number> <diagnosis>`.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::models::PathologyReport;

/// Whether `file_name` is a dated report log written by [`ReportLogWriter`]
pub fn is_report_log_name(file_name: &str) -> bool {
    file_name
        .strip_prefix("log_")
        .and_then(|rest| rest.strip_suffix(".txt"))
        .is_some_and(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok())
}

pub struct ReportLogWriter {
    log_dir: PathBuf,
}

impl ReportLogWriter {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
        }
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn log_path_for(&self, date: NaiveDate) -> PathBuf {
        self.log_dir.join(format!("log_{}.txt", date.format("%Y-%m-%d")))
    }

    /// Append `reports` to today's log and return the log path
    pub async fn append(&self, reports: &[PathologyReport]) -> Result<PathBuf> {
        self.append_for_date(reports, Local::now().date_naive()).await
    }

    pub async fn append_for_date(
        &self,
        reports: &[PathologyReport],
        date: NaiveDate,
    ) -> Result<PathBuf> {
        let path = self.log_path_for(date);
        info!("Writing to logfile: {}", path.display());

        tokio::fs::create_dir_all(&self.log_dir)
            .await
            .with_context(|| format!("Failed to create log directory {}", self.log_dir.display()))?;

        let contents: String = reports.iter().map(PathologyReport::log_line).collect();

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        file.write_all(contents.as_bytes())
            .await
            .with_context(|| format!("Failed to write log file {}", path.display()))?;
        file.flush().await?;

        Ok(path)
    }
}
