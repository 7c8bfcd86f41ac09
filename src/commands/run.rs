use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::extraction::{OffsetCorrector, ReportExtractor, WordList};
use crate::ingestion::{ExtractionPipeline, RunOutput};
use crate::ocr::{OcrService, PageReader};
use crate::services::report_log::ReportLogWriter;
use crate::services::search_index::{ReportIndex, SqliteIndex};

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub write_log: bool,
    pub write_index: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            write_log: true,
            write_index: true,
        }
    }
}

pub struct RunResult {
    pub output: RunOutput,
    pub log_path: Option<PathBuf>,
    /// Index built from this run's records, in memory when the index is not written
    pub index: SqliteIndex,
}

/// Word list for the surgical window correction: the built-in list merged
/// with the configured file, or with the host's system word list by default
pub fn load_word_list(config: &Config) -> Result<WordList> {
    let words = match &config.dictionary_path {
        Some(path) => {
            let mut words = WordList::builtin();
            words.extend(WordList::from_file(path)?);
            words
        }
        None => WordList::with_system_words(),
    };
    if words.is_empty() {
        warn!("Word list is empty, surgical diagnoses may lose their first word");
    }
    Ok(words)
}

pub fn build_extractor(config: &Config) -> Result<ReportExtractor> {
    let words = load_word_list(config)?;
    Ok(ReportExtractor::new(OffsetCorrector::new(Arc::new(words))))
}

/// Extract every document under the configured reports directory, then
/// append the dated log and rebuild the index as requested.
pub async fn run_extraction(config: &Config, options: RunOptions) -> Result<RunResult> {
    let reader: Arc<dyn PageReader> = Arc::new(OcrService::new_with_config(config.ocr_config()));
    run_with_reader(config, options, reader).await
}

pub async fn run_with_reader(
    config: &Config,
    options: RunOptions,
    reader: Arc<dyn PageReader>,
) -> Result<RunResult> {
    let extractor = build_extractor(config)?;
    let pipeline = ExtractionPipeline::new(reader, extractor, config.concurrent_documents)
        .with_excluded_paths(vec![config.index_path.clone()]);

    let output = pipeline
        .run(&config.reports_dir)
        .await
        .context("Extraction run failed")?;
    output.summary.log();

    let log_path = if options.write_log {
        let writer = ReportLogWriter::new(&config.log_dir);
        Some(writer.append(&output.reports).await?)
    } else {
        None
    };

    let index = if options.write_index {
        SqliteIndex::create(&config.index_path).await?
    } else {
        info!("Index not written");
        SqliteIndex::in_memory().await?
    };
    index
        .add_reports(&output.reports)
        .await
        .context("Failed to index extracted reports")?;
    if options.write_index {
        info!(
            "Indexed {} report(s) into {}",
            output.reports.len(),
            config.index_path.display()
        );
    }

    Ok(RunResult {
        output,
        log_path,
        index,
    })
}
