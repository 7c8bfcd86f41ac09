use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pathsearch::commands::classify::classify_file;
use pathsearch::commands::run::{run_extraction, RunOptions};
use pathsearch::commands::search::{interactive_search, render_response, search_saved_index};
use pathsearch::config::Config;
use pathsearch::ocr::OcrService;

#[derive(Parser)]
#[command(name = "pathsearch")]
#[command(about = "Extract accession numbers and diagnoses from faxed pathology reports")]
struct Cli {
    #[command(flatten)]
    overrides: ConfigOverrides,

    #[command(subcommand)]
    command: Command,
}

/// Command line overrides for environment configuration
#[derive(Args)]
struct ConfigOverrides {
    /// Directory holding the faxed reports
    #[arg(long, global = true)]
    reports_dir: Option<PathBuf>,

    /// Directory for the dated report log
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[arg(long, global = true)]
    index_path: Option<PathBuf>,

    /// pdftoppm executable
    #[arg(long, global = true)]
    pdftoppm: Option<PathBuf>,

    #[arg(long, global = true)]
    ocr_language: Option<String>,

    /// Rasterization resolution for PDF pages
    #[arg(long, global = true)]
    dpi: Option<u32>,

    /// Word list used to detect spurious OCR tokens, one word per line
    #[arg(long, global = true)]
    dictionary: Option<PathBuf>,

    /// Documents processed at the same time
    #[arg(long, global = true)]
    concurrency: Option<usize>,
}

impl ConfigOverrides {
    fn apply(self, mut config: Config) -> Config {
        if let Some(dir) = self.reports_dir {
            config = config.with_reports_dir(dir);
        }
        if let Some(dir) = self.log_dir {
            config.log_dir = dir;
        }
        if let Some(path) = self.index_path {
            config.index_path = path;
        }
        if let Some(path) = self.pdftoppm {
            config.pdftoppm_path = path;
        }
        if let Some(language) = self.ocr_language {
            config.ocr_language = language;
        }
        if let Some(dpi) = self.dpi {
            config.raster_dpi = dpi;
        }
        if let Some(path) = self.dictionary {
            config.dictionary_path = Some(path);
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrent_documents = concurrency;
        }
        config
    }
}

#[derive(Subcommand)]
enum Command {
    /// Extract every report in the reports directory
    Run {
        /// Do not append to the dated log
        #[arg(long)]
        no_log: bool,

        /// Do not rewrite the search index
        #[arg(long)]
        no_index: bool,

        /// Prompt for diagnosis queries after extraction
        #[arg(short, long)]
        interactive: bool,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Query the index built by the last run
    Search {
        query: String,

        /// Maximum number of hits
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Print the report family of one document
    Classify { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = cli.overrides.apply(Config::from_env()?);
    config.validate()?;

    match cli.command {
        Command::Run {
            no_log,
            no_index,
            interactive,
            json,
        } => {
            info!("🚀 Starting pathology report extraction");
            config.log_summary();

            let options = RunOptions {
                write_log: !no_log,
                write_index: !no_index,
            };
            let result = run_extraction(&config, options).await?;

            if let Some(path) = &result.log_path {
                info!("📝 Appended {} record(s) to {}", result.output.reports.len(), path.display());
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&result.output.summary)?);
            }
            if interactive {
                interactive_search(&result.index).await?;
            }
            result.index.close().await;
        }
        Command::Search { query, limit } => {
            let response = search_saved_index(&config.index_path, &query, limit)
                .await
                .with_context(|| format!("Search for '{}' failed", query))?;
            for line in render_response(&response) {
                println!("{}", line);
            }
        }
        Command::Classify { file } => {
            let reader = OcrService::new_with_config(config.ocr_config());
            match classify_file(&reader, &file).await? {
                Some(family) => println!("{}: {}", file.display(), family),
                None => println!("{}: not a recognized pathology report", file.display()),
            }
        }
    }

    Ok(())
}
