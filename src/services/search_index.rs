//! Full-text index over extracted diagnoses, stored in an SQLite FTS5 table.
//!
//! Query syntax over the diagnosis field:
//!
//! * bare terms are combined with AND (`tubular adenoma`)
//! * `OR` separates alternatives (`melanoma OR nevus`)
//! * `"quoted text"` matches a phrase
//! * `-term` or `NOT term` excludes matches
//!
//! User input never reaches FTS5 verbatim: [`sanitize_fts_query`] rebuilds it
//! from quoted word tokens, so punctuation such as `HPV.mRNA` becomes the
//! phrase `"HPV mRNA"`. Hits are ordered by BM25.

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;
use thiserror::Error;
use tracing::debug;

use crate::models::{IndexedReport, PathologyReport, SearchHit, SearchRequest, SearchResponse};

static WORD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{L}\p{N}]+").expect("word pattern is valid"));

/// A quoted phrase (closing quote optional) or a run of non-space characters
static QUERY_PART: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"]*)"?|(\S+)"#).expect("query pattern is valid"));

const CREATE_TABLE: &str = "CREATE VIRTUAL TABLE IF NOT EXISTS reports USING fts5(\
     acc UNINDEXED, diagnosis, filepath UNINDEXED, pagenum UNINDEXED)";

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("query contains no search terms")]
    EmptyQuery,

    #[error("query only excludes terms, add at least one term to match")]
    OnlyExclusions,

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("index database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Index collaborator: stores reports and answers diagnosis queries
#[async_trait]
pub trait ReportIndex: Send + Sync {
    async fn add_documents(&self, documents: &[IndexedReport]) -> Result<(), IndexError>;

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, IndexError>;

    async fn add_reports(&self, reports: &[PathologyReport]) -> Result<(), IndexError> {
        let documents: Vec<IndexedReport> = reports.iter().map(IndexedReport::from).collect();
        self.add_documents(&documents).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum QueryTerm {
    Match(String),
    Exclude(String),
    Or,
}

/// Quoted FTS5 string for the word tokens of `text`, `None` when it has none
fn quoted_words(text: &str) -> Option<String> {
    let words: Vec<&str> = WORD_PATTERN.find_iter(text).map(|m| m.as_str()).collect();
    if words.is_empty() {
        None
    } else {
        Some(format!("\"{}\"", words.join(" ")))
    }
}

/// Rewrite a user query as an FTS5 MATCH expression.
///
/// Matched terms are joined with AND unless `OR` separates them; excluded
/// terms are applied to the whole expression. Stray operators are dropped.
pub fn sanitize_fts_query(query: &str) -> Result<String, IndexError> {
    let mut terms = Vec::new();
    let mut negate_next = false;

    for part in QUERY_PART.captures_iter(query) {
        let (text, negated) = if let Some(phrase) = part.get(1) {
            (phrase.as_str(), negate_next)
        } else {
            let word = part.get(2).map_or("", |m| m.as_str());
            match word {
                "AND" => continue,
                "OR" => {
                    terms.push(QueryTerm::Or);
                    negate_next = false;
                    continue;
                }
                "NOT" => {
                    negate_next = true;
                    continue;
                }
                _ => match word.strip_prefix('-') {
                    Some(rest) if !rest.is_empty() => (rest, true),
                    _ => (word, negate_next),
                },
            }
        };
        negate_next = false;

        if let Some(quoted) = quoted_words(text) {
            terms.push(if negated {
                QueryTerm::Exclude(quoted)
            } else {
                QueryTerm::Match(quoted)
            });
        }
    }

    let mut expression = String::new();
    let mut exclusions = Vec::new();
    let mut pending_or = false;
    for term in terms {
        match term {
            QueryTerm::Or => pending_or = !expression.is_empty(),
            QueryTerm::Exclude(quoted) => exclusions.push(quoted),
            QueryTerm::Match(quoted) => {
                if !expression.is_empty() {
                    expression.push_str(if pending_or { " OR " } else { " AND " });
                }
                expression.push_str(&quoted);
                pending_or = false;
            }
        }
    }

    if expression.is_empty() {
        return Err(if exclusions.is_empty() {
            IndexError::EmptyQuery
        } else {
            IndexError::OnlyExclusions
        });
    }
    if exclusions.is_empty() {
        return Ok(expression);
    }

    let mut sanitized = format!("({})", expression);
    for quoted in exclusions {
        sanitized.push_str(" NOT ");
        sanitized.push_str(&quoted);
    }
    Ok(sanitized)
}

/// FTS5 reports malformed MATCH expressions as ordinary database errors
fn query_error(error: sqlx::Error) -> IndexError {
    match &error {
        sqlx::Error::Database(db) if db.message().contains("fts5") => {
            IndexError::InvalidQuery(db.message().to_string())
        }
        _ => IndexError::Database(error),
    }
}

/// Rollback journal instead of WAL so no `-wal`/`-shm` files outlive a run
fn file_options(path: &Path) -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .filename(path)
        .journal_mode(SqliteJournalMode::Delete)
}

/// Report index kept in an SQLite database between runs
#[derive(Debug, Clone)]
pub struct SqliteIndex {
    pool: SqlitePool,
}

impl SqliteIndex {
    /// Create the index at `path`, replacing any reports already stored there
    pub async fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create index directory {}", parent.display()))?;
        }

        let options = file_options(path).create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open index {}", path.display()))?;

        sqlx::query("DROP TABLE IF EXISTS reports")
            .execute(&pool)
            .await?;
        sqlx::query(CREATE_TABLE).execute(&pool).await?;

        debug!("Created report index at {}", path.display());
        Ok(Self { pool })
    }

    /// Open an index written by an earlier run
    pub async fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            anyhow::bail!(
                "No index at {}. Run extraction first to build it.",
                path.display()
            );
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(file_options(path))
            .await
            .with_context(|| format!("Failed to open index {}", path.display()))?;

        let index = Self { pool };
        debug!("Opened index {} with {} report(s)", path.display(), index.len().await?);
        Ok(index)
    }

    /// Index that lives only as long as this value
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        // every connection to :memory: is a separate database, keep exactly one alive
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn len(&self) -> Result<usize, IndexError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reports")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }

    /// Wait for the connection to close so the database file is released
    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl ReportIndex for SqliteIndex {
    async fn add_documents(&self, documents: &[IndexedReport]) -> Result<(), IndexError> {
        let mut tx = self.pool.begin().await?;
        for document in documents {
            sqlx::query(
                "INSERT INTO reports (acc, diagnosis, filepath, pagenum) VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(&document.acc)
            .bind(&document.diagnosis)
            .bind(&document.filepath)
            .bind(&document.pagenum)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        debug!("Inserted {} report(s) into the index", documents.len());
        Ok(())
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, IndexError> {
        let started = Instant::now();
        let expression = sanitize_fts_query(&request.query)?;
        debug!("Query '{}' rewritten as '{}'", request.query, expression);

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reports WHERE reports MATCH ?1")
            .bind(&expression)
            .fetch_one(&self.pool)
            .await
            .map_err(query_error)?;

        let rows = sqlx::query(
            "SELECT acc, diagnosis, filepath, pagenum, rank FROM reports \
             WHERE reports MATCH ?1 ORDER BY rank, rowid LIMIT ?2",
        )
        .bind(&expression)
        .bind(request.effective_limit() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error)?;

        let mut hits = Vec::with_capacity(rows.len());
        for row in rows {
            hits.push(SearchHit {
                report: IndexedReport {
                    acc: row.try_get("acc")?,
                    diagnosis: row.try_get("diagnosis")?,
                    filepath: row.try_get("filepath")?,
                    pagenum: row.try_get("pagenum")?,
                },
                rank: row.try_get("rank")?,
            });
        }

        Ok(SearchResponse {
            hits,
            total: total as usize,
            query_time_ms: started.elapsed().as_millis() as u64,
        })
    }
}
