use serde::{Deserialize, Serialize};

use super::PathologyReport;

/// Default number of hits returned by a query
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Indexed form of a report: four stored text fields.
///
/// `diagnosis` is the only searchable field, the others are returned with
/// each hit so a reader can open the source page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedReport {
    /// Accession string, e.g. "CSP: 24 1234"
    pub acc: String,
    pub diagnosis: String,
    pub filepath: String,
    /// 1-based page number as text
    pub pagenum: String,
}

impl From<&PathologyReport> for IndexedReport {
    fn from(report: &PathologyReport) -> Self {
        Self {
            acc: report.accession.to_string(),
            diagnosis: report.diagnosis.clone(),
            filepath: report.source_file.to_string_lossy().to_string(),
            pagenum: report.page_number.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text query over the diagnosis field
    pub query: String,
    /// Maximum number of hits (default: 10)
    pub limit: Option<usize>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_SEARCH_LIMIT)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub report: IndexedReport,
    /// BM25 rank reported by FTS5, lower is a better match
    pub rank: f64,
}

impl SearchHit {
    /// Link to the source page, e.g. `/reports/fax.pdf#page=3`
    pub fn reference(&self) -> String {
        format!("{}#page={}", self.report.filepath, self.report.pagenum)
    }

    /// One rendered result line: reference, accession, page and diagnosis snippet
    pub fn render(&self) -> String {
        format!(
            "{} [{}] (page {}) :: {}",
            self.reference(),
            self.report.acc,
            self.report.pagenum,
            self.report.diagnosis.trim_end()
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub hits: Vec<SearchHit>,
    pub total: usize,
    pub query_time_ms: u64,
}
