use anyhow::{Context, Result};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::models::{SearchRequest, SearchResponse};
use crate::services::search_index::{ReportIndex, SqliteIndex};

pub async fn search_saved_index(
    index_path: &Path,
    query: &str,
    limit: Option<usize>,
) -> Result<SearchResponse> {
    let index = SqliteIndex::open(index_path).await?;
    let mut request = SearchRequest::new(query);
    request.limit = limit;
    let response = index.search(&request).await;
    index.close().await;
    Ok(response?)
}

/// One line per hit, or a note when nothing matched
pub fn render_response(response: &SearchResponse) -> Vec<String> {
    if response.hits.is_empty() {
        return vec!["No matching reports".to_string()];
    }

    let mut lines: Vec<String> = response.hits.iter().map(|hit| hit.render()).collect();
    if response.total > response.hits.len() {
        lines.push(format!(
            "Showing {} of {} matching reports",
            response.hits.len(),
            response.total
        ));
    }
    lines
}

/// Prompt for queries on stdin until a blank line or end of input
pub async fn interactive_search(index: &dyn ReportIndex) -> Result<()> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        stdout
            .write_all(b"Search diagnoses (blank line to quit): ")
            .await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await.context("Failed to read query")? else {
            break;
        };
        let query = line.trim();
        if query.is_empty() {
            break;
        }

        let output = match index.search(&SearchRequest::new(query)).await {
            Ok(response) => render_response(&response).join("\n"),
            Err(e) => format!("Invalid query: {}", e),
        };
        stdout.write_all(output.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IndexedReport, SearchHit};

    fn hit(acc: &str) -> SearchHit {
        SearchHit {
            report: IndexedReport {
                acc: acc.to_string(),
                diagnosis: "Nevus ".to_string(),
                filepath: "derm.pdf".to_string(),
                pagenum: "2".to_string(),
            },
            rank: -1.0,
        }
    }

    #[test]
    fn test_render_empty_response() {
        let response = SearchResponse {
            hits: Vec::new(),
            total: 0,
            query_time_ms: 0,
        };
        assert_eq!(render_response(&response), vec!["No matching reports"]);
    }

    #[test]
    fn test_render_truncated_response() {
        let response = SearchResponse {
            hits: vec![hit("CSP: 24 1")],
            total: 3,
            query_time_ms: 0,
        };
        assert_eq!(
            render_response(&response),
            vec![
                "derm.pdf#page=2 [CSP: 24 1] (page 2) :: Nevus",
                "Showing 1 of 3 matching reports"
            ]
        );
    }
}
