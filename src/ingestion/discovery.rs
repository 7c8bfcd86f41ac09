//! Finding report documents in the reports directory.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::services::report_log::is_report_log_name;
use crate::utils::ocr::{content_matches_kind, document_kind, DocumentKind};

/// Bytes read to check a file's signature against its extension
const SIGNATURE_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredDocument {
    pub path: PathBuf,
    pub kind: DocumentKind,
}

/// A file in the reports directory that will not be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Documents sorted by file name
    pub documents: Vec<DiscoveredDocument>,
    pub skipped: Vec<SkippedFile>,
}

/// List the documents directly inside `reports_dir`.
///
/// Subdirectories are not descended into. Files whose extension is not a
/// supported document, or whose content does not match their extension, are
/// returned in [`Discovery::skipped`]. The run's own dated logs are ignored,
/// as is every path in `excluded` together with its sidecar files
/// (`report_index.db-journal` for `report_index.db`).
pub fn discover_documents(reports_dir: &Path, excluded: &[PathBuf]) -> Result<Discovery> {
    let mut discovery = Discovery::default();
    let excluded_names = excluded_names_in(reports_dir, excluded);

    let walker = WalkDir::new(reports_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry
            .with_context(|| format!("Failed to read reports directory {}", reports_dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path().to_path_buf();
        let file_name = entry.file_name().to_string_lossy();
        if is_report_log_name(&file_name) {
            continue;
        }
        if excluded_names.iter().any(|name| file_name.starts_with(name.as_str())) {
            debug!("Ignoring {}: written by the run", path.display());
            continue;
        }

        let Some(kind) = document_kind(&file_name) else {
            debug!("Ignoring {}: not a supported document", path.display());
            discovery.skipped.push(SkippedFile {
                path,
                reason: "not a supported document type".to_string(),
            });
            continue;
        };

        match signature_matches(&path, kind) {
            Ok(true) => discovery.documents.push(DiscoveredDocument { path, kind }),
            Ok(false) => {
                warn!("Skipping {}: content does not match its extension", path.display());
                discovery.skipped.push(SkippedFile {
                    path,
                    reason: "content does not match file extension".to_string(),
                });
            }
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                discovery.skipped.push(SkippedFile {
                    path,
                    reason: format!("unreadable: {}", e),
                });
            }
        }
    }

    Ok(discovery)
}

fn canonical_dir(dir: &Path) -> PathBuf {
    let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };
    std::fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf())
}

/// File names of the excluded paths that live directly in `reports_dir`
fn excluded_names_in(reports_dir: &Path, excluded: &[PathBuf]) -> Vec<String> {
    let reports_dir = canonical_dir(reports_dir);
    excluded
        .iter()
        .filter(|path| path.parent().map(canonical_dir).as_deref() == Some(reports_dir.as_path()))
        .filter_map(|path| path.file_name())
        .map(|name| name.to_string_lossy().to_string())
        .collect()
}

fn signature_matches(path: &Path, kind: DocumentKind) -> std::io::Result<bool> {
    if kind == DocumentKind::Text {
        return Ok(true);
    }

    let mut header = Vec::with_capacity(SIGNATURE_LEN);
    File::open(path)?
        .take(SIGNATURE_LEN as u64)
        .read_to_end(&mut header)?;
    Ok(content_matches_kind(&header, kind))
}
