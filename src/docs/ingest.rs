use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use super::types::{IndexedPaper, ParsedDocument};
use super::{document_id, parse_document};
use crate::insight::Analyzer;
use crate::report;

const TITLE_MAX_CHARS: usize = 180;

/// First line of the text, or the file stem when the text is empty.
pub fn paper_title(doc: &ParsedDocument) -> String {
    let first = doc
        .full_text
        .lines()
        .next()
        .map(str::trim)
        .unwrap_or_default();
    if first.is_empty() {
        doc.source_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| doc.file_name.clone())
    } else {
        first.chars().take(TITLE_MAX_CHARS).collect()
    }
}

/// Analyze an already-parsed document.
pub async fn index_document(analyzer: &Analyzer, parsed: ParsedDocument) -> IndexedPaper {
    let insight = analyzer.analyze(&parsed).await;
    IndexedPaper {
        id: document_id(&parsed.source_path),
        title: paper_title(&parsed),
        added_at: chrono::Utc::now(),
        parsed,
        insight,
    }
}

/// Parse, analyze and optionally write a markdown report for one file.
/// Returns the indexed paper and the report path, if one was written.
pub async fn ingest_file(
    analyzer: &Analyzer,
    path: &Path,
    reports_dir: Option<&Path>,
) -> Result<(IndexedPaper, Option<PathBuf>)> {
    let parsed = parse_document(path).await?;
    let paper = index_document(analyzer, parsed).await;

    let report_path = match reports_dir {
        Some(dir) => Some(report::write_report(&paper, dir).await?),
        None => None,
    };

    info!(
        paper_id = %paper.id,
        title = %paper.title,
        method = %paper.insight.method_type,
        report = ?report_path,
        "Paper ingested"
    );
    Ok((paper, report_path))
}
