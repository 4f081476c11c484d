use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::insight::types::InsightRecord;

/// Content-addressed paper ID (blake3 hex hash of the source path).
pub type PaperId = String;

/// Text and equation-like lines extracted from one source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedDocument {
    pub source_path: PathBuf,
    pub file_name: String,
    pub full_text: String,
    /// Ordered, deduplicated, at most 80 entries.
    pub equation_candidates: Vec<String>,
}

/// A document together with its analysis, ready for embedding and reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedPaper {
    pub id: PaperId,
    pub title: String,
    pub added_at: DateTime<Utc>,
    pub parsed: ParsedDocument,
    pub insight: InsightRecord,
}
