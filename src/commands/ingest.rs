use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use futures::stream::{self, StreamExt};
use tracing::{error, info};

use crate::docs::ingest as doc_ingest;
use crate::docs::types::IndexedPaper;
use crate::report;
use crate::state::AppState;

#[derive(Debug, Args)]
pub struct IngestArgs {
    /// PDF or text files to analyze
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Skip writing markdown reports
    #[arg(long)]
    pub no_report: bool,

    /// Print each insight record as JSON
    #[arg(long)]
    pub json: bool,

    /// Documents analyzed in parallel (overrides INGEST_CONCURRENCY)
    #[arg(long)]
    pub concurrency: Option<usize>,
}

pub type IngestOutcome = (PathBuf, Result<(IndexedPaper, Option<PathBuf>)>);

/// Ingest several files, at most `concurrency` at a time. Each document runs
/// its own sequential pipeline; results arrive in completion order.
pub async fn ingest_many(
    state: &AppState,
    paths: Vec<PathBuf>,
    reports_dir: Option<&Path>,
    concurrency: usize,
) -> Vec<IngestOutcome> {
    stream::iter(paths)
        .map(|path| {
            let analyzer = state.analyzer.clone();
            async move {
                let result = doc_ingest::ingest_file(&analyzer, &path, reports_dir).await;
                (path, result)
            }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await
}

/// Analyze the given files and report per-file outcomes.
pub async fn ingest(state: &AppState, args: IngestArgs) -> Result<bool> {
    let reports_dir = (!args.no_report).then_some(state.settings.reports_dir.as_path());
    let concurrency = args.concurrency.unwrap_or(state.settings.concurrency);

    info!(files = args.paths.len(), concurrency, "Ingestion started");
    let outcomes = ingest_many(state, args.paths, reports_dir, concurrency).await;

    let mut failures = 0usize;
    for (path, outcome) in outcomes {
        match outcome {
            Ok((paper, report)) => {
                if args.json {
                    let out = serde_json::json!({
                        "id": paper.id,
                        "title": paper.title,
                        "file": paper.parsed.source_path,
                        "insight": paper.insight,
                        "embedding_text": report::embedding_text(&paper),
                    });
                    println!("{}", serde_json::to_string_pretty(&out)?);
                } else {
                    match report {
                        Some(report) => println!("Indexed {} -> {}", path.display(), report.display()),
                        None => println!("Indexed {}", path.display()),
                    }
                }
            }
            Err(e) => {
                failures += 1;
                error!(file = %path.display(), error = %format!("{:#}", e), "Ingestion failed");
            }
        }
    }

    info!(failures, "Ingestion finished");
    Ok(failures == 0)
}
