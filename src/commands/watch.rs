use std::collections::HashSet;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tracing::{info, warn};

use super::ingest::ingest_many;
use crate::state::AppState;

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Folder to watch (overrides WATCH_DIR)
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Seconds between scans (overrides WATCH_INTERVAL)
    #[arg(long)]
    pub interval: Option<u64>,
}

/// PDFs directly inside `dir`, sorted by path.
pub async fn list_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to list {}", dir.display()))?;
    let mut pdfs = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if is_pdf && entry.file_type().await?.is_file() {
            pdfs.push(path);
        }
    }
    pdfs.sort();
    Ok(pdfs)
}

/// Ingest PDFs as they appear. Successes are remembered; failures are retried
/// on the next scan. Stops on Ctrl-C.
pub async fn watch(state: &AppState, args: WatchArgs) -> Result<bool> {
    let dir = args.dir.unwrap_or_else(|| state.settings.watch_dir.clone());
    let period = args
        .interval
        .map(|s| Duration::from_secs(s.max(1)))
        .unwrap_or(state.settings.watch_interval);
    tokio::fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    info!(dir = %dir.display(), interval_secs = period.as_secs(), "Watching for new PDFs");

    // One listener for the whole run so a Ctrl-C during a batch is not lost
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let outcome = poll_loop(state, &dir, period, shutdown).await;
    info!(ingested = outcome.ingested, interrupted = outcome.interrupted, "Watcher stopped");
    Ok(true)
}

#[derive(Debug, PartialEq, Eq)]
struct WatchOutcome {
    ingested: usize,
    interrupted: bool,
}

/// Scan and ingest until `shutdown` resolves. A shutdown during a batch
/// abandons the documents still in flight.
async fn poll_loop<F>(
    state: &AppState,
    dir: &Path,
    period: Duration,
    mut shutdown: Pin<&mut F>,
) -> WatchOutcome
where
    F: Future,
{
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut ticker = tokio::time::interval(period);
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.as_mut() => {
                return WatchOutcome { ingested: seen.len(), interrupted: false };
            }
        }

        let pending: Vec<PathBuf> = match list_pdfs(dir).await {
            Ok(pdfs) => pdfs.into_iter().filter(|p| !seen.contains(p)).collect(),
            Err(e) => {
                warn!(error = %format!("{:#}", e), "Scan failed");
                continue;
            }
        };
        if pending.is_empty() {
            continue;
        }

        let batch = ingest_many(
            state,
            pending,
            Some(state.settings.reports_dir.as_path()),
            state.settings.concurrency,
        );
        let outcomes = tokio::select! {
            outcomes = batch => outcomes,
            _ = shutdown.as_mut() => {
                return WatchOutcome { ingested: seen.len(), interrupted: true };
            }
        };
        for (path, outcome) in outcomes {
            match outcome {
                Ok(_) => {
                    println!("Indexed {}", path.display());
                    seen.insert(path);
                }
                Err(e) => warn!(
                    file = %path.display(),
                    error = %format!("{:#}", e),
                    "Failed to process, will retry"
                ),
            }
        }
    }
}
