use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use crate::companion;
use crate::state::AppState;

#[derive(Debug, Args)]
pub struct ExplainArgs {
    /// Highlighted passage to explain
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub text: Option<String>,

    /// Read the passage from a file instead
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Related concept snippets to ground the explanation (repeatable)
    #[arg(long = "concept")]
    pub concepts: Vec<String>,

    /// Audience the explanation is written for
    #[arg(long, default_value = "ML researcher")]
    pub level: String,

    /// Also produce a simplified explanation
    #[arg(long)]
    pub simplified: bool,
}

pub async fn explain(state: &AppState, args: ExplainArgs) -> Result<bool> {
    let passage = match (args.text, &args.file) {
        (Some(text), _) => text,
        (None, Some(path)) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => anyhow::bail!("provide --text or --file"),
    };
    let passage = passage.split_whitespace().collect::<Vec<_>>().join(" ");

    info!(len = passage.len(), concepts = args.concepts.len(), "Explaining highlight");
    let explanation = companion::explain_highlight(
        &state.analyzer,
        &passage,
        &args.concepts,
        &args.level,
        args.simplified,
    )
    .await;

    println!("{}", serde_json::to_string_pretty(&explanation)?);
    Ok(true)
}
