mod commands;
mod companion;
mod docs;
mod insight;
mod llm;
mod report;
mod state;

use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use commands::Cli;
use state::{AppState, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load env
    let _ = dotenv::dotenv();

    // Logs go to stderr so command output on stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::from_env()?;
    cli.apply(&mut settings);
    info!(
        base_url = %settings.llm.base_url,
        model = %settings.llm.model,
        mode = ?settings.analysis.mode,
        "Settings loaded"
    );

    let state = AppState::new(settings)?;

    let ok = commands::dispatch(cli.command, &state).await?;
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
