mod check;
mod config;
mod explain;
mod ingest;
mod watch;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::state::{AnalysisMode, AppState, Settings};

/// Paper Insight - structured analysis of research papers with a local LLM
#[derive(Debug, Parser)]
#[command(name = "paper-insight", version)]
pub struct Cli {
    /// Prompting strategy (overrides ANALYSIS_MODE)
    #[arg(long, global = true, value_enum)]
    pub mode: Option<AnalysisMode>,

    /// Where markdown reports are written (overrides REPORTS_DIR)
    #[arg(long, global = true)]
    pub reports_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the LLM server is reachable and serves the configured model
    Check,
    /// Analyze papers and write one report per paper
    Ingest(ingest::IngestArgs),
    /// Poll a folder and ingest new PDFs as they appear
    Watch(watch::WatchArgs),
    /// Explain a highlighted passage
    Explain(explain::ExplainArgs),
    /// Show the effective configuration
    Config,
}

impl Cli {
    /// Apply command-line overrides on top of environment settings.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(mode) = self.mode {
            settings.analysis.mode = mode;
        }
        if let Some(dir) = &self.reports_dir {
            settings.reports_dir = dir.clone();
        }
    }
}

/// Run the selected command. `Ok(false)` means the command ran but did not succeed.
pub async fn dispatch(command: Command, state: &AppState) -> anyhow::Result<bool> {
    match command {
        Command::Check => check::check(state).await,
        Command::Ingest(args) => ingest::ingest(state, args).await,
        Command::Watch(args) => watch::watch(state, args).await,
        Command::Explain(args) => explain::explain(state, args).await,
        Command::Config => config::config(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_ingest_with_overrides() {
        let cli = Cli::try_parse_from([
            "paper-insight",
            "ingest",
            "a.pdf",
            "b.pdf",
            "--mode",
            "chunked",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.mode, Some(AnalysisMode::Chunked));
        match cli.command {
            Command::Ingest(args) => {
                assert_eq!(args.paths.len(), 2);
                assert!(args.json);
                assert!(!args.no_report);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_requires_paths_for_ingest() {
        assert!(Cli::try_parse_from(["paper-insight", "ingest"]).is_err());
    }

    #[test]
    fn test_overrides_apply_to_settings() {
        let cli = Cli::try_parse_from([
            "paper-insight",
            "--reports-dir",
            "/tmp/r",
            "--mode",
            "chunked",
            "check",
        ])
        .unwrap();
        let mut settings = Settings::default();
        cli.apply(&mut settings);
        assert_eq!(settings.reports_dir, PathBuf::from("/tmp/r"));
        assert_eq!(settings.analysis.mode, AnalysisMode::Chunked);
        assert_eq!(settings.watch_dir, PathBuf::from("./papers"));
    }

    #[test]
    fn test_no_overrides_keep_settings() {
        let cli = Cli::try_parse_from(["paper-insight", "config"]).unwrap();
        let mut settings = Settings {
            reports_dir: PathBuf::from("/srv/reports"),
            ..Default::default()
        };
        cli.apply(&mut settings);
        assert_eq!(settings.reports_dir, PathBuf::from("/srv/reports"));
        assert_eq!(settings.analysis.mode, AnalysisMode::Staged);
    }
}
