use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::insight::Analyzer;
use crate::llm::{LlmClient, LlmSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum AnalysisMode {
    /// Overview, summary, technical and critique prompts in sequence.
    #[default]
    Staged,
    /// One all-fields prompt per head/middle/tail chunk.
    Chunked,
}

impl FromStr for AnalysisMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "staged" => Ok(Self::Staged),
            "chunked" => Ok(Self::Chunked),
            other => anyhow::bail!("unknown analysis mode '{}', expected staged or chunked", other),
        }
    }
}

/// Tunables for the insight pipeline.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub mode: AnalysisMode,
    pub input_token_budget: usize,
    pub max_chunk_chars: usize,
    /// Chunks embedded into each staged prompt.
    pub context_chunks: usize,
    pub equation_sample: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            mode: AnalysisMode::Staged,
            input_token_budget: 3900,
            max_chunk_chars: 2200,
            context_chunks: 3,
            equation_sample: 20,
        }
    }
}

/// Process-wide settings read once at start-up.
#[derive(Debug, Clone)]
pub struct Settings {
    pub llm: LlmSettings,
    pub analysis: AnalysisConfig,
    pub watch_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub watch_interval: Duration,
    pub concurrency: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            llm: LlmSettings::default(),
            analysis: AnalysisConfig::default(),
            watch_dir: PathBuf::from("./papers"),
            reports_dir: PathBuf::from("./reports"),
            watch_interval: Duration::from_secs(10),
            concurrency: 2,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let mode = match dotenv::var("ANALYSIS_MODE") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.analysis.mode,
        };
        let watch_interval = parse_var("WATCH_INTERVAL", defaults.watch_interval.as_secs())?;
        let concurrency = parse_var("INGEST_CONCURRENCY", defaults.concurrency)?;

        Ok(Self {
            llm: LlmSettings::from_env(),
            analysis: AnalysisConfig {
                mode,
                ..defaults.analysis
            },
            watch_dir: dotenv::var("WATCH_DIR").map(PathBuf::from).unwrap_or(defaults.watch_dir),
            reports_dir: dotenv::var("REPORTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.reports_dir),
            watch_interval: Duration::from_secs(watch_interval.max(1)),
            concurrency: concurrency.max(1),
        })
    }
}

fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match dotenv::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: '{}'", key, raw)),
        Err(_) => Ok(default),
    }
}

pub struct AppState {
    pub settings: Settings,
    pub llm: Arc<LlmClient>,
    pub analyzer: Arc<Analyzer>,
}

impl AppState {
    pub fn new(settings: Settings) -> Result<Self> {
        let llm = Arc::new(LlmClient::new(settings.llm.clone())?);
        let analyzer = Arc::new(Analyzer::new(llm.clone(), settings.analysis.clone()));
        Ok(Self {
            settings,
            llm,
            analyzer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_mode_from_str() {
        assert_eq!("staged".parse::<AnalysisMode>().unwrap(), AnalysisMode::Staged);
        assert_eq!(" Chunked ".parse::<AnalysisMode>().unwrap(), AnalysisMode::Chunked);
        assert!("parallel".parse::<AnalysisMode>().is_err());
    }

    #[test]
    fn test_default_analysis_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.mode, AnalysisMode::Staged);
        assert_eq!(config.input_token_budget, 3900);
        assert_eq!(config.max_chunk_chars, 2200);
    }
}
