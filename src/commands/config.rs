use anyhow::Result;

use crate::state::AppState;

/// Print the effective configuration (the API key is never shown).
pub fn config(state: &AppState) -> Result<bool> {
    let s = &state.settings;
    println!(
        "LLM base URL:        {}\n\
         LLM model:           {}\n\
         Temperature:         {}\n\
         Max tokens:          {}\n\
         Analysis timeout:    {}s\n\
         Probe timeout:       {}s\n\
         Analysis mode:       {:?}\n\
         Input token budget:  {}\n\
         Max chunk chars:     {}\n\
         Watch dir:           {}\n\
         Watch interval:      {}s\n\
         Reports dir:         {}\n\
         Ingest concurrency:  {}",
        s.llm.base_url,
        s.llm.model,
        s.llm.temperature,
        s.llm.max_tokens,
        s.llm.analysis_timeout.as_secs(),
        s.llm.probe_timeout.as_secs(),
        s.analysis.mode,
        s.analysis.input_token_budget,
        s.analysis.max_chunk_chars,
        s.watch_dir.display(),
        s.watch_interval.as_secs(),
        s.reports_dir.display(),
        s.concurrency,
    );
    Ok(true)
}
