pub mod assemble;
pub mod budget;
pub mod fallback;
pub mod merge;
pub mod prompts;
pub mod recovery;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::docs::types::ParsedDocument;
use crate::llm::ChatModel;
use crate::state::{AnalysisConfig, AnalysisMode};

use budget::{chunk_text, truncate_to_budget};
use prompts::{Overview, Stage};
use recovery::{recover_json, RecoveryError};
use types::{lookup, value_items, value_text, InsightRecord, ListField, StageResult};

/// Why one stage or chunk contributed nothing.
#[derive(Debug, Error)]
pub enum StageFailure {
    #[error("model call failed: {0:#}")]
    Transport(anyhow::Error),
    #[error(transparent)]
    Recovery(#[from] RecoveryError),
}

/// Turns a parsed document into an [`InsightRecord`] through a chat model.
///
/// Every model-side problem degrades to an empty contribution; when nothing
/// survives, the record is synthesized from the document text instead.
pub struct Analyzer {
    model: Arc<dyn ChatModel>,
    config: AnalysisConfig,
}

impl Analyzer {
    pub fn new(model: Arc<dyn ChatModel>, config: AnalysisConfig) -> Self {
        Self { model, config }
    }

    pub async fn analyze(&self, doc: &ParsedDocument) -> InsightRecord {
        info!(
            file = %doc.file_name,
            text_len = doc.full_text.len(),
            equations = doc.equation_candidates.len(),
            mode = ?self.config.mode,
            "Starting analysis"
        );

        let candidates = match self.config.mode {
            AnalysisMode::Staged => self.staged_candidates(doc).await,
            AnalysisMode::Chunked => self.chunk_candidates(doc).await,
        };

        let mut merged = merge::merge_candidates(&candidates);
        if merged.is_empty() {
            warn!(
                file = %doc.file_name,
                candidates = candidates.len(),
                "All stages failed, using fallback extraction"
            );
            merged = fallback::fallback_analysis(doc);
        }

        let record = assemble::assemble(merged);
        info!(
            file = %doc.file_name,
            method = %record.method_type,
            contributions = record.contributions.len(),
            "Analysis complete"
        );
        record
    }

    /// Overview, then summary, technical and critique stages, each embedding
    /// what the overview extracted.
    async fn staged_candidates(&self, doc: &ParsedDocument) -> Vec<StageResult> {
        let context = self.document_context(doc);
        let equations = self.equation_sample(doc);

        let overview_result = self
            .run_stage(Stage::Overview, prompts::overview_prompt(&context, &equations))
            .await;
        let overview = Overview::from_result(&overview_result);
        debug!(
            claims = overview.key_claims.len(),
            sections = ?overview.likely_sections,
            method = %overview.method_type,
            "Overview extracted"
        );

        let summary = self
            .run_stage(Stage::Summary, prompts::summary_prompt(&overview, &context))
            .await;
        let technical = self
            .run_stage(
                Stage::Technical,
                prompts::technical_prompt(&overview, &equations, &context),
            )
            .await;
        let critique = self
            .run_stage(Stage::Critique, prompts::critique_prompt(&overview, &context))
            .await;

        // The overview only fills gaps the dedicated stages left open.
        let has_contributions = lookup(&summary, ListField::Contributions.keys())
            .is_some_and(|v| !value_items(v).is_empty());
        let backfill = overview.backfill(has_contributions);
        vec![summary, technical, critique, backfill]
    }

    /// One all-fields request per chunk.
    async fn chunk_candidates(&self, doc: &ParsedDocument) -> Vec<StageResult> {
        let chunks = chunk_text(&doc.full_text, self.config.max_chunk_chars);
        let equations = self.equation_sample(doc);
        let total = chunks.len();

        let mut candidates = Vec::with_capacity(total);
        for (index, chunk) in chunks.iter().enumerate() {
            let prompt = prompts::chunk_prompt(chunk, index, total, &equations);
            match self.chat_json(&prompt).await {
                Ok(result) => candidates.push(result),
                Err(e) => warn!(chunk = index + 1, total, error = %e, "Chunk analysis failed"),
            }
        }
        candidates
    }

    async fn run_stage(&self, stage: Stage, prompt: String) -> StageResult {
        match self.chat_json(&prompt).await {
            Ok(result) => {
                debug!(stage = stage.name(), keys = result.len(), "Stage complete");
                result
            }
            Err(e) => {
                warn!(stage = stage.name(), error = %e, "Stage failed, continuing with empty result");
                Map::new()
            }
        }
    }

    /// Budget the prompt, call the model, and recover a JSON object.
    pub async fn chat_json(&self, prompt: &str) -> Result<StageResult, StageFailure> {
        let bounded = truncate_to_budget(prompt, self.config.input_token_budget);
        let response = self
            .model
            .complete(prompts::SYSTEM_PROMPT, &bounded)
            .await
            .map_err(StageFailure::Transport)?;
        debug!(response_len = response.len(), "Model response received");
        Ok(recover_json(&response)?)
    }

    fn document_context(&self, doc: &ParsedDocument) -> String {
        let chunks = chunk_text(&doc.full_text, self.config.max_chunk_chars);
        chunks
            .iter()
            .take(self.config.context_chunks)
            .enumerate()
            .map(|(i, chunk)| format!("[Chunk {}/{}]\n{}", i + 1, chunks.len(), chunk))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn equation_sample(&self, doc: &ParsedDocument) -> String {
        doc.equation_candidates
            .iter()
            .take(self.config.equation_sample)
            .cloned()
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Overview {
    fn from_result(result: &StageResult) -> Self {
        let text = |keys: &[&str]| lookup(result, keys).map(value_text).unwrap_or_default();
        let items = |keys: &[&str]| lookup(result, keys).map(value_items).unwrap_or_default();
        let method_type = text(&["method_type", "methodType"]);
        Self {
            paper_overview: text(&["paper_overview", "paperOverview"]),
            method_type: if method_type.is_empty() {
                "other".to_string()
            } else {
                method_type
            },
            key_claims: items(&["key_claims", "keyClaims"]),
            likely_sections: items(&["likely_sections", "likelySections"]),
        }
    }

    /// Overview fields expressed as a merge candidate. Key claims stand in
    /// for contributions only when the summary stage produced none.
    fn backfill(&self, has_contributions: bool) -> StageResult {
        let mut map = Map::new();
        map.insert("method_type".into(), Value::String(self.method_type.clone()));
        if !self.paper_overview.is_empty() {
            map.insert("summary".into(), Value::String(self.paper_overview.clone()));
        }
        if !has_contributions && !self.key_claims.is_empty() {
            let claims = self.key_claims.iter().take(6).cloned().map(Value::String);
            map.insert("contributions".into(), Value::Array(claims.collect()));
        }
        map
    }
}
