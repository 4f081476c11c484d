//! Reading companion: explains a highlighted passage in light of related papers.

use serde::Serialize;
use tracing::warn;

use crate::insight::types::{lookup, value_items, value_text};
use crate::insight::Analyzer;

const MAX_CONTEXT_CONCEPTS: usize = 8;
const MAX_RELATED_LINKS: usize = 6;
const FALLBACK_LINKS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightExplanation {
    pub expert_explanation: String,
    pub simplified_explanation: String,
    pub related_links: Vec<String>,
}

fn highlight_prompt(
    highlight: &str,
    related_concepts: &[String],
    expertise_level: &str,
    include_simplified: bool,
) -> String {
    let concepts = if related_concepts.is_empty() {
        "- None".to_string()
    } else {
        related_concepts
            .iter()
            .take(MAX_CONTEXT_CONCEPTS)
            .map(|c| format!("- {}", c))
            .collect::<Vec<_>>()
            .join("\n")
    };
    format!(
        r#"You are a reading companion for ML papers.

Return strict JSON with keys:
- expert_explanation (string, concise but deep)
- simplified_explanation (string; required only if include_simplified=true, otherwise empty string)
- related_links (array of 3-6 short strings referencing related ideas from context)

Expertise level: {expertise_level}
include_simplified: {include_simplified}

Highlighted paragraph:
{highlight}

Related concept context:
{concepts}"#
    )
}

fn fallback_explanation(related_concepts: &[String], include_simplified: bool) -> HighlightExplanation {
    HighlightExplanation {
        expert_explanation: "Unable to generate model explanation reliably. Use related concept \
            matches below to interpret the highlighted paragraph."
            .to_string(),
        simplified_explanation: if include_simplified {
            "This highlighted text describes a method or result in the paper.".to_string()
        } else {
            String::new()
        },
        related_links: related_concepts
            .iter()
            .take(FALLBACK_LINKS)
            .cloned()
            .collect(),
    }
}

/// Explain a highlighted paragraph. Never fails: model problems yield a
/// deterministic explanation built from `related_concepts`.
pub async fn explain_highlight(
    analyzer: &Analyzer,
    highlight: &str,
    related_concepts: &[String],
    expertise_level: &str,
    include_simplified: bool,
) -> HighlightExplanation {
    let prompt = highlight_prompt(highlight, related_concepts, expertise_level, include_simplified);
    let payload = match analyzer.chat_json(&prompt).await {
        Ok(payload) if !payload.is_empty() => payload,
        Ok(_) => {
            warn!("Highlight explanation came back empty");
            return fallback_explanation(related_concepts, include_simplified);
        }
        Err(e) => {
            warn!(error = %e, "Highlight explanation failed");
            return fallback_explanation(related_concepts, include_simplified);
        }
    };

    let text = |key: &str| lookup(&payload, &[key]).map(value_text).unwrap_or_default();
    let mut related_links = lookup(&payload, &["related_links"])
        .map(value_items)
        .unwrap_or_default();
    related_links.truncate(MAX_RELATED_LINKS);

    HighlightExplanation {
        expert_explanation: text("expert_explanation"),
        simplified_explanation: if include_simplified {
            text("simplified_explanation")
        } else {
            String::new()
        },
        related_links,
    }
}
