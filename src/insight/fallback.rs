use crate::docs::types::ParsedDocument;

use super::types::MergedInsight;

const SUMMARY_MAX_CHARS: usize = 600;

const FALLBACK_IDEAS: [&str; 5] = [
    "Test the core method under different dataset scales.",
    "Compare with a stronger modern baseline using equal compute.",
    "Run robustness analysis for domain shift and noisy inputs.",
    "Perform component-level ablations to isolate gains.",
    "Explore a smaller and faster variant for deployment.",
];

const FALLBACK_TRAINING: [&str; 2] = [
    "Loss function, optimizer, and exact hyperparameters were not reliably extracted.",
    "Re-index with a stronger local model to recover detailed training settings.",
];

const FALLBACK_PROS: [&str; 2] = [
    "Pipeline preserves ingestion even if model output is malformed.",
    "Extracted text still supports search and retrieval.",
];

const FALLBACK_CONS: [&str; 2] = [
    "Fine-grained training setup may be incomplete in fallback mode.",
    "Architecture details may require stronger model reasoning.",
];

const FALLBACK_NEXT_STEPS: [&str; 3] = [
    "Run extraction again after confirming local LLM stability.",
    "Add paper-specific regex extraction for optimizer/loss mentions.",
    "Compare claims against baseline papers in the same domain.",
];

/// Build an insight from the document text alone, without a model call.
pub fn fallback_analysis(doc: &ParsedDocument) -> MergedInsight {
    let lines: Vec<&str> = doc
        .full_text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let summary = if lines.is_empty() {
        doc.file_name.clone()
    } else {
        lines[..lines.len().min(3)]
            .join(" ")
            .chars()
            .take(SUMMARY_MAX_CHARS)
            .collect()
    };

    let contributions: Vec<String> = if lines.len() > 3 {
        lines[3..lines.len().min(8)].iter().map(|l| l.to_string()).collect()
    } else {
        vec![format!("Initial extraction from {}.", doc.file_name)]
    };

    MergedInsight {
        summary: Some(summary),
        method_type: None,
        architecture: Some("Not specified from fallback extraction.".to_string()),
        innovations: contributions.iter().take(4).cloned().collect(),
        contributions,
        training_info: owned(&FALLBACK_TRAINING),
        pros: owned(&FALLBACK_PROS),
        cons: owned(&FALLBACK_CONS),
        next_steps: owned(&FALLBACK_NEXT_STEPS),
        research_ideas: owned(&FALLBACK_IDEAS),
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc(text: &str) -> ParsedDocument {
        ParsedDocument {
            source_path: "/papers/attention.pdf".into(),
            file_name: "attention.pdf".to_string(),
            full_text: text.to_string(),
            equation_candidates: vec![],
        }
    }

    #[test]
    fn test_summary_and_contributions_from_lines() {
        let text = "Title\n\nAbstract line\nMore abstract\nC1\nC2\n\nC3\nC4\nC5\nC6\nC7";
        let out = fallback_analysis(&doc(text));
        assert_eq!(out.summary.as_deref(), Some("Title Abstract line More abstract"));
        assert_eq!(out.contributions, vec!["C1", "C2", "C3", "C4", "C5"]);
        assert_eq!(out.innovations, vec!["C1", "C2", "C3", "C4"]);
        assert_eq!(out.research_ideas.len(), 5);
    }

    #[test]
    fn test_short_text_uses_generic_contribution() {
        let out = fallback_analysis(&doc("Only a title"));
        assert_eq!(out.summary.as_deref(), Some("Only a title"));
        assert_eq!(out.contributions, vec!["Initial extraction from attention.pdf."]);
    }

    #[test]
    fn test_empty_text_summarizes_file_name() {
        let out = fallback_analysis(&doc("   \n  "));
        assert_eq!(out.summary.as_deref(), Some("attention.pdf"));
    }

    #[test]
    fn test_summary_is_capped() {
        let long = "w".repeat(500);
        let text = format!("{long}\n{long}\n{long}");
        let out = fallback_analysis(&doc(&text));
        assert_eq!(out.summary.map(|s| s.chars().count()), Some(600));
    }
}
