use std::collections::HashSet;

use super::types::{InsightRecord, ListField, MergedInsight, MethodType, NOT_SPECIFIED};

pub const RESEARCH_IDEA_COUNT: usize = 5;

/// Normalize merged fields into the final record: trimmed, non-empty,
/// deduplicated, capped lists and exactly five research ideas.
pub fn assemble(merged: MergedInsight) -> InsightRecord {
    let list = |field: ListField| normalize_list(merged.list(field), field.cap());

    let mut research_ideas = list(ListField::ResearchIdeas);
    while research_ideas.len() < RESEARCH_IDEA_COUNT {
        research_ideas.push(format!(
            "Investigate an extension of this method with ablation focus #{}.",
            research_ideas.len() + 1
        ));
    }

    InsightRecord {
        summary: scalar_or_default(merged.summary.as_deref()),
        innovations: list(ListField::Innovations),
        contributions: list(ListField::Contributions),
        method_type: merged
            .method_type
            .as_deref()
            .map(MethodType::parse)
            .unwrap_or_default(),
        training_info: list(ListField::TrainingInfo),
        architecture: scalar_or_default(merged.architecture.as_deref()),
        pros: list(ListField::Pros),
        cons: list(ListField::Cons),
        next_steps: list(ListField::NextSteps),
        research_ideas,
    }
}

fn scalar_or_default(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => NOT_SPECIFIED.to_string(),
    }
}

fn normalize_list(items: &[String], cap: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && seen.insert(*s))
        .take(cap)
        .map(str::to_string)
        .collect()
}
