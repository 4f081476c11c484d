use std::collections::HashSet;

use super::types::{
    lookup, value_items, value_text, ListField, MergedInsight, MethodType, ScalarField, StageResult,
};

/// Combine partial results into one insight, in candidate order.
///
/// Scalars take the first informative value; list fields are concatenated,
/// deduplicated on trimmed text and capped per field.
pub fn merge_candidates(candidates: &[StageResult]) -> MergedInsight {
    let mut merged = MergedInsight::default();
    if candidates.is_empty() {
        return merged;
    }

    merged.summary = first_scalar(candidates, ScalarField::Summary, |_| true);
    merged.method_type = first_scalar(candidates, ScalarField::MethodType, |v| {
        MethodType::parse(v) != MethodType::Other
    });
    merged.architecture = first_scalar(candidates, ScalarField::Architecture, |v| {
        !v.eq_ignore_ascii_case("not specified")
    });

    for field in ListField::ALL {
        *merged.list_mut(field) = merge_list(candidates, field);
    }
    merged
}

fn first_scalar(
    candidates: &[StageResult],
    field: ScalarField,
    informative: impl Fn(&str) -> bool,
) -> Option<String> {
    candidates
        .iter()
        .filter_map(|c| lookup(c, field.keys()))
        .map(value_text)
        .find(|v| !v.is_empty() && informative(v))
}

fn merge_list(candidates: &[StageResult], field: ListField) -> Vec<String> {
    let cap = field.cap();
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for value in candidates.iter().filter_map(|c| lookup(c, field.keys())) {
        for item in value_items(value) {
            if out.len() >= cap {
                return out;
            }
            if seen.insert(item.clone()) {
                out.push(item);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn cand(v: Value) -> StageResult {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_empty_input_is_empty() {
        assert!(merge_candidates(&[]).is_empty());
    }

    #[test]
    fn test_first_non_empty_scalar_wins_either_order() {
        let a = cand(json!({"summary": "first", "architecture": "Transformer"}));
        let b = cand(json!({"summary": "", "architecture": ""}));
        for order in [vec![a.clone(), b.clone()], vec![b, a]] {
            let merged = merge_candidates(&order);
            assert_eq!(merged.summary.as_deref(), Some("first"));
            assert_eq!(merged.architecture.as_deref(), Some("Transformer"));
        }
    }

    #[test]
    fn test_scalar_order_follows_candidates() {
        let merged = merge_candidates(&[
            cand(json!({"summary": "one"})),
            cand(json!({"summary": "two"})),
        ]);
        assert_eq!(merged.summary.as_deref(), Some("one"));
    }

    #[test]
    fn test_architecture_rejects_not_specified() {
        let merged = merge_candidates(&[
            cand(json!({"architecture": "NOT SPECIFIED"})),
            cand(json!({"architecture": "Mixture of experts"})),
        ]);
        assert_eq!(merged.architecture.as_deref(), Some("Mixture of experts"));

        let merged = merge_candidates(&[cand(json!({"architecture": "not specified"}))]);
        assert_eq!(merged.architecture, None);
    }

    #[test]
    fn test_method_type_skips_other() {
        let merged = merge_candidates(&[
            cand(json!({"method_type": "other"})),
            cand(json!({"methodType": "RL"})),
        ]);
        assert_eq!(merged.method_type.as_deref(), Some("RL"));
    }

    #[test]
    fn test_unknown_method_label_does_not_shadow_known_one() {
        let merged = merge_candidates(&[
            cand(json!({"method_type": "transformers"})),
            cand(json!({"method_type": "rl"})),
        ]);
        assert_eq!(merged.method_type.as_deref(), Some("rl"));

        let merged = merge_candidates(&[cand(json!({"method_type": "transformers"}))]);
        assert_eq!(merged.method_type, None);
    }

    #[test]
    fn test_lists_dedupe_in_first_seen_order() {
        let merged = merge_candidates(&[
            cand(json!({"pros": ["fast", " simple ", ""]})),
            cand(json!({"pros": ["simple", "fast", "general"]})),
        ]);
        assert_eq!(merged.pros, vec!["fast", "simple", "general"]);
    }

    #[test]
    fn test_list_caps_hold_for_large_inputs() {
        let many: Vec<String> = (0..40).map(|i| format!("item {i}")).collect();
        let candidates: Vec<StageResult> = (0..3)
            .map(|_| {
                cand(json!({
                    "innovations": many, "contributions": many, "training_info": many,
                    "pros": many, "cons": many, "next_steps": many, "research_ideas": many,
                }))
            })
            .collect();
        let merged = merge_candidates(&candidates);
        for field in ListField::ALL {
            assert_eq!(merged.list(field).len(), field.cap());
            let unique: HashSet<&String> = merged.list(field).iter().collect();
            assert_eq!(unique.len(), merged.list(field).len());
        }
    }

    #[test]
    fn test_malformed_field_types_are_coerced() {
        let merged = merge_candidates(&[cand(json!({
            "summary": ["part a", "part b"],
            "cons": "single string",
            "next_steps": [1, null, {"step": "x"}],
        }))]);
        assert_eq!(merged.summary.as_deref(), Some("part a; part b"));
        assert_eq!(merged.cons, vec!["single string"]);
        assert_eq!(merged.next_steps, vec!["1", "{\"step\":\"x\"}"]);
    }

    #[test]
    fn test_all_empty_candidates_stay_empty() {
        let merged = merge_candidates(&[cand(json!({})), cand(json!({"pros": [], "summary": ""}))]);
        assert!(merged.is_empty());
    }
}
