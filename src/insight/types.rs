use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw key/value payload recovered from one model response.
pub type StageResult = Map<String, Value>;

/// Fallback text for scalar fields the model left empty.
pub const NOT_SPECIFIED: &str = "Not specified";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MethodType {
    ScalingLaw,
    Optimization,
    Rl,
    Architecture,
    Systems,
    Data,
    Theory,
    #[default]
    Other,
}

impl MethodType {
    /// Lenient parse of a model-provided label; unknown labels map to `Other`.
    pub fn parse(raw: &str) -> Self {
        let norm: String = raw
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '_' { '-' } else { c })
            .collect();
        match norm.as_str() {
            "scaling-law" | "scaling-laws" => Self::ScalingLaw,
            "optimization" | "optimisation" => Self::Optimization,
            "rl" | "reinforcement-learning" => Self::Rl,
            "architecture" => Self::Architecture,
            "systems" | "system" => Self::Systems,
            "data" => Self::Data,
            "theory" => Self::Theory,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ScalingLaw => "scaling-law",
            Self::Optimization => "optimization",
            Self::Rl => "rl",
            Self::Architecture => "architecture",
            Self::Systems => "systems",
            Self::Data => "data",
            Self::Theory => "theory",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for MethodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final structured analysis of one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightRecord {
    pub summary: String,
    pub innovations: Vec<String>,
    pub contributions: Vec<String>,
    pub method_type: MethodType,
    pub training_info: Vec<String>,
    pub architecture: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub next_steps: Vec<String>,
    pub research_ideas: Vec<String>,
}

/// List-valued insight fields, in record order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListField {
    Innovations,
    Contributions,
    TrainingInfo,
    Pros,
    Cons,
    NextSteps,
    ResearchIdeas,
}

impl ListField {
    pub const ALL: [ListField; 7] = [
        Self::Innovations,
        Self::Contributions,
        Self::TrainingInfo,
        Self::Pros,
        Self::Cons,
        Self::NextSteps,
        Self::ResearchIdeas,
    ];

    pub fn cap(&self) -> usize {
        match self {
            Self::Innovations | Self::Contributions | Self::NextSteps => 6,
            Self::TrainingInfo => 8,
            Self::Pros | Self::Cons | Self::ResearchIdeas => 5,
        }
    }

    /// Keys the model may use for this field.
    pub fn keys(&self) -> &'static [&'static str] {
        match self {
            Self::Innovations => &["innovations"],
            Self::Contributions => &["contributions"],
            Self::TrainingInfo => &["training_info", "trainingInfo"],
            Self::Pros => &["pros"],
            Self::Cons => &["cons"],
            Self::NextSteps => &["next_steps", "nextSteps"],
            Self::ResearchIdeas => &["research_ideas", "researchIdeas"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarField {
    Summary,
    MethodType,
    Architecture,
}

impl ScalarField {
    pub fn keys(&self) -> &'static [&'static str] {
        match self {
            Self::Summary => &["summary"],
            Self::MethodType => &["method_type", "methodType"],
            Self::Architecture => &["architecture"],
        }
    }
}

/// Merged but not yet normalized insight fields. Scalars are `None` when no
/// candidate supplied an informative value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedInsight {
    pub summary: Option<String>,
    pub method_type: Option<String>,
    pub architecture: Option<String>,
    pub innovations: Vec<String>,
    pub contributions: Vec<String>,
    pub training_info: Vec<String>,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub next_steps: Vec<String>,
    pub research_ideas: Vec<String>,
}

impl MergedInsight {
    pub fn list(&self, field: ListField) -> &Vec<String> {
        match field {
            ListField::Innovations => &self.innovations,
            ListField::Contributions => &self.contributions,
            ListField::TrainingInfo => &self.training_info,
            ListField::Pros => &self.pros,
            ListField::Cons => &self.cons,
            ListField::NextSteps => &self.next_steps,
            ListField::ResearchIdeas => &self.research_ideas,
        }
    }

    pub fn list_mut(&mut self, field: ListField) -> &mut Vec<String> {
        match field {
            ListField::Innovations => &mut self.innovations,
            ListField::Contributions => &mut self.contributions,
            ListField::TrainingInfo => &mut self.training_info,
            ListField::Pros => &mut self.pros,
            ListField::Cons => &mut self.cons,
            ListField::NextSteps => &mut self.next_steps,
            ListField::ResearchIdeas => &mut self.research_ideas,
        }
    }

    /// True when every stage or chunk failed to contribute anything.
    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.method_type.is_none()
            && self.architecture.is_none()
            && ListField::ALL.iter().all(|f| self.list(*f).is_empty())
    }
}

/// Coerce an untyped JSON value into display text.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(value_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("; "),
        Value::Object(_) => value.to_string(),
    }
}

/// Coerce an untyped JSON value into a list of trimmed, non-empty strings.
/// A bare scalar becomes a single-item list.
pub fn value_items(value: &Value) -> Vec<String> {
    let items = match value {
        Value::Array(items) => items.iter().map(value_text).collect(),
        other => vec![value_text(other)],
    };
    items.into_iter().filter(|s| !s.is_empty()).collect()
}

/// First present key among `keys`.
pub fn lookup<'a>(result: &'a StageResult, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| result.get(*k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_type_parse() {
        assert_eq!(MethodType::parse("scaling law"), MethodType::ScalingLaw);
        assert_eq!(MethodType::parse(" RL "), MethodType::Rl);
        assert_eq!(MethodType::parse("Reinforcement_Learning"), MethodType::Rl);
        assert_eq!(MethodType::parse("Systems"), MethodType::Systems);
        assert_eq!(MethodType::parse("biology"), MethodType::Other);
        assert_eq!(MethodType::parse(""), MethodType::Other);
    }

    #[test]
    fn test_method_type_serde_is_kebab_case() {
        let s = serde_json::to_string(&MethodType::ScalingLaw).unwrap();
        assert_eq!(s, "\"scaling-law\"");
        assert_eq!(MethodType::ScalingLaw.to_string(), "scaling-law");
    }

    #[test]
    fn test_value_items_coerces_mixed_arrays() {
        let v = json!(["  a ", 3, null, "", {"k": 1}, true]);
        assert_eq!(
            value_items(&v),
            vec!["a", "3", "{\"k\":1}", "true"]
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_value_items_wraps_scalar() {
        assert_eq!(value_items(&json!("only one")), vec!["only one".to_string()]);
        assert!(value_items(&json!(null)).is_empty());
    }

    #[test]
    fn test_lookup_accepts_aliases() {
        let m = json!({"trainingInfo": ["lr 3e-4"]});
        let map = m.as_object().unwrap();
        assert!(lookup(map, ListField::TrainingInfo.keys()).is_some());
        assert!(lookup(map, ListField::Pros.keys()).is_none());
    }

    #[test]
    fn test_merged_insight_is_empty() {
        let mut merged = MergedInsight::default();
        assert!(merged.is_empty());
        merged.pros.push("fast".to_string());
        assert!(!merged.is_empty());
    }
}
