pub const SYSTEM_PROMPT: &str =
    "You are a research assistant. Return concise, accurate analysis in JSON only.";

const METHOD_TYPES: &str = "scaling law, optimization, RL, architecture, systems, data, theory, other";

/// Sequential stages of the multi-hop analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Overview,
    Summary,
    Technical,
    Critique,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Summary => "summary",
            Self::Technical => "technical",
            Self::Critique => "critique",
        }
    }
}

/// Fields carried forward from the overview stage into later prompts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overview {
    pub paper_overview: String,
    pub method_type: String,
    pub key_claims: Vec<String>,
    pub likely_sections: Vec<String>,
}

pub fn overview_prompt(context: &str, equations: &str) -> String {
    format!(
        r#"You are performing step 1 of a multi-hop paper analysis.
First, build a concise global understanding of the paper.

Return strict JSON with keys:
- paper_overview (string, 4-8 sentences)
- method_type (one of: {METHOD_TYPES})
- key_claims (array of 4-8 strings)
- likely_sections (array of section names inferred from text)

Paper context:
{context}

Equation candidates:
{equations}"#
    )
}

pub fn summary_prompt(overview: &Overview, context: &str) -> String {
    let claims = overview
        .key_claims
        .iter()
        .take(8)
        .map(|c| format!("- {}", c))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        r#"You are performing step 2A of a multi-hop paper analysis.
Use the paper overview and source text to extract summary-level sections.

Return strict JSON with keys:
- summary (string)
- innovations (array of 3-6 important innovations)
- contributions (array of 3-6 concrete contributions)

Paper overview:
{overview}

Key claims:
{claims}

Paper context:
{context}"#,
        overview = overview.paper_overview,
    )
}

pub fn technical_prompt(overview: &Overview, equations: &str, context: &str) -> String {
    format!(
        r#"You are performing step 2B of a multi-hop paper analysis.
Focus on technical internals.

Return strict JSON with keys:
- training_info (array of 3-8 items including hyperparameters, losses, optimizer, schedule, data setup if present)
- architecture (string, describe the architecture/system if present, else 'Not specified')

Paper overview:
{overview}

Method type:
{method}

Equation candidates:
{equations}

Paper context:
{context}"#,
        overview = overview.paper_overview,
        method = overview.method_type,
    )
}

pub fn critique_prompt(overview: &Overview, context: &str) -> String {
    format!(
        r#"You are performing step 2C of a multi-hop paper analysis.
Generate critique and forward-looking research direction.

Return strict JSON with keys:
- pros (array of 2-5 strengths)
- cons (array of 2-5 limitations)
- next_steps (array of 3-6 concrete follow-up steps)
- research_ideas (array of exactly 5 concrete research ideas)

Paper overview:
{overview}

Method type:
{method}

Paper context:
{context}"#,
        overview = overview.paper_overview,
        method = overview.method_type,
    )
}

/// Single all-fields prompt used when each chunk is analyzed independently.
pub fn chunk_prompt(chunk: &str, index: usize, total: usize, equations: &str) -> String {
    format!(
        r#"Analyze this excerpt of a research paper (part {part} of {total}).

Return strict JSON with keys:
- summary (string)
- innovations (array of up to 6 strings)
- contributions (array of up to 6 strings)
- method_type (one of: {METHOD_TYPES})
- training_info (array of up to 8 items: hyperparameters, losses, optimizer, schedule, data setup)
- architecture (string, else 'Not specified')
- pros (array of up to 5 strengths)
- cons (array of up to 5 limitations)
- next_steps (array of up to 6 follow-up steps)
- research_ideas (array of exactly 5 concrete research ideas)

Use empty arrays or empty strings for anything this excerpt does not cover.

Paper excerpt:
{chunk}

Equation candidates:
{equations}"#,
        part = index + 1,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overview() -> Overview {
        Overview {
            paper_overview: "A paper about sparse attention.".to_string(),
            method_type: "architecture".to_string(),
            key_claims: (1..=10).map(|i| format!("claim {i}")).collect(),
            likely_sections: vec![],
        }
    }

    #[test]
    fn test_overview_prompt_embeds_context_and_equations() {
        let p = overview_prompt("CONTEXT BODY", "E = mc^2");
        assert!(p.contains("CONTEXT BODY"));
        assert!(p.contains("E = mc^2"));
        assert!(p.contains("paper_overview"));
    }

    #[test]
    fn test_summary_prompt_caps_claims() {
        let p = summary_prompt(&overview(), "ctx");
        assert!(p.contains("- claim 8"));
        assert!(!p.contains("- claim 9"));
        assert!(p.contains("A paper about sparse attention."));
    }

    #[test]
    fn test_later_stages_carry_method_type() {
        let o = overview();
        assert!(technical_prompt(&o, "eq", "ctx").contains("Method type:\narchitecture"));
        assert!(critique_prompt(&o, "ctx").contains("exactly 5"));
    }

    #[test]
    fn test_chunk_prompt_numbers_parts_from_one() {
        let p = chunk_prompt("body", 0, 3, "");
        assert!(p.contains("part 1 of 3"));
        assert!(p.contains("research_ideas"));
    }
}
