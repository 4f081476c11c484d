//! Markdown reports and embedding text for indexed papers.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::docs::types::IndexedPaper;

const REPORT_EQUATIONS: usize = 20;
const SLUG_MAX_CHARS: usize = 80;

/// The text an embedding model should see for this paper, one field per line.
pub fn embedding_text(paper: &IndexedPaper) -> String {
    let insight = &paper.insight;
    [
        paper.title.clone(),
        insight.summary.clone(),
        insight.innovations.join(" "),
        insight.contributions.join(" "),
        insight.training_info.join(" "),
        insight.architecture.clone(),
        insight.pros.join(" "),
        insight.cons.join(" "),
        insight.next_steps.join(" "),
        insight.research_ideas.join(" "),
    ]
    .join("\n")
}

/// Lowercase alphanumeric runs joined by `-`, capped; `default` when nothing is left.
pub fn slug(text: &str, default: &str) -> String {
    let lower = text.trim().to_lowercase();
    let joined = lower
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if joined.is_empty() {
        return default.to_string();
    }
    joined
        .chars()
        .take(SLUG_MAX_CHARS)
        .collect::<String>()
        .trim_end_matches('-')
        .to_string()
}

fn bullets(lines: &mut Vec<String>, items: &[String], empty: &str) {
    if items.is_empty() {
        lines.push(format!("- {}", empty));
    } else {
        lines.extend(items.iter().map(|item| format!("- {}", item)));
    }
}

pub fn render_report(paper: &IndexedPaper) -> String {
    let insight = &paper.insight;
    let added_at = paper.added_at.to_rfc3339();
    let mut lines = vec![
        format!("# Paper Report: {}", paper.title),
        String::new(),
        format!("- File: {}", paper.parsed.source_path.display()),
        format!("- Indexed at (UTC): {}", added_at),
        format!("- Method type: {}", insight.method_type),
        String::new(),
        "#### 1) Summary & Innovations".to_string(),
        format!("- Summary: {}", insight.summary),
        "- Important innovations:".to_string(),
    ];
    bullets(&mut lines, &insight.innovations, "Not captured (re-index for richer analysis).");

    lines.extend([
        String::new(),
        "#### 2) Training Details".to_string(),
        "- Training setup / hyperparameters / losses:".to_string(),
    ]);
    bullets(&mut lines, &insight.training_info, "Not captured (re-index for richer analysis).");

    lines.extend([
        String::new(),
        "#### 3) Architecture".to_string(),
        format!("- {}", insight.architecture),
        String::new(),
        "#### 4) Contributions".to_string(),
        "- Key contributions:".to_string(),
    ]);
    bullets(&mut lines, &insight.contributions, "Not captured.");

    lines.extend([String::new(), "#### 5) Pros & Cons".to_string(), "- Pros:".to_string()]);
    bullets(&mut lines, &insight.pros, "Not captured.");
    lines.push("- Cons:".to_string());
    bullets(&mut lines, &insight.cons, "Not captured.");

    lines.extend([
        String::new(),
        "#### 6) Next Steps".to_string(),
        "- Suggested next steps:".to_string(),
    ]);
    bullets(
        &mut lines,
        &insight.next_steps,
        "Review paper manually and design follow-up experiments.",
    );

    lines.extend([
        String::new(),
        "#### 7) Research Ideas".to_string(),
        "- Top idea seeds:".to_string(),
    ]);
    bullets(&mut lines, &insight.research_ideas, "No generated ideas found.");

    lines.extend([
        String::new(),
        "#### 8) Equation Candidates".to_string(),
        "- Parsed equation-like lines:".to_string(),
    ]);
    let equations = &paper.parsed.equation_candidates;
    bullets(
        &mut lines,
        &equations[..equations.len().min(REPORT_EQUATIONS)],
        "No equation candidates captured.",
    );
    lines.push(String::new());

    lines.join("\n")
}

/// Write the report to `{reports_dir}/papers/{date}_{slug}.md`.
pub async fn write_report(paper: &IndexedPaper, reports_dir: &Path) -> Result<PathBuf> {
    let dir = reports_dir.join("papers");
    tokio::fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let filename = format!(
        "{}_{}.md",
        paper.added_at.date_naive(),
        slug(&paper.title, &paper.id)
    );
    let path = dir.join(filename);
    tokio::fs::write(&path, render_report(paper))
        .await
        .with_context(|| format!("Failed to write report {}", path.display()))?;
    Ok(path)
}
