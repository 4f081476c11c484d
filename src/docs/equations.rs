use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

pub const MAX_EQUATION_CANDIDATES: usize = 80;

/// LaTeX commands, `$...$` spans, `x = ...` assignments, or math symbols.
static EQUATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\\[a-zA-Z]+|\$[^$]{2,}\$|[A-Za-z]\s*=\s*[^\n]{1,80}|[∑∫√≈≠≤≥→λθμσπ])")
        .expect("equation pattern is valid")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Equation-like lines, whitespace-collapsed and deduplicated in order.
pub fn extract_equation_candidates(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && EQUATION_PATTERN.is_match(line))
        .map(|line| WHITESPACE.replace_all(line, " ").into_owned())
        .filter(|line| seen.insert(line.clone()))
        .take(MAX_EQUATION_CANDIDATES)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_detects_equation_lines() {
        let text = "Introduction\nL = \\sum_i  log p(x_i)\nplain prose here\nwe set $\\alpha$ small\nθ is learned";
        assert_eq!(
            extract_equation_candidates(text),
            vec!["L = \\sum_i log p(x_i)", "we set $\\alpha$ small", "θ is learned"]
        );
    }

    #[test]
    fn test_dedupes_after_whitespace_collapse() {
        let text = "y = a  x + b\ny = a x   + b\n";
        assert_eq!(extract_equation_candidates(text), vec!["y = a x + b"]);
    }

    #[test]
    fn test_caps_candidates() {
        let text: String = (0..200).map(|i| format!("x = {i}\n")).collect();
        let out = extract_equation_candidates(&text);
        assert_eq!(out.len(), MAX_EQUATION_CANDIDATES);
        assert_eq!(out[0], "x = 0");
    }
}
