use serde_json::Value;
use thiserror::Error;

use super::types::StageResult;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecoveryError {
    #[error("model returned an empty response")]
    EmptyResponse,
    #[error("no JSON object could be recovered from the response")]
    UnrecoverableJson,
}

/// Pull a JSON object out of a model response that may carry code fences,
/// a prose preamble, or trailing commentary.
pub fn recover_json(response: &str) -> Result<StageResult, RecoveryError> {
    let text = response.trim();
    if text.is_empty() {
        return Err(RecoveryError::EmptyResponse);
    }

    let text = strip_fences(text);
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(text) {
        return Ok(map);
    }

    // Try each opening brace in turn until a balanced span parses.
    let mut from = 0;
    while let Some(offset) = text[from..].find('{') {
        let start = from + offset;
        let Some(end) = balanced_object_end(&text[start..]) else {
            break;
        };
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&text[start..start + end]) {
            return Ok(map);
        }
        from = start + 1;
    }

    Err(RecoveryError::UnrecoverableJson)
}

/// Remove a leading ```lang fence and a trailing ``` fence.
fn strip_fences(text: &str) -> &str {
    let mut out = text;
    if let Some(rest) = out.strip_prefix("```") {
        // Skip the language tag on the fence line
        let tag_len = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        out = rest[tag_len..].trim();
    }
    if let Some(rest) = out.strip_suffix("```") {
        out = rest.trim();
    }
    out
}

/// Byte length of the `{...}` object at the start of `text`, using a
/// brace-depth counter that ignores braces inside string literals.
fn balanced_object_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}
