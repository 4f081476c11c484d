//! Context-window bookkeeping: document chunking and prompt truncation.
//!
//! All lengths are counted in `char`s so slicing never splits a UTF-8 sequence.

use std::collections::HashSet;

/// Fixed characters-per-token ratio used for every estimate.
pub const CHARS_PER_TOKEN: usize = 4;

/// Leading characters used to detect duplicate windows.
const FINGERPRINT_CHARS: usize = 120;

/// Below this many characters a prompt is cut without preserving head and tail.
const MIN_STRUCTURED_CHARS: usize = 200;

/// The shrink loop stops once the prompt is this short.
const MIN_SHRINK_CHARS: usize = 120;

const TRUNCATION_MARKER: &str = "\n\n[... truncated for token budget ...]\n\n";

/// Split document text into at most three windows of `max_chunk_chars`:
/// head, centred middle, and tail. Never returns an empty list.
pub fn chunk_text(text: &str, max_chunk_chars: usize) -> Vec<String> {
    let max_chunk_chars = max_chunk_chars.max(1);
    let clean = text.trim();
    if clean.is_empty() {
        return vec![String::new()];
    }

    let chars: Vec<char> = clean.chars().collect();
    let len = chars.len();
    if len <= max_chunk_chars {
        return vec![clean.to_string()];
    }

    let middle_start = (len / 2).saturating_sub(max_chunk_chars / 2);
    let windows = [
        (0, max_chunk_chars),
        (middle_start, (middle_start + max_chunk_chars).min(len)),
        (len - max_chunk_chars, len),
    ];

    let mut seen = HashSet::new();
    let mut chunks = Vec::with_capacity(windows.len());
    for (start, end) in windows {
        let window = &chars[start..end];
        let marker: String = window.iter().take(FINGERPRINT_CHARS).collect();
        if seen.insert(marker) {
            chunks.push(window.iter().collect());
        }
    }
    chunks
}

pub fn estimate_tokens(text: &str) -> usize {
    (text.chars().count() / CHARS_PER_TOKEN).max(1)
}

/// Fit `text` into `max_tokens`, keeping the opening 65% and closing 30% of
/// the character allowance around an explicit marker.
pub fn truncate_to_budget(text: &str, max_tokens: usize) -> String {
    if estimate_tokens(text) <= max_tokens {
        return text.to_string();
    }

    let max_chars = max_tokens * CHARS_PER_TOKEN;
    if max_chars < MIN_STRUCTURED_CHARS {
        return take_chars(text, max_chars);
    }

    let head_len = max_chars * 65 / 100;
    let tail_len = max_chars * 30 / 100;
    let total = text.chars().count();
    let head = take_chars(text, head_len);
    let tail: String = text.chars().skip(total.saturating_sub(tail_len)).collect();

    let mut truncated = format!("{head}{TRUNCATION_MARKER}{tail}");
    loop {
        let len = truncated.chars().count();
        if estimate_tokens(&truncated) <= max_tokens || len <= MIN_SHRINK_CHARS {
            break;
        }
        truncated = take_chars(&truncated, len * 9 / 10);
    }
    truncated
}

fn take_chars(text: &str, n: usize) -> String {
    text.chars().take(n).collect()
}
