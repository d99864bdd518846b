//! Best-effort repair of truncated JSON candidates.
//!
//! Two strategies, in priority order. Cutting back to the last complete
//! top-level field is lossy but never fabricates data; force-closing
//! punctuation can produce wrong nesting on deeply truncated input, so
//! it runs only when the cut yields nothing parseable.

use serde_json::Value;
use tracing::debug;

/// Repair a candidate that failed both direct parse and brace-matched
/// extraction. `None` is terminal — the decoder gives up.
pub fn repair_truncated(candidate: &str) -> Option<Value> {
    if let Some(value) = cut_to_last_complete_field(candidate) {
        return Some(value);
    }
    let closed = close_structures(candidate);
    match serde_json::from_str::<Value>(&closed) {
        Ok(value) if value.is_object() => Some(value),
        _ => None,
    }
}

/// Truncate at a top-level comma and close the object, dropping the
/// incomplete trailing field. Commas are tried from the last backwards.
fn cut_to_last_complete_field(candidate: &str) -> Option<Value> {
    let mut commas = Vec::new();
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, c) in candidate.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' | '[' if !in_string => depth += 1,
            '}' | ']' if !in_string => depth -= 1,
            ',' if !in_string && depth == 1 => commas.push(idx),
            _ => {}
        }
    }

    for &idx in commas.iter().rev() {
        let mut attempt = candidate[..idx].to_string();
        attempt.push('}');
        if let Ok(value) = serde_json::from_str::<Value>(&attempt) {
            if value.is_object() {
                debug!(cut_at = idx, "repaired by dropping truncated trailing field");
                return Some(value);
            }
        }
    }
    None
}

/// Force-close an unterminated string, then brackets, then braces.
/// Arrays must close before their enclosing object, so interleavings
/// where an object reopens inside an array stay unrepairable.
fn close_structures(candidate: &str) -> String {
    let mut open_braces = 0i32;
    let mut open_brackets = 0i32;
    let mut in_string = false;
    let mut escaped = false;

    for c in candidate.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => open_braces += 1,
            '}' if !in_string => open_braces -= 1,
            '[' if !in_string => open_brackets += 1,
            ']' if !in_string => open_brackets -= 1,
            _ => {}
        }
    }

    let mut out = candidate.to_string();
    if in_string {
        out.push('"');
    }
    for _ in 0..open_brackets.max(0) {
        out.push(']');
    }
    for _ in 0..open_braces.max(0) {
        out.push('}');
    }
    out
}

// ── Truncation predicates ──────────────────────────────────────────
//
// Named so they can be tested and tuned independently; the cap is a
// configuration value, not a magic number.

/// Content length sits exactly at the provider's output cap.
pub fn at_provider_cap(content: &str, cap: usize) -> bool {
    cap > 0 && content.chars().count() == cap
}

/// Content ends on an unescaped quote, comma, or opening bracket —
/// characters a complete record never ends on.
pub fn ends_mid_structure(content: &str) -> bool {
    let trimmed = content.trim_end();
    let Some(last) = trimmed.chars().last() else {
        return false;
    };
    match last {
        ',' | '[' | '{' | ':' => true,
        '"' => {
            // A quote preceded by an odd run of backslashes is escaped.
            let backslashes = trimmed[..trimmed.len() - 1]
                .chars()
                .rev()
                .take_while(|&c| c == '\\')
                .count();
            backslashes % 2 == 0
        }
        _ => false,
    }
}

/// Opening and closing braces/brackets outside strings do not balance.
pub fn unbalanced_brackets(content: &str) -> bool {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    for c in content.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' | '[' if !in_string => depth += 1,
            '}' | ']' if !in_string => depth -= 1,
            _ => {}
        }
    }
    depth != 0 || in_string
}

/// Whether any of the truncation signals fires for this content.
pub fn truncation_suspected(content: &str, provider_output_cap: usize) -> bool {
    at_provider_cap(content, provider_output_cap)
        || ends_mid_structure(content)
        || unbalanced_brackets(content)
}
