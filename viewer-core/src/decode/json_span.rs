//! JSON object extraction — direct parse first, then a single linear
//! brace-depth scan from the first `{` to pull an object span out of
//! surrounding prose.

use serde_json::Value;

/// Outcome of scanning for a JSON object span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanOutcome<'a> {
    /// A balanced `{...}` span was found.
    Closed(&'a str),
    /// The object opens but never closes — the truncation case. The
    /// candidate runs from the first `{` to end of input.
    Unterminated(&'a str),
}

/// Parse the whole input as a JSON object.
pub fn parse_direct(content: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(content.trim()) {
        Ok(value) if value.is_object() => Some(value),
        _ => None,
    }
}

/// Scan for the first `{` and match braces to its closing `}`,
/// respecting string literals and backslash escapes.
pub fn extract_object_span(content: &str) -> Option<SpanOutcome<'_>> {
    let start = content.find('{')?;
    let candidate = &content[start..];

    let mut depth = 0usize;
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
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(SpanOutcome::Closed(&candidate[..idx + 1]));
                }
            }
            _ => {}
        }
    }
    Some(SpanOutcome::Unterminated(candidate))
}
