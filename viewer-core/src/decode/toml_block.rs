//! TOML block location and parsing. The judge phase emits TOML, so this
//! path runs before the JSON path. A strict `toml` parse is attempted
//! first; generated output is often slightly malformed, so a lenient
//! line reader backs it up.

use serde_json::{Map, Value};

use super::sniff;

/// Locate the TOML-ish span inside raw text: a fenced ```toml block,
/// else a generic fenced block whose body has `key = value` shape, else
/// the whole trimmed input if it has that shape and is not JSON.
pub(crate) fn locate_toml_block(text: &str) -> Option<&str> {
    if let Some(body) = fenced_block(text, Some("toml")) {
        return Some(body);
    }
    if let Some(body) = fenced_block(text, None) {
        if sniff::looks_like_key_value(body) {
            return Some(body);
        }
    }
    let trimmed = text.trim();
    if !trimmed.starts_with('{') && sniff::looks_like_key_value(trimmed) {
        return Some(trimmed);
    }
    None
}

/// Extract and parse a TOML block into a JSON object. Returns `None`
/// when no block is found or the block yields zero keys.
pub fn extract_toml(content: &str) -> Option<Value> {
    let block = locate_toml_block(content.trim())?;

    if let Ok(table) = toml::from_str::<toml::Table>(block) {
        if !table.is_empty() {
            if let Ok(value) = serde_json::to_value(&table) {
                return Some(value);
            }
        }
    }

    lenient_parse(block)
}

/// Body of the first fenced code block, tolerating a missing closing
/// fence (the truncation case). `lang = None` matches any fence.
fn fenced_block<'a>(text: &'a str, lang: Option<&str>) -> Option<&'a str> {
    let (open_idx, open_len) = match lang {
        Some(lang) => {
            let marker = format!("```{lang}");
            (text.find(&marker)?, marker.len())
        }
        None => (text.find("```")?, 3),
    };
    let after = &text[open_idx + open_len..];
    let body_start = after.find('\n')? + 1;
    let body = &after[body_start..];
    let end = body.find("```").unwrap_or(body.len());
    let body = body[..end].trim();
    if body.is_empty() {
        None
    } else {
        Some(body)
    }
}

/// Minimal line-based reader for TOML-ish `key = value` text: quoted
/// strings with `\"`, `\'`, `\n` escapes, bracketed arrays, integers,
/// floats, booleans, bare strings. `#` begins a line comment.
fn lenient_parse(block: &str) -> Option<Value> {
    let mut map = Map::new();
    for line in block.lines() {
        let line = strip_line_comment(line).trim();
        if line.is_empty() {
            continue;
        }
        let Some((raw_key, raw_value)) = line.split_once('=') else {
            continue;
        };
        let raw_key = raw_key.trim();
        let quoted_key = raw_key.starts_with('"') || raw_key.starts_with('\'');
        let key = raw_key.trim_matches(|c| c == '"' || c == '\'');
        if key.is_empty() || (!quoted_key && key.contains(char::is_whitespace)) {
            continue;
        }
        map.insert(key.to_string(), parse_value(raw_value.trim()));
    }
    if map.is_empty() {
        None
    } else {
        Some(Value::Object(map))
    }
}

fn parse_value(raw: &str) -> Value {
    if raw.starts_with('"') || raw.starts_with('\'') {
        return Value::String(parse_quoted(raw));
    }
    if raw.starts_with('[') {
        return parse_array(raw);
    }
    if raw == "true" {
        return Value::Bool(true);
    }
    if raw == "false" {
        return Value::Bool(false);
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        return Value::from(f);
    }
    // Bare string.
    Value::String(raw.to_string())
}

/// Read a quoted string, honoring backslash escapes. An unterminated
/// string (truncated mid-value) yields everything after the quote.
fn parse_quoted(raw: &str) -> String {
    let mut chars = raw.chars();
    let quote = chars.next().unwrap_or('"');
    let mut out = String::new();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => break,
            },
            c if c == quote => break,
            c => out.push(c),
        }
    }
    out
}

/// Bracketed array: JSON-compatible parse if possible, else comma-split
/// with quote stripping.
fn parse_array(raw: &str) -> Value {
    if let Ok(value) = serde_json::from_str::<Value>(raw) {
        if value.is_array() {
            return value;
        }
    }
    let inner = raw.strip_prefix('[').unwrap_or(raw);
    let inner = inner.strip_suffix(']').unwrap_or(inner);
    let items = inner
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            let stripped = item.trim_matches(|c| c == '"' || c == '\'');
            if let Ok(i) = stripped.parse::<i64>() {
                Value::from(i)
            } else if let Ok(f) = stripped.parse::<f64>() {
                Value::from(f)
            } else {
                Value::String(stripped.to_string())
            }
        })
        .collect();
    Value::Array(items)
}

/// Cut a line at the first `#` that is not inside a quoted string.
fn strip_line_comment(line: &str) -> &str {
    let mut in_string: Option<char> = None;
    let mut escaped = false;
    for (idx, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string.is_some() => escaped = true,
            '"' | '\'' => match in_string {
                Some(q) if q == c => in_string = None,
                None => in_string = Some(c),
                _ => {}
            },
            '#' if in_string.is_none() => return &line[..idx],
            _ => {}
        }
    }
    line
}
