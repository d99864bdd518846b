//! Content sniffer — cheap pre-check that text is worth a full decode
//! attempt, so the extractor never runs on ordinary chat prose.

use std::sync::OnceLock;

use regex::Regex;

use super::toml_block;

/// Matches a `key = value` line at the start of a line: an identifier
/// (optionally quoted or dotted) followed by `=`.
fn key_value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?m)^\s*(?:[A-Za-z0-9_.\-]+|"[^"\n]+"|'[^'\n]+')\s*="#).unwrap()
    })
}

/// Whether a block of text has TOML-ish `key = value` structure.
pub(crate) fn looks_like_key_value(text: &str) -> bool {
    key_value_re().is_match(text)
}

/// Whether the text looks like a JSON object or a TOML-ish block at all.
/// Pure and side-effect free; false for free-form prose.
pub fn is_decodable(content: &str) -> bool {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return false;
    }
    if trimmed.starts_with('{') {
        return true;
    }
    toml_block::locate_toml_block(trimmed).is_some()
}
