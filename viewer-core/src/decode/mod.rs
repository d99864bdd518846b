//! Decoder — raw agent text to a structured record, best effort.
//!
//! Pipeline: sniff → TOML extraction → direct JSON parse → brace-matched
//! span extraction → truncation repair → classify → validate. Every
//! failure path returns `None`; plain-text turns are legitimate and the
//! caller falls back to rendering them as-is. Decoding is pure and
//! idempotent, so callers may redo it per render.

pub mod classify;
pub mod json_span;
pub mod repair;
pub mod sniff;
pub mod toml_block;
pub mod validate;

use serde_json::Value;
use tracing::trace;

use crate::config::DecodeConfig;
use crate::message::{
    AnswersMessage, DecodedVariant, DisputeAnswersMessage, DisputeQuestionsMessage, JudgeDecision,
    MessageKind, ParsedMessage, Phase, Proposal, QuestionsMessage, RawMessage, Revision,
};

pub use classify::classify;
pub use json_span::{extract_object_span, parse_direct, SpanOutcome};
pub use repair::{
    at_provider_cap, ends_mid_structure, repair_truncated, truncation_suspected,
    unbalanced_brackets,
};
pub use sniff::is_decodable;
pub use toml_block::extract_toml;
pub use validate::validate;

/// Decode one raw agent turn with default heuristics.
pub fn decode(content: &str, phase: Option<Phase>) -> Option<ParsedMessage> {
    decode_with(content, phase, &DecodeConfig::default())
}

/// Decode one raw agent turn.
pub fn decode_with(
    content: &str,
    phase: Option<Phase>,
    config: &DecodeConfig,
) -> Option<ParsedMessage> {
    if !sniff::is_decodable(content) {
        return None;
    }

    let (value, is_truncated) = extract_value(content, config)?;

    let kind = classify::classify(&value, phase)?;
    if !validate::validate(&value, kind, is_truncated) {
        return None;
    }
    let variant = to_variant(value, kind)?;
    Some(ParsedMessage {
        variant,
        is_truncated,
    })
}

/// Decode a message using its own phase label as the hint.
pub fn decode_message(message: &RawMessage, config: &DecodeConfig) -> Option<ParsedMessage> {
    decode_with(&message.content, message.phase_hint(), config)
}

/// Apply the decoder across a transcript, pairing each raw message with
/// its decoded record (or `None` for plain text).
pub fn decode_transcript<'a>(
    messages: &'a [RawMessage],
    config: &DecodeConfig,
) -> Vec<(&'a RawMessage, Option<ParsedMessage>)> {
    messages
        .iter()
        .map(|message| (message, decode_message(message, config)))
        .collect()
}

/// Run the extraction chain: TOML, direct JSON, brace-matched span,
/// repair. The boolean is the truncation flag.
fn extract_value(content: &str, config: &DecodeConfig) -> Option<(Value, bool)> {
    if let Some(value) = toml_block::extract_toml(content) {
        trace!("decoded via toml path");
        return Some((value, false));
    }

    if let Some(value) = json_span::parse_direct(content) {
        trace!("decoded via direct json parse");
        return Some((value, false));
    }

    match json_span::extract_object_span(content)? {
        SpanOutcome::Closed(span) => match serde_json::from_str::<Value>(span) {
            Ok(value) if value.is_object() => {
                let truncated = span.len() < content.trim().len()
                    && repair::truncation_suspected(content, config.provider_output_cap);
                trace!(truncated, "decoded via brace-matched span");
                Some((value, truncated))
            }
            _ => {
                let value = repair::repair_truncated(span)?;
                trace!("decoded via repair of closed-but-unparseable span");
                Some((value, true))
            }
        },
        SpanOutcome::Unterminated(candidate) => {
            let value = repair::repair_truncated(candidate)?;
            trace!("decoded via repair of unterminated span");
            Some((value, true))
        }
    }
}

fn to_variant(value: Value, kind: MessageKind) -> Option<DecodedVariant> {
    let variant = match kind {
        MessageKind::Proposal => {
            DecodedVariant::Proposal(serde_json::from_value::<Proposal>(value).ok()?)
        }
        MessageKind::Questions => {
            DecodedVariant::Questions(serde_json::from_value::<QuestionsMessage>(value).ok()?)
        }
        MessageKind::Answers => {
            DecodedVariant::Answers(serde_json::from_value::<AnswersMessage>(value).ok()?)
        }
        MessageKind::Revision => {
            DecodedVariant::Revision(serde_json::from_value::<Revision>(value).ok()?)
        }
        MessageKind::DisputeQuestions => DecodedVariant::DisputeQuestions(
            serde_json::from_value::<DisputeQuestionsMessage>(value).ok()?,
        ),
        MessageKind::DisputeAnswers => DecodedVariant::DisputeAnswers(
            serde_json::from_value::<DisputeAnswersMessage>(value).ok()?,
        ),
        MessageKind::JudgeDecision => {
            DecodedVariant::JudgeDecision(serde_json::from_value::<JudgeDecision>(value).ok()?)
        }
    };
    Some(variant)
}
