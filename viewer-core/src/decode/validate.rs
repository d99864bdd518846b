//! Structural validation — confirms a classified object carries the
//! minimum required fields for its shape. When the record is flagged
//! truncated, only the single most identifying field is required: a
//! truncated-but-classifiable partial record is more useful to the
//! consumer than nothing.

use serde_json::{Map, Value};

use crate::message::{Admission, MessageKind, Verdict};

/// Validate a classified object against its shape's requirements.
pub fn validate(value: &Value, kind: MessageKind, truncated: bool) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    if truncated {
        validate_truncated(obj, kind)
    } else {
        validate_full(obj, kind)
    }
}

fn validate_truncated(obj: &Map<String, Value>, kind: MessageKind) -> bool {
    match kind {
        MessageKind::Proposal => has_verdict(obj, "proposed_verdict"),
        MessageKind::Revision => has_verdict(obj, "final_proposed_verdict"),
        MessageKind::JudgeDecision => has_verdict(obj, "verdict"),
        MessageKind::Questions | MessageKind::DisputeQuestions => {
            has_non_empty_array(obj, "questions")
        }
        MessageKind::Answers | MessageKind::DisputeAnswers => has_non_empty_array(obj, "answers"),
    }
}

fn validate_full(obj: &Map<String, Value>, kind: MessageKind) -> bool {
    match kind {
        MessageKind::Proposal => {
            has_verdict(obj, "proposed_verdict")
                && has_string_array(obj, "evidence_used")
                && has_string_array(obj, "key_points")
        }
        MessageKind::Questions => {
            entries_valid(obj, "questions", |entry| {
                is_string(entry.get("to"))
                    && is_string(entry.get("q"))
                    && is_array(entry.get("evidence_refs"))
            })
        }
        MessageKind::Answers | MessageKind::DisputeAnswers => {
            entries_valid(obj, "answers", |entry| {
                is_string(entry.get("q"))
                    && is_string(entry.get("a"))
                    && is_array(entry.get("evidence_refs"))
                    && is_admission(entry.get("admission"))
            })
        }
        MessageKind::Revision => {
            has_verdict(obj, "final_proposed_verdict")
                && has_string_array(obj, "evidence_used")
                && has_string_array(obj, "what_i_changed")
                && has_string_array(obj, "remaining_disagreements")
                && has_unit_float(obj, "confidence")
        }
        MessageKind::DisputeQuestions => {
            entries_valid(obj, "questions", |entry| {
                is_string(entry.get("q")) && is_array(entry.get("evidence_refs"))
            })
        }
        MessageKind::JudgeDecision => {
            has_verdict(obj, "verdict")
                && has_unit_float(obj, "confidence")
                && has_string_array(obj, "evidence_used")
                && is_string(obj.get("reasoning"))
        }
    }
}

fn has_verdict(obj: &Map<String, Value>, key: &str) -> bool {
    obj.get(key)
        .and_then(Value::as_str)
        .and_then(Verdict::parse)
        .is_some()
}

fn has_non_empty_array(obj: &Map<String, Value>, key: &str) -> bool {
    obj.get(key)
        .and_then(Value::as_array)
        .is_some_and(|array| !array.is_empty())
}

fn has_string_array(obj: &Map<String, Value>, key: &str) -> bool {
    obj.get(key)
        .and_then(Value::as_array)
        .is_some_and(|array| array.iter().all(Value::is_string))
}

fn has_unit_float(obj: &Map<String, Value>, key: &str) -> bool {
    obj.get(key)
        .and_then(Value::as_f64)
        .is_some_and(|f| (0.0..=1.0).contains(&f))
}

fn entries_valid(
    obj: &Map<String, Value>,
    key: &str,
    entry_ok: impl Fn(&Value) -> bool,
) -> bool {
    obj.get(key)
        .and_then(Value::as_array)
        .is_some_and(|array| !array.is_empty() && array.iter().all(entry_ok))
}

fn is_string(value: Option<&Value>) -> bool {
    value.is_some_and(Value::is_string)
}

fn is_array(value: Option<&Value>) -> bool {
    value.is_some_and(Value::is_array)
}

fn is_admission(value: Option<&Value>) -> bool {
    value.is_some_and(|v| {
        serde_json::from_value::<Admission>(v.clone()).is_ok()
    })
}
