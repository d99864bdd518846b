//! Type discriminator — maps a decoded object plus an optional phase
//! hint to exactly one record shape.
//!
//! The priority order is load-bearing: `Proposal` and `Revision` share
//! field names, and the two questions shapes differ only in whether the
//! first entry carries a `to` field. Reordering these checks changes
//! classification outcomes on ambiguous input.

use serde_json::Value;

use crate::message::{MessageKind, Phase};

/// Classify a decoded object. `None` means no known shape matched.
pub fn classify(value: &Value, phase: Option<Phase>) -> Option<MessageKind> {
    let obj = value.as_object()?;

    // 1. Judge phase with verdict + reasoning.
    if phase == Some(Phase::Judge) && obj.contains_key("verdict") && obj.contains_key("reasoning")
    {
        return Some(MessageKind::JudgeDecision);
    }

    // 2. Dispute phase: questions without `to`, else answers.
    if phase == Some(Phase::Dispute) {
        if let Some(first) = obj
            .get("questions")
            .and_then(Value::as_array)
            .and_then(|questions| questions.first())
        {
            if first.get("to").is_none() {
                return Some(MessageKind::DisputeQuestions);
            }
        }
        if non_empty_array(obj.get("answers")) {
            return Some(MessageKind::DisputeAnswers);
        }
    }

    // 3. Judge shape regardless of phase — the most structurally
    // specific, so it is checked before Revision/Proposal.
    if obj.contains_key("verdict") && obj.get("reasoning").is_some_and(Value::is_string) {
        return Some(MessageKind::JudgeDecision);
    }

    // 4. Revision before Proposal: a revision also carries verdict-like
    // and evidence fields.
    if obj.contains_key("final_proposed_verdict")
        && obj.get("what_i_changed").is_some_and(Value::is_array)
    {
        return Some(MessageKind::Revision);
    }

    // 5. Proposal.
    if obj.contains_key("proposed_verdict") && obj.get("key_points").is_some_and(Value::is_array) {
        return Some(MessageKind::Proposal);
    }

    // 6. Directed questions (first entry has `to`).
    if let Some(first) = obj
        .get("questions")
        .and_then(Value::as_array)
        .and_then(|questions| questions.first())
    {
        if first.get("to").is_some() {
            return Some(MessageKind::Questions);
        }
    }

    // 7. Answers.
    if non_empty_array(obj.get("answers")) {
        return Some(MessageKind::Answers);
    }

    // 8. Unknown.
    None
}

fn non_empty_array(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_array)
        .is_some_and(|array| !array.is_empty())
}
