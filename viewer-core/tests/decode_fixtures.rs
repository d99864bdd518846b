//! Golden decode fixtures — representative raw agent turns for every
//! record shape, plus the truncation and misclassification cases that
//! have bitten before. Each fixture pins the exact decode outcome.

use viewer_core::{
    decode, decode_transcript, Admission, DecodeConfig, DecodedVariant, MessageKind, Phase,
    RawMessage, Verdict,
};

fn decode_kind(content: &str, phase: Option<Phase>) -> Option<MessageKind> {
    decode(content, phase).map(|parsed| parsed.kind())
}

fn raw(content: &str, phase: Option<&str>) -> RawMessage {
    RawMessage {
        role: "debater_a".to_string(),
        model_key: "m1".to_string(),
        content: content.to_string(),
        phase: phase.map(str::to_string),
        round: Some(1),
        created_at: None,
    }
}

// ── Fixture: clean JSON, one per shape ─────────────────────────────

#[test]
fn fixture_proposal_json() {
    let content = r#"{
        "proposed_verdict": "SUPPORTED",
        "evidence_used": ["E1", "E3"],
        "key_points": ["E1 names the date directly", "E3 corroborates"],
        "uncertainties": ["E2 is ambiguous"],
        "what_would_change_my_mind": ["a primary source contradicting E1"]
    }"#;
    let parsed = decode(content, Some(Phase::Proposal)).unwrap();
    assert!(!parsed.is_truncated);
    let DecodedVariant::Proposal(proposal) = parsed.variant else {
        panic!("wrong shape");
    };
    assert_eq!(proposal.proposed_verdict, Verdict::Supported);
    assert_eq!(proposal.evidence_used, vec!["E1", "E3"]);
    assert_eq!(proposal.key_points.len(), 2);
}

#[test]
fn fixture_questions_json() {
    let content = r#"{"questions": [
        {"to": "debater_b", "q": "How does E2 support the date?", "evidence_refs": ["E2"]},
        {"to": "debater_c", "q": "Why discount E4 entirely?", "evidence_refs": ["E4"]}
    ]}"#;
    let parsed = decode(content, Some(Phase::CrossExam)).unwrap();
    let DecodedVariant::Questions(questions) = parsed.variant else {
        panic!("wrong shape");
    };
    assert_eq!(questions.questions[0].to, "debater_b");
    assert_eq!(questions.questions[1].evidence_refs, vec!["E4"]);
}

#[test]
fn fixture_answers_json() {
    let content = r#"{"answers": [
        {"q": "How does E2 support the date?", "a": "It does not directly; I rely on E1.",
         "evidence_refs": ["E1"], "admission": "uncertain"}
    ]}"#;
    let parsed = decode(content, Some(Phase::CrossExam)).unwrap();
    let DecodedVariant::Answers(answers) = parsed.variant else {
        panic!("wrong shape");
    };
    assert_eq!(answers.answers[0].admission, Admission::Uncertain);
}

#[test]
fn fixture_revision_json() {
    let content = r#"{
        "final_proposed_verdict": "INSUFFICIENT",
        "evidence_used": ["E1"],
        "what_i_changed": ["dropped the E2 inference after cross-exam"],
        "remaining_disagreements": ["weight of E4"],
        "confidence": 0.55
    }"#;
    let parsed = decode(content, Some(Phase::Revision)).unwrap();
    let DecodedVariant::Revision(revision) = parsed.variant else {
        panic!("wrong shape");
    };
    assert_eq!(revision.final_proposed_verdict, Verdict::Insufficient);
    assert!((revision.confidence - 0.55).abs() < 1e-9);
}

#[test]
fn fixture_dispute_round_json() {
    let questions = r#"{"questions": [
        {"q": "Does any evidence date the event before 1990?", "evidence_refs": ["E1", "E4"]}
    ]}"#;
    assert_eq!(
        decode_kind(questions, Some(Phase::Dispute)),
        Some(MessageKind::DisputeQuestions)
    );

    let answers = r#"{"answers": [
        {"q": "Does any evidence date the event before 1990?", "a": "No; E4 is undated.",
         "evidence_refs": ["E4"], "admission": "none"}
    ]}"#;
    assert_eq!(
        decode_kind(answers, Some(Phase::Dispute)),
        Some(MessageKind::DisputeAnswers)
    );
}

#[test]
fn fixture_judge_decision_json() {
    let content = r#"{
        "verdict": "REFUTED",
        "confidence": 0.85,
        "evidence_used": ["E1", "E2"],
        "reasoning": "E1 directly contradicts the claimed date and E2 corroborates E1."
    }"#;
    let parsed = decode(content, Some(Phase::Judge)).unwrap();
    assert!(!parsed.is_truncated);
    let DecodedVariant::JudgeDecision(decision) = parsed.variant else {
        panic!("wrong shape");
    };
    assert_eq!(decision.verdict, Verdict::Refuted);
    assert!(decision.reasoning.contains("contradicts"));
}

// ── Fixture: TOML deliveries ───────────────────────────────────────

#[test]
fn fixture_fenced_toml_proposal() {
    let content = "Here is my position.\n```toml\nproposed_verdict = \"SUPPORTED\"\nevidence_used = [\"E1\"]\nkey_points = [\"E1 is explicit\", \"no counter-evidence\"]\n```";
    let parsed = decode(content, Some(Phase::Proposal)).unwrap();
    assert!(!parsed.is_truncated);
    let DecodedVariant::Proposal(proposal) = parsed.variant else {
        panic!("wrong shape");
    };
    assert_eq!(proposal.key_points.len(), 2);
}

#[test]
fn fixture_bare_toml_judge() {
    let content = "verdict = \"INSUFFICIENT\"\nconfidence = 0.4\nevidence_used = [\"E3\"]\nreasoning = \"neither side grounded the date\"";
    let parsed = decode(content, None).unwrap();
    assert_eq!(parsed.kind(), MessageKind::JudgeDecision);
    assert!(!parsed.is_truncated);
}

// ── Fixture: noise tolerance ───────────────────────────────────────

#[test]
fn fixture_trailing_prose_after_object() {
    let content = "{\"proposed_verdict\": \"REFUTED\", \"evidence_used\": [], \"key_points\": [\"E1 contradicts\"]}\n\nHappy to elaborate on any of these points.";
    let parsed = decode(content, None).unwrap();
    assert!(!parsed.is_truncated);
    assert_eq!(parsed.kind(), MessageKind::Proposal);
}

#[test]
fn fixture_plain_prose_stays_plain() {
    assert!(decode("I believe the claim is supported, mainly because of E1.", None).is_none());
    assert!(decode("", Some(Phase::Proposal)).is_none());
}

// ── Fixture: truncation repair ─────────────────────────────────────

#[test]
fn fixture_cut_mid_identifying_value_yields_nothing() {
    // Cut inside the verdict string itself: nothing identifying survives.
    assert!(decode(r#"{"proposed_verdict": "SUPP"#, Some(Phase::Proposal)).is_none());
}

#[test]
fn fixture_cut_after_complete_fields_yields_partial_proposal() {
    let content = r#"{"proposed_verdict": "SUPPORTED", "evidence_used": ["E1"], "key_points": ["E1 is explicit"], "uncertainties": ["whether E2 refers to the same ev"#;
    let parsed = decode(content, Some(Phase::Proposal)).unwrap();
    assert!(parsed.is_truncated);
    let DecodedVariant::Proposal(proposal) = parsed.variant else {
        panic!("wrong shape");
    };
    assert_eq!(proposal.proposed_verdict, Verdict::Supported);
    assert_eq!(proposal.key_points, vec!["E1 is explicit"]);
    // The truncated trailing field is dropped, not invented.
    assert!(proposal.uncertainties.is_empty());
}

#[test]
fn fixture_cut_inside_judge_evidence_list() {
    let content = r#"{"verdict": "REFUTED", "confidence": 0.85, "reasoning": "contradicted by the primary source", "evidence_used": ["E1", "E2"#;
    let parsed = decode(content, Some(Phase::Judge)).unwrap();
    assert!(parsed.is_truncated);
    let DecodedVariant::JudgeDecision(decision) = parsed.variant else {
        panic!("wrong shape");
    };
    assert_eq!(decision.verdict, Verdict::Refuted);
    assert!(decision.reasoning.contains("primary source"));
}

#[test]
fn fixture_decode_is_idempotent() {
    let content = r#"{"final_proposed_verdict": "REFUTED", "what_i_changed": ["conceded E1"], "remaining_disagree"#;
    let first = decode(content, Some(Phase::Revision));
    let second = decode(content, Some(Phase::Revision));
    assert_eq!(first, second);
    assert!(first.unwrap().is_truncated);
}

// ── Fixture: classification priority ───────────────────────────────

#[test]
fn fixture_undirected_questions_need_dispute_phase() {
    let content = r#"{"questions": [{"q": "why?", "evidence_refs": ["E1"]}]}"#;
    assert_eq!(
        decode_kind(content, Some(Phase::Dispute)),
        Some(MessageKind::DisputeQuestions)
    );
    // Outside the dispute phase an undirected question matches nothing.
    assert_eq!(decode_kind(content, Some(Phase::CrossExam)), None);
    assert_eq!(decode_kind(content, None), None);
}

#[test]
fn fixture_answers_shape_follows_phase() {
    let content = r#"{"answers": [{"q": "why?", "a": "because E1", "evidence_refs": ["E1"], "admission": "none"}]}"#;
    assert_eq!(
        decode_kind(content, Some(Phase::Dispute)),
        Some(MessageKind::DisputeAnswers)
    );
    assert_eq!(
        decode_kind(content, Some(Phase::CrossExam)),
        Some(MessageKind::Answers)
    );
}

#[test]
fn fixture_revision_outranks_proposal_on_mixed_fields() {
    let content = r#"{
        "proposed_verdict": "SUPPORTED",
        "key_points": ["a"],
        "final_proposed_verdict": "REFUTED",
        "evidence_used": [],
        "what_i_changed": ["flipped after cross-exam"],
        "remaining_disagreements": [],
        "confidence": 0.7
    }"#;
    assert_eq!(decode_kind(content, None), Some(MessageKind::Revision));
}

// ── Fixture: whole-transcript decode ───────────────────────────────

#[test]
fn fixture_transcript_mixes_structured_and_prose() {
    let messages = vec![
        raw(
            r#"{"proposed_verdict": "SUPPORTED", "evidence_used": ["E1"], "key_points": ["E1 is explicit"]}"#,
            Some("proposal"),
        ),
        raw("Let me think about debater_b's framing for a moment.", None),
        raw(
            r#"{"questions": [{"q": "何が根拠?", "evidence_refs": []}]}"#,
            Some("dispute"),
        ),
        raw(
            r#"{"verdict": "SUPPORTED", "confidence": 0.9, "evidence_used": ["E1"], "reasoning": "uncontested"}"#,
            Some("judge"),
        ),
    ];

    let decoded = decode_transcript(&messages, &DecodeConfig::default());
    assert_eq!(decoded.len(), 4);
    assert_eq!(
        decoded[0].1.as_ref().map(|parsed| parsed.kind()),
        Some(MessageKind::Proposal)
    );
    assert!(decoded[1].1.is_none());
    assert_eq!(
        decoded[2].1.as_ref().map(|parsed| parsed.kind()),
        Some(MessageKind::DisputeQuestions)
    );
    assert_eq!(
        decoded[3].1.as_ref().map(|parsed| parsed.kind()),
        Some(MessageKind::JudgeDecision)
    );
}

// ── Fixture: adversarial input never panics ────────────────────────

#[test]
fn fixture_adversarial_inputs_never_panic() {
    let cases = [
        "{",
        "}",
        "{{{{{{{{",
        "{\"a\": \"\\",
        "{\"a\": [}]",
        "```toml\n= broken\n```",
        "{\"\u{0}\": 1}",
        "key = ",
        "{\"questions\": [{\"to\": null}]}",
        "{\"answers\": 7}",
    ];
    for case in cases {
        let _ = decode(case, None);
        let _ = decode(case, Some(Phase::Dispute));
    }
}
