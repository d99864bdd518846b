//! Shared data model — raw agent turns, the seven structured record
//! shapes, and the run status machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Verdict on the claim under debate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// The evidence supports the claim.
    Supported,
    /// The evidence refutes the claim.
    Refuted,
    /// The evidence is insufficient either way.
    Insufficient,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Supported => write!(f, "SUPPORTED"),
            Self::Refuted => write!(f, "REFUTED"),
            Self::Insufficient => write!(f, "INSUFFICIENT"),
        }
    }
}

impl Verdict {
    /// Parse a verdict label as it appears on the wire.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SUPPORTED" => Some(Self::Supported),
            "REFUTED" => Some(Self::Refuted),
            "INSUFFICIENT" => Some(Self::Insufficient),
            _ => None,
        }
    }
}

/// What an answering agent concedes about its own position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Admission {
    /// No concession.
    #[default]
    None,
    /// Concedes its evidence is insufficient.
    Insufficient,
    /// Concedes it is uncertain.
    Uncertain,
}

impl std::fmt::Display for Admission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Insufficient => write!(f, "insufficient"),
            Self::Uncertain => write!(f, "uncertain"),
        }
    }
}

/// Stage of the debate protocol that produced a message. Used as a hint
/// to disambiguate structurally similar record shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Proposal,
    CrossExam,
    Revision,
    Dispute,
    Judge,
}

impl Phase {
    /// Parse a phase label. Unknown labels yield `None` — the decoder
    /// treats them as hint-absent rather than erroring.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "proposal" => Some(Self::Proposal),
            "cross_exam" => Some(Self::CrossExam),
            "revision" => Some(Self::Revision),
            "dispute" => Some(Self::Dispute),
            "judge" => Some(Self::Judge),
            _ => None,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Proposal => write!(f, "proposal"),
            Self::CrossExam => write!(f, "cross_exam"),
            Self::Revision => write!(f, "revision"),
            Self::Dispute => write!(f, "dispute"),
            Self::Judge => write!(f, "judge"),
        }
    }
}

/// Tag identifying which of the seven record shapes a message carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Proposal,
    Questions,
    Answers,
    Revision,
    DisputeQuestions,
    DisputeAnswers,
    JudgeDecision,
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Proposal => write!(f, "proposal"),
            Self::Questions => write!(f, "questions"),
            Self::Answers => write!(f, "answers"),
            Self::Revision => write!(f, "revision"),
            Self::DisputeQuestions => write!(f, "dispute_questions"),
            Self::DisputeAnswers => write!(f, "dispute_answers"),
            Self::JudgeDecision => write!(f, "judge_decision"),
        }
    }
}

/// An agent's opening position on the claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub proposed_verdict: Verdict,
    #[serde(default)]
    pub evidence_used: Vec<String>,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub uncertainties: Vec<String>,
    #[serde(default)]
    pub what_would_change_my_mind: Vec<String>,
}

/// A cross-examination question directed at a specific agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectedQuestion {
    /// The agent this question is addressed to.
    pub to: String,
    pub q: String,
    #[serde(default)]
    pub evidence_refs: Vec<String>,
}

/// Cross-examination questions from one agent to its peers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionsMessage {
    pub questions: Vec<DirectedQuestion>,
}

/// A single answer to a cross-examination or dispute question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub q: String,
    #[serde(default)]
    pub a: String,
    #[serde(default)]
    pub evidence_refs: Vec<String>,
    #[serde(default)]
    pub admission: Admission,
}

/// Answers to cross-examination questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswersMessage {
    pub answers: Vec<Answer>,
}

/// An agent's revised position after cross-examination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    pub final_proposed_verdict: Verdict,
    #[serde(default)]
    pub evidence_used: Vec<String>,
    #[serde(default)]
    pub what_i_changed: Vec<String>,
    #[serde(default)]
    pub remaining_disagreements: Vec<String>,
    #[serde(default)]
    pub confidence: f64,
}

/// A dispute-phase question. Unlike [`DirectedQuestion`] it carries no
/// `to` field — that absence is what distinguishes the two shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisputeQuestion {
    pub q: String,
    #[serde(default)]
    pub evidence_refs: Vec<String>,
}

/// Questions raised during the dispute phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisputeQuestionsMessage {
    pub questions: Vec<DisputeQuestion>,
}

/// Answers given during the dispute phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisputeAnswersMessage {
    pub answers: Vec<Answer>,
}

/// The judge's final ruling on the claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeDecision {
    pub verdict: Verdict,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub evidence_used: Vec<String>,
    #[serde(default)]
    pub reasoning: String,
}

/// The closed set of structured record shapes an agent turn can take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DecodedVariant {
    Proposal(Proposal),
    Questions(QuestionsMessage),
    Answers(AnswersMessage),
    Revision(Revision),
    DisputeQuestions(DisputeQuestionsMessage),
    DisputeAnswers(DisputeAnswersMessage),
    JudgeDecision(JudgeDecision),
}

impl DecodedVariant {
    /// The tag for this shape.
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Proposal(_) => MessageKind::Proposal,
            Self::Questions(_) => MessageKind::Questions,
            Self::Answers(_) => MessageKind::Answers,
            Self::Revision(_) => MessageKind::Revision,
            Self::DisputeQuestions(_) => MessageKind::DisputeQuestions,
            Self::DisputeAnswers(_) => MessageKind::DisputeAnswers,
            Self::JudgeDecision(_) => MessageKind::JudgeDecision,
        }
    }
}

/// Result of decoding one raw agent turn. Created fresh per decode call
/// and never mutated; decoding is cheap enough to redo per render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedMessage {
    /// The decoded record.
    pub variant: DecodedVariant,
    /// Whether the record was recovered from truncated input. Partial:
    /// non-identifying fields may be missing or defaulted.
    pub is_truncated: bool,
}

impl ParsedMessage {
    pub fn kind(&self) -> MessageKind {
        self.variant.kind()
    }
}

/// One raw agent turn as emitted by the debate engine. Immutable once
/// emitted; owned by the transcript once ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMessage {
    pub role: String,
    pub model_key: String,
    pub content: String,
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default)]
    pub round: Option<u32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl RawMessage {
    /// Phase hint for the decoder, if the label is recognized.
    pub fn phase_hint(&self) -> Option<Phase> {
        self.phase.as_deref().and_then(Phase::parse)
    }
}

/// Lifecycle status of a debate run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    /// Whether this is a terminal status — no further polling or live
    /// updates are expected past this point.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Summary returned by `GET /runs/{id}`. Fields beyond the status are
/// ignored — only the status drives the poll/terminal logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub status: RunStatus,
}
