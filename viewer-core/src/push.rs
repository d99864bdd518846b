//! Push event envelope — one message per push notification, plus the
//! tolerant line parsing the unreliable channel requires. Malformed
//! envelopes and non-JSON heartbeat lines are silently dropped.

use serde::{Deserialize, Serialize};

use crate::message::{RawMessage, Verdict};

/// Payload of an `agent_message` push event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMessagePayload {
    pub role: String,
    pub model_key: String,
    pub content: String,
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default)]
    pub round: Option<u32>,
}

impl AgentMessagePayload {
    /// Convert into a transcript entry. Live events carry no server
    /// timestamp.
    pub fn into_raw_message(self) -> RawMessage {
        RawMessage {
            role: self.role,
            model_key: self.model_key,
            content: self.content,
            phase: self.phase,
            round: self.round,
            created_at: None,
        }
    }
}

/// Payload of a `case_scored` push event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseScoredPayload {
    pub case_id: String,
    pub model_key: String,
    pub verdict: Verdict,
    pub score: f64,
    pub passed: bool,
}

/// Payload of a `metrics_update` push event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsUpdatePayload {
    pub completed: u32,
    pub total: u32,
}

/// Payload of a `quota_exhausted` push event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaExhaustedPayload {
    pub model_key: String,
    pub provider: String,
    pub message: String,
}

/// One push notification: `{event_type, payload}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", content = "payload", rename_all = "snake_case")]
pub enum PushEvent {
    AgentMessage(AgentMessagePayload),
    CaseScored(CaseScoredPayload),
    MetricsUpdate(MetricsUpdatePayload),
    QuotaExhausted(QuotaExhaustedPayload),
}

impl PushEvent {
    /// The wire tag for this event.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::AgentMessage(_) => "agent_message",
            Self::CaseScored(_) => "case_scored",
            Self::MetricsUpdate(_) => "metrics_update",
            Self::QuotaExhausted(_) => "quota_exhausted",
        }
    }
}

/// Non-transcript push events, surfaced to the consumer as a side
/// channel next to the message list.
#[derive(Debug, Clone, PartialEq)]
pub enum RunSideEvent {
    CaseScored(CaseScoredPayload),
    MetricsUpdate(MetricsUpdatePayload),
    QuotaExhausted(QuotaExhaustedPayload),
}

impl RunSideEvent {
    /// Split a push event into the side channel. `None` for
    /// `agent_message`, which belongs to the transcript.
    pub fn from_push(event: PushEvent) -> Option<Self> {
        match event {
            PushEvent::AgentMessage(_) => None,
            PushEvent::CaseScored(payload) => Some(Self::CaseScored(payload)),
            PushEvent::MetricsUpdate(payload) => Some(Self::MetricsUpdate(payload)),
            PushEvent::QuotaExhausted(payload) => Some(Self::QuotaExhausted(payload)),
        }
    }
}

/// Parse one line off the push channel. Returns `None` for empty lines,
/// `:`-prefixed heartbeats, unknown event types, and malformed JSON —
/// all of which the channel is allowed to carry.
pub fn parse_push_line(line: &str) -> Option<PushEvent> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(':') {
        return None;
    }
    let data = trimmed.strip_prefix("data:").map(str::trim).unwrap_or(trimmed);
    serde_json::from_str(data).ok()
}
