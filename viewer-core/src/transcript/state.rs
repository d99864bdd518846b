//! Per-run transcript state machine — one ordered, de-duplicated
//! message list reconstructed from uncoordinated delivery paths.
//!
//! Invariants the consumer relies on: the list length is monotonically
//! non-decreasing, and an entry never changes identity or position once
//! observed. The live path is authoritative; the poll path only fills
//! gaps; the historical path fires at most once for an already-finished
//! run.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::message::{RawMessage, RunStatus};

/// Ingestion stage of a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptStage {
    /// No messages collected yet.
    Empty,
    /// Messages arriving via the live and/or poll paths.
    Live,
    /// Populated by the one-shot historical load.
    HistoricalLoaded,
}

impl std::fmt::Display for TranscriptStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::Live => write!(f, "live"),
            Self::HistoricalLoaded => write!(f, "historical_loaded"),
        }
    }
}

/// The reconstructed transcript for one run view.
#[derive(Debug, Clone)]
pub struct Transcript {
    run_id: String,
    stage: TranscriptStage,
    messages: Vec<RawMessage>,
    /// One-shot guard for the historical path; lives until a run switch.
    historical_claimed: bool,
}

impl Transcript {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            stage: TranscriptStage::Empty,
            messages: Vec::new(),
            historical_claimed: false,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn stage(&self) -> TranscriptStage {
        self.stage
    }

    /// Read-only view of the ordered message list.
    pub fn messages(&self) -> &[RawMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Live path: append in arrival order, no deduplication. Push is
    /// primary and authoritative.
    pub fn append_live(&mut self, message: RawMessage) {
        self.messages.push(message);
        if self.stage == TranscriptStage::Empty {
            self.stage = TranscriptStage::Live;
        }
    }

    /// Poll path: reconcile against the authoritative full list. The
    /// trigger is a length difference; a longer list is applied as a
    /// suffix append so already-observed entries keep their identity,
    /// and a shorter one is ignored as a race with an in-flight live
    /// append. Returns the number of messages added.
    pub fn reconcile_poll(&mut self, authoritative: Vec<RawMessage>) -> usize {
        let local = self.messages.len();
        if authoritative.len() <= local {
            if authoritative.len() < local {
                debug!(
                    run_id = %self.run_id,
                    local,
                    fetched = authoritative.len(),
                    "poll returned fewer messages than local, ignoring"
                );
            }
            return 0;
        }

        let added = authoritative.len() - local;
        self.messages.extend(authoritative.into_iter().skip(local));
        if self.stage == TranscriptStage::Empty {
            self.stage = TranscriptStage::Live;
        }
        debug!(run_id = %self.run_id, added, "poll reconciliation appended messages");
        added
    }

    /// Historical path, step one: claim the one-shot slot. True exactly
    /// once per run view, and only when the run is terminal and nothing
    /// was collected live.
    pub fn claim_historical_fetch(&mut self, status: RunStatus) -> bool {
        if !status.is_terminal() || !self.messages.is_empty() || self.historical_claimed {
            return false;
        }
        self.historical_claimed = true;
        true
    }

    /// Historical path, step two: install the fetched list. Dropped if
    /// a live append raced in between claim and fetch completion.
    pub fn apply_historical(&mut self, messages: Vec<RawMessage>) {
        if !self.messages.is_empty() {
            debug!(run_id = %self.run_id, "live messages arrived during historical fetch, dropping it");
            return;
        }
        self.messages = messages;
        self.stage = TranscriptStage::HistoricalLoaded;
    }

    pub fn historical_claimed(&self) -> bool {
        self.historical_claimed
    }

    /// Switching to a different run resets the list and clears the
    /// historical guard.
    pub fn switch_run(&mut self, run_id: impl Into<String>) {
        self.run_id = run_id.into();
        self.stage = TranscriptStage::Empty;
        self.messages.clear();
        self.historical_claimed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(n: usize) -> RawMessage {
        RawMessage {
            role: "debater_a".to_string(),
            model_key: "m1".to_string(),
            content: format!("message {n}"),
            phase: Some("proposal".to_string()),
            round: Some(1),
            created_at: None,
        }
    }

    fn msgs(range: std::ops::Range<usize>) -> Vec<RawMessage> {
        range.map(msg).collect()
    }

    #[test]
    fn test_new_is_empty() {
        let transcript = Transcript::new("run-1");
        assert_eq!(transcript.stage(), TranscriptStage::Empty);
        assert!(transcript.is_empty());
        assert!(!transcript.historical_claimed());
    }

    #[test]
    fn test_live_append_in_order() {
        let mut transcript = Transcript::new("run-1");
        transcript.append_live(msg(0));
        transcript.append_live(msg(1));
        assert_eq!(transcript.stage(), TranscriptStage::Live);
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.messages()[0].content, "message 0");
        assert_eq!(transcript.messages()[1].content, "message 1");
    }

    #[test]
    fn test_poll_equal_length_is_noop() {
        let mut transcript = Transcript::new("run-1");
        transcript.append_live(msg(0));
        transcript.append_live(msg(1));

        // Poll returns [A, B] while local is already [A, B]: nothing
        // changes, entry identity preserved.
        let before: Vec<_> = transcript.messages().to_vec();
        assert_eq!(transcript.reconcile_poll(msgs(0..2)), 0);
        assert_eq!(transcript.messages(), &before[..]);
    }

    #[test]
    fn test_poll_fills_gap_as_suffix() {
        let mut transcript = Transcript::new("run-1");
        transcript.append_live(msg(0));

        assert_eq!(transcript.reconcile_poll(msgs(0..3)), 2);
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.messages()[2].content, "message 2");
    }

    #[test]
    fn test_poll_shorter_is_ignored() {
        let mut transcript = Transcript::new("run-1");
        transcript.append_live(msg(0));
        transcript.append_live(msg(1));

        // Race: poll snapshot taken before the second live append.
        assert_eq!(transcript.reconcile_poll(msgs(0..1)), 0);
        assert_eq!(transcript.len(), 2);
    }

    #[test]
    fn test_length_never_decreases_under_interleaving() {
        let mut transcript = Transcript::new("run-1");
        let mut observed_len = 0;

        // An arbitrary interleaving of live appends and poll replies.
        transcript.append_live(msg(0));
        let first_observed = transcript.messages()[0].clone();
        for step in 0..6 {
            match step % 3 {
                0 => transcript.append_live(msg(100 + step)),
                1 => {
                    transcript.reconcile_poll(msgs(0..step));
                }
                _ => {
                    transcript.reconcile_poll(msgs(0..transcript.len() + 2));
                }
            }
            assert!(transcript.len() >= observed_len, "length decreased");
            observed_len = transcript.len();
            assert_eq!(
                transcript.messages()[0],
                first_observed,
                "previously observed entry changed identity"
            );
        }
    }

    #[test]
    fn test_poll_marks_stage_live_from_empty() {
        let mut transcript = Transcript::new("run-1");
        transcript.reconcile_poll(msgs(0..2));
        assert_eq!(transcript.stage(), TranscriptStage::Live);
    }

    #[test]
    fn test_historical_claim_requires_terminal_and_empty() {
        let mut transcript = Transcript::new("run-1");
        assert!(!transcript.claim_historical_fetch(RunStatus::Running));
        assert!(transcript.claim_historical_fetch(RunStatus::Completed));
        // Guard holds: never a second claim.
        assert!(!transcript.claim_historical_fetch(RunStatus::Completed));
    }

    #[test]
    fn test_historical_claim_skipped_when_messages_collected_live() {
        let mut transcript = Transcript::new("run-1");
        transcript.append_live(msg(0));
        assert!(!transcript.claim_historical_fetch(RunStatus::Failed));
    }

    #[test]
    fn test_historical_load_populates_once() {
        let mut transcript = Transcript::new("run-1");
        assert!(transcript.claim_historical_fetch(RunStatus::Completed));
        transcript.apply_historical(msgs(0..4));
        assert_eq!(transcript.stage(), TranscriptStage::HistoricalLoaded);
        assert_eq!(transcript.len(), 4);
    }

    #[test]
    fn test_historical_dropped_if_live_raced_in() {
        let mut transcript = Transcript::new("run-1");
        assert!(transcript.claim_historical_fetch(RunStatus::Completed));
        transcript.append_live(msg(9));
        transcript.apply_historical(msgs(0..4));
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.stage(), TranscriptStage::Live);
    }

    #[test]
    fn test_switch_run_resets_everything() {
        let mut transcript = Transcript::new("run-1");
        transcript.append_live(msg(0));
        assert!(!transcript.claim_historical_fetch(RunStatus::Completed));
        transcript.switch_run("run-2");

        assert_eq!(transcript.run_id(), "run-2");
        assert_eq!(transcript.stage(), TranscriptStage::Empty);
        assert!(transcript.is_empty());
        // Guard cleared: the new run may claim again.
        assert!(transcript.claim_historical_fetch(RunStatus::Failed));
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(TranscriptStage::Empty.to_string(), "empty");
        assert_eq!(TranscriptStage::Live.to_string(), "live");
        assert_eq!(TranscriptStage::HistoricalLoaded.to_string(), "historical_loaded");
    }
}
