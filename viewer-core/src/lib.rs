//! Debate Viewer Core
//!
//! This library provides:
//! - Decoding of noisy agent output into typed debate records
//! - Truncation detection and structural repair of cut-off payloads
//! - Transcript reconstruction across push, poll, and historical paths
//!
//! # Features
//!
//! ## Decoding
//! - `decode`: classify a raw message body into one of the seven record
//!   shapes (proposal, questions, answers, revision, dispute questions,
//!   dispute answers, judge decision)
//! - `decode_transcript`: decode a whole ordered message list
//! - `truncation_suspected`: heuristics for provider-cap cut-offs
//!
//! ## Reconstruction
//! - `TranscriptReconstructor`: spawns an async driver that merges live
//!   push events with periodic polls and a one-shot historical load
//! - `feed_push_stream`: bridges a streaming HTTP response into the
//!   driver's live channel
//! - Side-channel events (`case_scored`, `metrics_update`,
//!   `quota_exhausted`) bypass the transcript on a broadcast channel

pub mod backend;
pub mod config;
pub mod decode;
pub mod message;
pub mod push;
pub mod transcript;

// Re-export key decode types
pub use decode::{
    at_provider_cap, decode, decode_message, decode_transcript, decode_with, ends_mid_structure,
    is_decodable, truncation_suspected, unbalanced_brackets,
};

// Re-export key message types
pub use message::{
    Admission, Answer, AnswersMessage, DecodedVariant, DirectedQuestion, DisputeAnswersMessage,
    DisputeQuestion, DisputeQuestionsMessage, JudgeDecision, MessageKind, ParsedMessage, Phase,
    Proposal, QuestionsMessage, RawMessage, Revision, RunStatus, RunSummary, Verdict,
};

// Re-export key transcript types
pub use transcript::{
    ReconstructorHandle, Transcript, TranscriptReconstructor, TranscriptSnapshot, TranscriptStage,
};

// Re-export key backend and push types
pub use backend::{feed_push_stream, BackendError, BackendResult, HttpBackend, RunBackend};
pub use config::{DecodeConfig, ReconstructorConfig, ViewerConfig};
pub use push::{parse_push_line, PushEvent, RunSideEvent};
