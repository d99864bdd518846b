//! Transcript reconstruction: merging push, poll, and historical
//! message deliveries into one ordered, append-only list per run.

pub mod state;
pub mod task;

pub use state::{Transcript, TranscriptStage};
pub use task::{ReconstructorHandle, TranscriptReconstructor, TranscriptSnapshot};
