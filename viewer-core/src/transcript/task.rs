//! Async driver for transcript reconstruction.
//!
//! The live channel is a bounded mpsc queue the driver drains on its own
//! schedule; the poll interval runs only while the run is non-terminal;
//! the historical fetch fires at most once. Consumers observe the
//! transcript through watch snapshots and never touch the mutable list.
//! Switching run views means shutting this driver down and spawning a
//! fresh one.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::state::{Transcript, TranscriptStage};
use crate::backend::RunBackend;
use crate::config::ReconstructorConfig;
use crate::message::{RawMessage, RunStatus};
use crate::push::{PushEvent, RunSideEvent};

/// Capacity of the side-event broadcast channel.
const SIDE_CHANNEL_CAPACITY: usize = 64;

/// Read-only view of a transcript at one point in time.
#[derive(Debug, Clone)]
pub struct TranscriptSnapshot {
    pub run_id: String,
    pub status: RunStatus,
    pub stage: TranscriptStage,
    pub messages: Vec<RawMessage>,
}

/// Builds and spawns the reconstruction driver for one run view.
pub struct TranscriptReconstructor {
    run_id: String,
    backend: Arc<dyn RunBackend>,
    config: ReconstructorConfig,
}

impl TranscriptReconstructor {
    pub fn new(
        run_id: impl Into<String>,
        backend: Arc<dyn RunBackend>,
        config: ReconstructorConfig,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            backend,
            config,
        }
    }

    /// Spawn the driver task.
    pub fn spawn(self) -> ReconstructorHandle {
        let (event_tx, event_rx) = mpsc::channel(self.config.live_channel_capacity);
        let (side_tx, _) = broadcast::channel(SIDE_CHANNEL_CAPACITY);
        let (snapshot_tx, snapshot_rx) = watch::channel(TranscriptSnapshot {
            run_id: self.run_id.clone(),
            status: RunStatus::Pending,
            stage: TranscriptStage::Empty,
            messages: Vec::new(),
        });
        let cancel = CancellationToken::new();

        let join = tokio::spawn(run_loop(
            self.run_id,
            self.backend,
            self.config,
            event_rx,
            snapshot_tx,
            side_tx.clone(),
            cancel.clone(),
        ));

        ReconstructorHandle {
            events: event_tx,
            snapshots: snapshot_rx,
            side_events: side_tx,
            cancel,
            join,
        }
    }
}

/// Handle to a running reconstruction driver.
pub struct ReconstructorHandle {
    events: mpsc::Sender<PushEvent>,
    snapshots: watch::Receiver<TranscriptSnapshot>,
    side_events: broadcast::Sender<RunSideEvent>,
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl ReconstructorHandle {
    /// Sender the push-stream feed writes into.
    pub fn live_sender(&self) -> mpsc::Sender<PushEvent> {
        self.events.clone()
    }

    /// Subscribe to transcript snapshots.
    pub fn snapshots(&self) -> watch::Receiver<TranscriptSnapshot> {
        self.snapshots.clone()
    }

    /// Subscribe to non-transcript events (scores, metrics, quota).
    pub fn subscribe_side_events(&self) -> broadcast::Receiver<RunSideEvent> {
        self.side_events.subscribe()
    }

    /// Tear the driver down: cancels the poll interval and closes the
    /// live subscription. No orphaned timers or connections remain.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.join.await;
    }
}

async fn run_loop(
    run_id: String,
    backend: Arc<dyn RunBackend>,
    config: ReconstructorConfig,
    mut events: mpsc::Receiver<PushEvent>,
    snapshots: watch::Sender<TranscriptSnapshot>,
    side_events: broadcast::Sender<RunSideEvent>,
    cancel: CancellationToken,
) {
    let mut transcript = Transcript::new(&run_id);
    let mut status = match backend.fetch_run(&run_id).await {
        Ok(run) => run.status,
        Err(e) => {
            warn!(run_id = %run_id, error = %e, "initial run fetch failed, assuming pending");
            RunStatus::Pending
        }
    };
    publish(&snapshots, &transcript, status);

    let mut poll = tokio::time::interval(config.poll_interval());
    poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

    while !status.is_terminal() {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!(run_id = %run_id, "reconstructor cancelled");
                return;
            }
            event = events.recv() => match event {
                Some(PushEvent::AgentMessage(payload)) => {
                    transcript.append_live(payload.into_raw_message());
                    publish(&snapshots, &transcript, status);
                }
                Some(other) => {
                    if let Some(side_event) = RunSideEvent::from_push(other) {
                        // No subscribers is fine.
                        let _ = side_events.send(side_event);
                    }
                }
                None => {
                    debug!(run_id = %run_id, "live channel closed");
                    break;
                }
            },
            _ = poll.tick() => {
                match backend.fetch_run(&run_id).await {
                    Ok(run) if run.status != status => {
                        status = run.status;
                        publish(&snapshots, &transcript, status);
                    }
                    Ok(_) => {}
                    Err(e) => warn!(run_id = %run_id, error = %e, "run status poll failed"),
                }
                if status.is_terminal() {
                    continue;
                }
                match backend.fetch_messages(&run_id).await {
                    Ok(messages) => {
                        if transcript.reconcile_poll(messages) > 0 {
                            publish(&snapshots, &transcript, status);
                        }
                    }
                    // Next scheduled poll simply retries; nothing
                    // already ingested is lost.
                    Err(e) => warn!(run_id = %run_id, error = %e, "message poll failed"),
                }
            }
        }
    }

    if transcript.claim_historical_fetch(status) {
        match backend.fetch_messages(&run_id).await {
            Ok(messages) => transcript.apply_historical(messages),
            Err(e) => warn!(run_id = %run_id, error = %e, "historical fetch failed"),
        }
    }
    publish(&snapshots, &transcript, status);
    debug!(run_id = %run_id, status = %status, messages = transcript.len(), "reconstructor finished");
}

fn publish(
    snapshots: &watch::Sender<TranscriptSnapshot>,
    transcript: &Transcript,
    status: RunStatus,
) {
    snapshots.send_replace(TranscriptSnapshot {
        run_id: transcript.run_id().to_string(),
        status,
        stage: transcript.stage(),
        messages: transcript.messages().to_vec(),
    });
}
