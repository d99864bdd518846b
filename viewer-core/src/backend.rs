//! Backend seam — the REST contract the reconstructor consumes and the
//! push-stream adapter that feeds the live channel. The backend itself
//! is a black box; only these two calls and the event stream cross it.

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::message::{RawMessage, RunSummary};
use crate::push::{parse_push_line, PushEvent};

/// Error type for backend operations.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },
}

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// The two REST calls the reconstructor depends on.
#[async_trait]
pub trait RunBackend: Send + Sync {
    /// `GET /runs/{id}` — drives the poll/terminal logic.
    async fn fetch_run(&self, run_id: &str) -> BackendResult<RunSummary>;

    /// `GET /runs/{id}/messages` — the authoritative ordered list.
    async fn fetch_messages(&self, run_id: &str) -> BackendResult<Vec<RawMessage>>;
}

/// HTTP implementation of [`RunBackend`].
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    async fn get(&self, path: &str) -> BackendResult<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(BackendError::Status {
                status: response.status().as_u16(),
                url,
            });
        }
        Ok(response)
    }

    /// Open the push stream for a run. The caller hands the response to
    /// [`feed_push_stream`].
    pub async fn open_push_stream(&self, run_id: &str) -> BackendResult<reqwest::Response> {
        self.get(&format!("/runs/{run_id}/events")).await
    }
}

#[async_trait]
impl RunBackend for HttpBackend {
    async fn fetch_run(&self, run_id: &str) -> BackendResult<RunSummary> {
        Ok(self.get(&format!("/runs/{run_id}")).await?.json().await?)
    }

    async fn fetch_messages(&self, run_id: &str) -> BackendResult<Vec<RawMessage>> {
        Ok(self
            .get(&format!("/runs/{run_id}/messages"))
            .await?
            .json()
            .await?)
    }
}

/// Drain a push stream line by line into the bounded live channel.
/// Malformed lines and heartbeats are dropped; a closed channel means
/// the consumer is gone and the feed stops cleanly. Reconnection is the
/// caller's concern.
pub async fn feed_push_stream(
    response: reqwest::Response,
    events: mpsc::Sender<PushEvent>,
) -> BackendResult<()> {
    feed_lines(response.bytes_stream(), events).await
}

/// Chunk boundaries fall anywhere, including inside a multi-byte UTF-8
/// character, so bytes are buffered raw and only complete
/// newline-delimited lines are converted to text.
async fn feed_lines<S, B, E>(stream: S, events: mpsc::Sender<PushEvent>) -> BackendResult<()>
where
    S: futures::Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<BackendError> + std::fmt::Display,
{
    futures::pin_mut!(stream);
    let mut buffer: Vec<u8> = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                warn!(error = %e, "push stream read failed");
                return Err(e.into());
            }
        };
        buffer.extend_from_slice(chunk.as_ref());

        while let Some(newline) = buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = buffer.drain(..=newline).collect();
            if let Some(event) = parse_push_line(&String::from_utf8_lossy(&line)) {
                if events.send(event).await.is_err() {
                    debug!("live channel closed, stopping push feed");
                    return Ok(());
                }
            }
        }
    }

    // Flush a trailing line without a newline.
    if let Some(event) = parse_push_line(&String::from_utf8_lossy(&buffer)) {
        let _ = events.send(event).await;
    }
    Ok(())
}
