//! Viewer core configuration — decode heuristics and reconstructor
//! timing, loadable from TOML with env-var overrides.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Tuning for the decoder's truncation heuristics.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// Known provider output cap, in characters. Content of exactly this
    /// length is assumed to have been cut off by the provider.
    pub provider_output_cap: usize,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            provider_output_cap: std::env::var("VIEWER_PROVIDER_OUTPUT_CAP")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4096),
        }
    }
}

/// Tuning for the transcript reconstructor.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReconstructorConfig {
    /// Poll-fallback interval in milliseconds.
    pub poll_interval_ms: u64,
    /// Capacity of the bounded live-event channel.
    pub live_channel_capacity: usize,
}

impl Default for ReconstructorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: std::env::var("VIEWER_POLL_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2000),
            live_channel_capacity: 256,
        }
    }
}

impl ReconstructorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Top-level viewer core configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub decode: DecodeConfig,
    pub reconstructor: ReconstructorConfig,
}

impl ViewerConfig {
    /// Load configuration from a TOML file. Missing sections fall back
    /// to defaults.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
    }
}
