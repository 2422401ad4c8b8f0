//! Remote collection configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Slice sizing and simulated latency of a remote collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Maximum number of items returned per query
    pub slice_len: usize,
    /// Number of items returned before the anchor
    pub lead: usize,
    /// Simulated query latency in milliseconds
    pub latency_ms: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            slice_len: 20,
            lead: 10,
            latency_ms: 300,
        }
    }
}

impl RemoteConfig {
    /// Set the slice length.
    pub fn with_slice_len(mut self, slice_len: usize) -> Self {
        self.slice_len = slice_len;
        self
    }

    /// Set the number of items before the anchor.
    pub fn with_lead(mut self, lead: usize) -> Self {
        self.lead = lead;
        self
    }

    /// Set the simulated latency.
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Simulated latency as a duration.
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}
