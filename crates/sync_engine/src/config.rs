//! Sync engine configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What to do with a fetch result that resolves after the viewport moved away
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StalePolicy {
    /// Apply whatever resolves, even if it no longer overlaps the visible range
    #[default]
    ApplyLatest,
    /// Drop a result that shares no index with the current visible range,
    /// provided the range changed while the fetch was in flight
    DiscardOutOfView,
}

/// Sync engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Policy for results that resolve after the viewport moved away
    pub stale_policy: StalePolicy,
    /// Fail a query that takes longer than this (milliseconds)
    pub fetch_timeout_ms: Option<u64>,
}

impl SyncConfig {
    /// Set the stale result policy.
    pub fn with_stale_policy(mut self, policy: StalePolicy) -> Self {
        self.stale_policy = policy;
        self
    }

    /// Set the fetch timeout.
    pub fn with_fetch_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.fetch_timeout_ms = Some(timeout_ms);
        self
    }

    /// Fetch timeout as a duration.
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }
}
