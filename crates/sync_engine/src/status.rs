//! Sync status and counters for UI display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Phase of the sync state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SyncPhase {
    /// No fetch in progress
    #[default]
    Idle,
    /// A remote query is outstanding
    Fetching,
}

/// Counters accumulated over the engine's lifetime
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStats {
    /// Queries issued to the remote
    pub fetches_issued: u64,
    /// Results applied to the window
    pub fetches_applied: u64,
    /// Queries that failed, timed out or returned an invalid slice
    pub fetches_failed: u64,
    /// Results dropped because they were superseded or out of view
    pub fetches_discarded: u64,
    /// Time of the last applied result
    pub last_sync_time: Option<DateTime<Utc>>,
}

/// Snapshot of the engine state for display
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
    pub phase: SyncPhase,
    /// Whether the window has been populated at least once
    pub initialized: bool,
    /// Show a loading indicator
    pub is_loading: bool,
    pub window_offset: usize,
    pub window_len: usize,
    pub total_count: usize,
    /// Message of the last failure, cleared by the next applied result
    pub last_error: Option<String>,
    pub stats: SyncStats,
}

impl SyncStatus {
    /// Whether a fetch is outstanding
    pub fn is_fetching(&self) -> bool {
        self.phase == SyncPhase::Fetching
    }
}
