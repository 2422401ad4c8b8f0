//! The sync engine state machine.
//!
//! The engine owns the published window (it is its only writer), remembers
//! the latest visible range and tracks at most one outstanding fetch. It is
//! split into a synchronous half and an asynchronous half so the caller
//! controls where the single suspension point happens:
//!
//! - `on_visible_range_changed` / `reevaluate` run the pure decision and,
//!   when a fetch is needed, move Idle → Fetching and hand back a
//!   `FetchTicket`;
//! - `fetch` turns a ticket into a `Send + 'static` future querying the remote;
//! - `complete` applies (or rejects) the resolved result and moves back to Idle.
//!
//! Triggers arriving while Fetching are dropped, not queued. Every ticket
//! carries a monotonically increasing sequence number; a result whose number
//! is not the outstanding one is discarded.

use crate::config::{StalePolicy, SyncConfig};
use crate::decision::{evaluate, SyncDecision, SyncTrigger};
use crate::error::{SyncError, SyncResult};
use crate::status::{SyncPhase, SyncStats, SyncStatus};
use remote_source::RemoteCollection;
use std::future::Future;
use std::sync::Arc;
use window_model::{FetchResult, ItemId, SharedWindow, VisibleRange, WindowCache, WindowReader};

/// An issued fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    /// Monotonic sequence number
    pub seq: u64,
    pub trigger: SyncTrigger,
    pub anchor: Option<ItemId>,
    /// Visible range at the time the fetch was decided
    pub range: Option<VisibleRange>,
}

/// Why a resolved result was not applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// The result's sequence number is not the outstanding one
    Superseded,
    /// The viewport moved away while the fetch was in flight
    OutOfView,
}

/// What happened to a resolved fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied {
        offset: usize,
        len: usize,
        total_count: usize,
    },
    Failed(SyncError),
    Discarded(DiscardReason),
}

impl FetchOutcome {
    /// Whether the window was replaced
    pub fn is_applied(&self) -> bool {
        matches!(self, FetchOutcome::Applied { .. })
    }
}

/// Keeps the cached window synchronized with the visible range
pub struct SyncEngine<R: RemoteCollection> {
    remote: Arc<R>,
    window: SharedWindow<R::Payload>,
    config: SyncConfig,
    visible_range: Option<VisibleRange>,
    in_flight: Option<FetchTicket>,
    next_seq: u64,
    stats: SyncStats,
    last_error: Option<String>,
}

impl<R: RemoteCollection + 'static> SyncEngine<R> {
    /// Create an engine with an uninitialized window
    pub fn new(remote: Arc<R>, config: SyncConfig) -> Self {
        Self {
            remote,
            window: SharedWindow::new(),
            config,
            visible_range: None,
            in_flight: None,
            next_seq: 1,
            stats: SyncStats::default(),
            last_error: None,
        }
    }

    /// The remote collection
    pub fn remote(&self) -> &Arc<R> {
        &self.remote
    }

    /// Get the configuration
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Current window snapshot
    pub fn window(&self) -> Arc<WindowCache<R::Payload>> {
        self.window.snapshot()
    }

    /// Read-only handle on the window for renderers
    pub fn reader(&self) -> WindowReader<R::Payload> {
        self.window.reader()
    }

    /// Latest visible range reported to the engine
    pub fn visible_range(&self) -> Option<VisibleRange> {
        self.visible_range
    }

    /// Record the visible range without re-evaluating
    pub fn set_visible_range(&mut self, range: Option<VisibleRange>) {
        self.visible_range = range;
    }

    /// Current phase of the state machine
    pub fn phase(&self) -> SyncPhase {
        if self.in_flight.is_some() {
            SyncPhase::Fetching
        } else {
            SyncPhase::Idle
        }
    }

    /// Whether a fetch is outstanding
    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// The outstanding fetch, if any
    pub fn in_flight(&self) -> Option<&FetchTicket> {
        self.in_flight.as_ref()
    }

    /// Lifetime counters
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// Decide what the current range and window require, without acting on it
    pub fn evaluate(&self) -> SyncDecision {
        evaluate(self.visible_range, &self.window.snapshot(), self.is_fetching())
    }

    /// Handle a "visible range changed" signal
    pub fn on_visible_range_changed(&mut self, range: Option<VisibleRange>) -> Option<FetchTicket> {
        self.visible_range = range;
        self.reevaluate()
    }

    /// Re-evaluate coverage and issue a fetch if one is needed
    pub fn reevaluate(&mut self) -> Option<FetchTicket> {
        let plan = match self.evaluate() {
            SyncDecision::Fetch(plan) => plan,
            SyncDecision::Idle(reason) => {
                tracing::trace!(target: "sync::decision", ?reason, range = ?self.visible_range, "no fetch");
                return None;
            }
        };

        let message = match plan.trigger {
            SyncTrigger::Uninitialized => "fetching initial items",
            SyncTrigger::UpperBound => "upper bound reached",
            SyncTrigger::LowerBound => "lower bound reached",
            SyncTrigger::OutOfWindow => "visible range outside window",
        };
        tracing::debug!(
            target: "sync::decision",
            anchor = ?plan.anchor,
            local_position = ?plan.local_position,
            range = ?self.visible_range,
            "{}",
            message
        );

        let ticket = FetchTicket {
            seq: self.next_seq,
            trigger: plan.trigger,
            anchor: plan.anchor,
            range: self.visible_range,
        };
        self.next_seq += 1;
        self.stats.fetches_issued += 1;
        self.in_flight = Some(ticket.clone());
        Some(ticket)
    }

    /// Build the query future for an issued ticket
    pub fn fetch(
        &self,
        ticket: &FetchTicket,
    ) -> impl Future<Output = SyncResult<FetchResult<R::Payload>>> + Send + 'static {
        let remote = Arc::clone(&self.remote);
        let anchor = ticket.anchor.clone();
        let timeout = self.config.fetch_timeout();

        async move {
            match timeout {
                Some(limit) => tokio::time::timeout(limit, remote.query(anchor))
                    .await
                    .map_err(|_| SyncError::Timeout(limit))?
                    .map_err(SyncError::from),
                None => remote.query(anchor).await.map_err(SyncError::from),
            }
        }
    }

    /// Apply the resolution of fetch `seq` and return to Idle
    pub fn complete(
        &mut self,
        seq: u64,
        result: SyncResult<FetchResult<R::Payload>>,
    ) -> FetchOutcome {
        let ticket = match self.in_flight.take() {
            Some(ticket) if ticket.seq == seq => ticket,
            outstanding => {
                self.in_flight = outstanding;
                self.stats.fetches_discarded += 1;
                tracing::debug!(target: "sync::fetch", seq, "discarding superseded result");
                return FetchOutcome::Discarded(DiscardReason::Superseded);
            }
        };

        let result = match result {
            Ok(result) => result,
            Err(err) => return self.fail(&ticket, err),
        };

        if self.config.stale_policy == StalePolicy::DiscardOutOfView {
            if let Some(range) = self.visible_range {
                let moved = ticket.range != Some(range);
                if moved && range.intersect(result.coverage()).is_none() {
                    self.stats.fetches_discarded += 1;
                    tracing::debug!(
                        target: "sync::fetch",
                        seq,
                        %range,
                        coverage = ?result.coverage(),
                        "discarding result outside the visible range"
                    );
                    return FetchOutcome::Discarded(DiscardReason::OutOfView);
                }
            }
        }

        match self.window.replace(result, ticket.anchor.clone()) {
            Ok(window) => {
                self.stats.fetches_applied += 1;
                self.stats.last_sync_time = Some(chrono::Utc::now());
                self.last_error = None;
                tracing::debug!(
                    target: "sync::fetch",
                    seq,
                    anchor = ?ticket.anchor,
                    offset = window.offset(),
                    len = window.len(),
                    total = window.total_count(),
                    "fetched slice applied"
                );
                FetchOutcome::Applied {
                    offset: window.offset(),
                    len: window.len(),
                    total_count: window.total_count(),
                }
            }
            Err(err) => self.fail(&ticket, err.into()),
        }
    }

    fn fail(&mut self, ticket: &FetchTicket, err: SyncError) -> FetchOutcome {
        self.stats.fetches_failed += 1;
        self.last_error = Some(err.to_string());
        tracing::warn!(
            target: "sync::fetch",
            seq = ticket.seq,
            anchor = ?ticket.anchor,
            "Fetch failed, keeping current window: {}",
            err
        );
        FetchOutcome::Failed(err)
    }

    /// Re-evaluate and, if needed, run one fetch to completion
    pub async fn sync_once(&mut self) -> Option<FetchOutcome> {
        let ticket = self.reevaluate()?;
        let result = self.fetch(&ticket).await;
        Some(self.complete(ticket.seq, result))
    }

    /// Drop the window and abandon any outstanding fetch.
    ///
    /// The abandoned fetch's result is discarded when it resolves.
    pub fn reset(&mut self) {
        if let Some(ticket) = self.in_flight.take() {
            tracing::debug!(target: "sync::fetch", seq = ticket.seq, "abandoning in-flight fetch");
        }
        self.window.clear();
        self.last_error = None;
    }

    /// Snapshot of the engine state for display
    pub fn status(&self) -> SyncStatus {
        let window = self.window.snapshot();
        SyncStatus {
            phase: self.phase(),
            initialized: window.is_initialized(),
            is_loading: self.is_fetching() || !window.is_initialized(),
            window_offset: window.offset(),
            window_len: window.len(),
            total_count: window.total_count(),
            last_error: self.last_error.clone(),
            stats: self.stats.clone(),
        }
    }
}
