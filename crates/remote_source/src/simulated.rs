//! Simulated network behavior around a remote collection.
//!
//! `SimulatedRemote` wraps any `RemoteCollection` and adds what a real
//! backend would show the client: a query latency, an offline switch and
//! scripted failures. It also records every query it receives and tracks how
//! many are outstanding at once, which is what tests use to check the
//! engine's at-most-one-in-flight guarantee.

use crate::collection::RemoteCollection;
use crate::config::RemoteConfig;
use crate::error::{RemoteError, RemoteResult};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use window_model::{FetchResult, ItemId};

/// Record of the queries a `SimulatedRemote` has received
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryLog {
    /// Anchor of every query, in arrival order
    pub anchors: Vec<Option<ItemId>>,
    /// Highest number of queries observed outstanding at the same time
    pub max_in_flight: usize,
}

impl QueryLog {
    /// Number of queries received
    pub fn count(&self) -> usize {
        self.anchors.len()
    }

    /// Anchor of the most recent query
    pub fn last_anchor(&self) -> Option<&Option<ItemId>> {
        self.anchors.last()
    }
}

/// Decrements the in-flight counter when a query finishes or is dropped
struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Wrapper adding latency, an offline switch and failure injection
#[derive(Debug)]
pub struct SimulatedRemote<R> {
    inner: R,
    latency: Duration,
    offline: AtomicBool,
    failures_pending: AtomicU32,
    queries: AtomicU64,
    in_flight: AtomicUsize,
    log: Mutex<QueryLog>,
}

impl<R> SimulatedRemote<R> {
    /// Wrap `inner` using the latency from `config`
    pub fn new(inner: R, config: &RemoteConfig) -> Self {
        Self::with_latency(inner, config.latency())
    }

    /// Wrap `inner` with an explicit latency
    pub fn with_latency(inner: R, latency: Duration) -> Self {
        Self {
            inner,
            latency,
            offline: AtomicBool::new(false),
            failures_pending: AtomicU32::new(0),
            queries: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            log: Mutex::new(QueryLog::default()),
        }
    }

    /// The wrapped collection
    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Simulated latency per query
    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Make the next `count` queries fail
    pub fn fail_next(&self, count: u32) {
        self.failures_pending.store(count, Ordering::SeqCst);
    }

    /// Switch the remote offline or back online
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Whether the remote is offline
    pub fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    /// Number of queries currently outstanding
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Copy of the query log
    pub fn log(&self) -> QueryLog {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Number of queries received
    pub fn query_count(&self) -> u64 {
        self.queries.load(Ordering::SeqCst)
    }

    fn take_failure(&self) -> bool {
        self.failures_pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |pending| {
                pending.checked_sub(1)
            })
            .is_ok()
    }

    fn record(&self, anchor: &Option<ItemId>) -> u64 {
        let query = self.queries.fetch_add(1, Ordering::SeqCst) + 1;
        let outstanding = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;

        let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        log.anchors.push(anchor.clone());
        log.max_in_flight = log.max_in_flight.max(outstanding);
        query
    }
}

impl<R: RemoteCollection> RemoteCollection for SimulatedRemote<R> {
    type Payload = R::Payload;

    async fn query(&self, anchor: Option<ItemId>) -> RemoteResult<FetchResult<R::Payload>> {
        let query = self.record(&anchor);
        let _guard = InFlightGuard(&self.in_flight);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if self.is_offline() {
            tracing::debug!(target: "remote::query", query, "remote offline");
            return Err(RemoteError::Offline);
        }

        if self.take_failure() {
            tracing::debug!(target: "remote::query", query, "injected failure");
            return Err(RemoteError::Injected { query });
        }

        self.inner.query(anchor).await
    }
}
