//! Single-writer, many-reader publication of the cached window
//!
//! The writer swaps in a complete immutable `WindowCache` snapshot on every
//! replacement, so a reader can never observe new items paired with a stale
//! offset or total. Readers hold cheap `Arc` snapshots and can await changes.

use crate::{FetchResult, ItemId, WindowCache, WindowResult};
use std::sync::Arc;
use tokio::sync::watch;

/// Writer side of the published window. Owned by the sync engine.
#[derive(Debug)]
pub struct SharedWindow<P> {
    tx: watch::Sender<Arc<WindowCache<P>>>,
}

impl<P> Default for SharedWindow<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> SharedWindow<P> {
    /// Publish a fresh, uninitialized window
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Arc::new(WindowCache::new()));
        Self { tx }
    }

    /// Current window snapshot
    pub fn snapshot(&self) -> Arc<WindowCache<P>> {
        Arc::clone(&self.tx.borrow())
    }

    /// Create a reader that observes future replacements
    pub fn reader(&self) -> WindowReader<P> {
        WindowReader {
            rx: self.tx.subscribe(),
        }
    }

    /// Validate `result` and publish it as the new window.
    ///
    /// On error nothing is published and readers keep the previous snapshot.
    pub fn replace(
        &self,
        result: FetchResult<P>,
        anchor: Option<ItemId>,
    ) -> WindowResult<Arc<WindowCache<P>>> {
        let next = Arc::new(self.snapshot().replaced(result, anchor)?);
        self.tx.send_replace(Arc::clone(&next));
        Ok(next)
    }

    /// Publish an uninitialized window again
    pub fn clear(&self) {
        self.tx.send_replace(Arc::new(WindowCache::new()));
    }
}

/// Read-only handle on the published window
#[derive(Debug)]
pub struct WindowReader<P> {
    rx: watch::Receiver<Arc<WindowCache<P>>>,
}

impl<P> Clone for WindowReader<P> {
    fn clone(&self) -> Self {
        Self {
            rx: self.rx.clone(),
        }
    }
}

impl<P> WindowReader<P> {
    /// Current window snapshot
    pub fn snapshot(&self) -> Arc<WindowCache<P>> {
        Arc::clone(&self.rx.borrow())
    }

    /// Wait until the writer publishes a new window.
    ///
    /// Returns `false` once the writer has been dropped.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Snapshot and mark it as seen, so `changed` waits for the next replacement
    pub fn snapshot_and_update(&mut self) -> Arc<WindowCache<P>> {
        Arc::clone(&self.rx.borrow_and_update())
    }
}
