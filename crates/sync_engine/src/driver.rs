//! Observer loop tying a virtualizer to the sync engine.
//!
//! The driver task owns both the engine and the virtualizer. Viewport events
//! arrive over a channel and are processed in order; each one that moves the
//! visible range runs exactly one re-evaluation. The single outstanding fetch
//! runs on its own task and its resolution is fed back into the same loop, so
//! the engine is only ever touched from one place.

use crate::adapter::sync_total_count;
use crate::engine::{FetchOutcome, SyncEngine};
use crate::error::{SyncError, SyncResult};
use crate::status::SyncStatus;
use remote_source::RemoteCollection;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use viewport::ViewportVirtualizer;
use window_model::{FetchResult, VisibleRange, WindowCache, WindowReader};

/// Input to the driver loop
#[derive(Debug)]
pub enum ViewportEvent {
    ScrollTo(f64),
    ScrollBy(f64),
    ScrollToIndex(usize),
    Resize(f64),
    /// Re-evaluate without moving, e.g. after the remote collection changed
    Reevaluate,
    /// Drop the window and abandon any outstanding fetch
    Reset,
    /// Reply once no fetch is outstanding
    Settle(oneshot::Sender<SyncStatus>),
    Shutdown,
}

type PendingFetch<P> = Option<(u64, JoinHandle<SyncResult<FetchResult<P>>>)>;

enum Step<P> {
    Event(Option<ViewportEvent>),
    Resolved(u64, SyncResult<FetchResult<P>>),
}

/// Runs the engine against a virtualizer on a background task
pub struct SyncDriver<R: RemoteCollection, V> {
    engine: SyncEngine<R>,
    virtualizer: V,
    status_tx: watch::Sender<SyncStatus>,
    in_flight: PendingFetch<R::Payload>,
    settle_waiters: Vec<oneshot::Sender<SyncStatus>>,
}

impl<R, V> SyncDriver<R, V>
where
    R: RemoteCollection + 'static,
    V: ViewportVirtualizer + Send + 'static,
{
    pub fn new(engine: SyncEngine<R>, virtualizer: V) -> Self {
        let (status_tx, _rx) = watch::channel(engine.status());
        Self {
            engine,
            virtualizer,
            status_tx,
            in_flight: None,
            settle_waiters: Vec::new(),
        }
    }

    /// Start the loop. The join handle yields the engine back after shutdown.
    pub fn spawn(self) -> (DriverHandle<R::Payload>, JoinHandle<SyncEngine<R>>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let handle = DriverHandle {
            events: events_tx,
            window: self.engine.reader(),
            range: self.virtualizer.subscribe(),
            status: self.status_tx.subscribe(),
        };
        let task = tokio::spawn(self.run(events_rx));
        (handle, task)
    }

    async fn run(mut self, mut events: mpsc::UnboundedReceiver<ViewportEvent>) -> SyncEngine<R> {
        tracing::info!(target: "sync::driver", "sync driver started");

        let range = self.virtualizer.visible_range();
        self.signal(range);
        self.publish();

        loop {
            let step = tokio::select! {
                event = events.recv() => Step::Event(event),
                (seq, result) = wait_for_fetch(&mut self.in_flight) => Step::Resolved(seq, result),
            };

            match step {
                Step::Event(None) | Step::Event(Some(ViewportEvent::Shutdown)) => break,
                Step::Event(Some(event)) => self.handle_event(event),
                Step::Resolved(seq, result) => self.resolve(seq, result),
            }
            self.publish();
        }

        if let Some((seq, task)) = self.in_flight.take() {
            tracing::debug!(target: "sync::driver", seq, "aborting in-flight fetch on shutdown");
            task.abort();
        }
        let status = self.engine.status();
        for waiter in self.settle_waiters.drain(..) {
            let _ = waiter.send(status.clone());
        }

        tracing::info!(target: "sync::driver", "sync driver stopped");
        self.engine
    }

    fn handle_event(&mut self, event: ViewportEvent) {
        let range = match event {
            ViewportEvent::ScrollTo(offset) => self.virtualizer.scroll_to(offset),
            ViewportEvent::ScrollBy(delta) => self.virtualizer.scroll_by(delta),
            ViewportEvent::ScrollToIndex(index) => self.virtualizer.scroll_to_index(index),
            ViewportEvent::Resize(height) => self.virtualizer.resize(height),
            ViewportEvent::Reevaluate => self.virtualizer.visible_range(),
            ViewportEvent::Reset => {
                if let Some((_, task)) = self.in_flight.take() {
                    task.abort();
                }
                self.engine.reset();
                self.virtualizer.visible_range()
            }
            ViewportEvent::Settle(waiter) => {
                self.settle_waiters.push(waiter);
                return;
            }
            ViewportEvent::Shutdown => return,
        };
        self.signal(range);
    }

    fn resolve(&mut self, seq: u64, result: SyncResult<FetchResult<R::Payload>>) {
        match self.engine.complete(seq, result) {
            FetchOutcome::Applied { .. } => {
                let window = self.engine.window();
                sync_total_count(&mut self.virtualizer, &window);
            }
            // Retried on the next trigger, not immediately
            FetchOutcome::Failed(_) => return,
            FetchOutcome::Discarded(_) => {}
        }
        let range = self.virtualizer.visible_range();
        self.signal(range);
    }

    fn signal(&mut self, range: Option<VisibleRange>) {
        if let Some(ticket) = self.engine.on_visible_range_changed(range) {
            let fetch = self.engine.fetch(&ticket);
            self.in_flight = Some((ticket.seq, tokio::spawn(fetch)));
        }
    }

    fn publish(&mut self) {
        let status = self.engine.status();
        self.status_tx.send_if_modified(|current| {
            if *current == status {
                return false;
            }
            *current = status.clone();
            true
        });

        if !self.engine.is_fetching() {
            for waiter in self.settle_waiters.drain(..) {
                let _ = waiter.send(status.clone());
            }
        }
    }
}

/// Resolve the outstanding fetch, or never when there is none
async fn wait_for_fetch<P>(slot: &mut PendingFetch<P>) -> (u64, SyncResult<FetchResult<P>>) {
    let Some((seq, task)) = slot else {
        return std::future::pending().await;
    };
    let seq = *seq;
    let result = match task.await {
        Ok(result) => result,
        Err(err) => Err(SyncError::TaskFailed(err.to_string())),
    };
    *slot = None;
    (seq, result)
}

/// Client side of a running driver
#[derive(Debug, Clone)]
pub struct DriverHandle<P> {
    events: mpsc::UnboundedSender<ViewportEvent>,
    window: WindowReader<P>,
    range: watch::Receiver<Option<VisibleRange>>,
    status: watch::Receiver<SyncStatus>,
}

impl<P> DriverHandle<P> {
    /// Send an event to the driver loop
    pub fn send(&self, event: ViewportEvent) -> SyncResult<()> {
        self.events
            .send(event)
            .map_err(|_| SyncError::TaskFailed("sync driver stopped".to_string()))
    }

    pub fn scroll_to(&self, offset: f64) -> SyncResult<()> {
        self.send(ViewportEvent::ScrollTo(offset))
    }

    pub fn scroll_by(&self, delta: f64) -> SyncResult<()> {
        self.send(ViewportEvent::ScrollBy(delta))
    }

    pub fn scroll_to_index(&self, index: usize) -> SyncResult<()> {
        self.send(ViewportEvent::ScrollToIndex(index))
    }

    pub fn resize(&self, viewport_height: f64) -> SyncResult<()> {
        self.send(ViewportEvent::Resize(viewport_height))
    }

    pub fn reevaluate(&self) -> SyncResult<()> {
        self.send(ViewportEvent::Reevaluate)
    }

    pub fn reset(&self) -> SyncResult<()> {
        self.send(ViewportEvent::Reset)
    }

    pub fn shutdown(&self) -> SyncResult<()> {
        self.send(ViewportEvent::Shutdown)
    }

    /// Wait until every event sent so far is processed and no fetch is outstanding
    pub async fn settle(&self) -> SyncResult<SyncStatus> {
        let (tx, rx) = oneshot::channel();
        self.send(ViewportEvent::Settle(tx))?;
        rx.await
            .map_err(|_| SyncError::TaskFailed("sync driver stopped".to_string()))
    }

    /// Current window snapshot
    pub fn window(&self) -> Arc<WindowCache<P>> {
        self.window.snapshot()
    }

    /// Reader that can await window replacements
    pub fn reader(&self) -> WindowReader<P> {
        self.window.clone()
    }

    /// Current visible range
    pub fn visible_range(&self) -> Option<VisibleRange> {
        *self.range.borrow()
    }

    /// Receiver notified on every visible range change
    pub fn range_receiver(&self) -> watch::Receiver<Option<VisibleRange>> {
        self.range.clone()
    }

    /// Latest published status
    pub fn status(&self) -> SyncStatus {
        self.status.borrow().clone()
    }

    /// Receiver notified on every status change
    pub fn status_receiver(&self) -> watch::Receiver<SyncStatus> {
        self.status.clone()
    }
}
