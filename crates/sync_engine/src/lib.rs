//! Windowed synchronization of a very long remote list.
//!
//! The engine keeps a bounded, contiguous window of a remote ordered
//! collection cached locally and re-centers it around the visible range as
//! the user scrolls, so that only the window is ever held in memory.
//!
//! # Modules
//!
//! - `decision`: the pure re-evaluation deciding whether and where to fetch
//! - `engine`: the Idle/Fetching state machine issuing and applying fetches
//! - `driver`: the observer loop tying a virtualizer to the engine
//! - `adapter`: maps visible indices onto cached items or placeholders
//! - `diagnostics`: read-only export of the rendered, cached and remote views
//! - `status`: phase, loading indicator and counters for display
//! - `config`: stale-result policy and fetch timeout
//! - `error`: error types for the sync engine
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use remote_source::{MemoryCollection, RemoteConfig};
//! use sync_engine::{SyncConfig, SyncEngine};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let remote = MemoryCollection::seeded(&RemoteConfig::default(), 50, |i| format!("Data {i}"));
//! let mut engine = SyncEngine::new(Arc::new(remote), SyncConfig::default());
//!
//! // The first evaluation fetches the head of the collection
//! let outcome = engine.sync_once().await.unwrap();
//! assert!(outcome.is_applied());
//! assert_eq!(engine.window().coverage(), 0..20);
//! # });
//! ```

pub mod adapter;
pub mod config;
pub mod decision;
pub mod diagnostics;
pub mod driver;
pub mod engine;
pub mod error;
pub mod status;

pub use adapter::{render_view, rows, sync_total_count, RenderView, RowSlot};
pub use config::{StalePolicy, SyncConfig};
pub use decision::{evaluate, FetchPlan, IdleReason, SyncDecision, SyncTrigger};
pub use diagnostics::{export, DiagnosticsSnapshot};
pub use driver::{DriverHandle, SyncDriver, ViewportEvent};
pub use engine::{DiscardReason, FetchOutcome, FetchTicket, SyncEngine};
pub use error::{SyncError, SyncResult};
pub use status::{SyncPhase, SyncStats, SyncStatus};
