//! Remote collection access for windowed list synchronization.
//!
//! This crate defines the single query operation the sync engine needs from
//! a remote ordered collection, and ships reference implementations used by
//! tests and the demo application.
//!
//! # Modules
//!
//! - `collection`: the `RemoteCollection` query trait
//! - `memory`: `MemoryCollection`, an in-memory collection with a mutation API
//! - `simulated`: `SimulatedRemote`, a wrapper adding latency and failure injection
//! - `config`: slice sizing and latency configuration
//! - `error`: error types for remote queries
//!
//! # Example
//!
//! ```
//! use remote_source::{MemoryCollection, RemoteConfig};
//!
//! let collection = MemoryCollection::seeded(&RemoteConfig::default(), 50, |i| format!("Data {i}"));
//! let slice = collection.slice_around(None);
//!
//! assert_eq!(slice.slice_offset, 0);
//! assert_eq!(slice.slice.len(), 20);
//! assert_eq!(slice.total_count, 50);
//! ```

pub mod collection;
pub mod config;
pub mod error;
pub mod memory;
pub mod simulated;

pub use collection::RemoteCollection;
pub use config::RemoteConfig;
pub use error::{RemoteError, RemoteResult};
pub use memory::MemoryCollection;
pub use simulated::{QueryLog, SimulatedRemote};
