//! The remote collection query interface.

use crate::error::RemoteResult;
use std::sync::Arc;
use window_model::{FetchResult, ItemId};

/// An ordered, mutable remote sequence of items, seen through one query.
///
/// Implementations own their store privately. The contract:
///
/// - without an anchor, return a slice at an implementation-defined default
///   position (the reference implementations use the collection head);
/// - with an anchor, return a bounded slice centered as closely as possible
///   on that item, clamped to the collection bounds;
/// - an anchor that no longer exists degrades to the nearest valid slice
///   instead of failing;
/// - always report the total size of the collection at query time.
#[trait_variant::make(Send)]
pub trait RemoteCollection: Send + Sync {
    /// Row data carried by each item.
    type Payload: Clone + Send + Sync + 'static;

    /// Fetch a slice of the collection around `anchor`.
    async fn query(&self, anchor: Option<ItemId>) -> RemoteResult<FetchResult<Self::Payload>>;
}

impl<R: RemoteCollection> RemoteCollection for Arc<R> {
    type Payload = R::Payload;

    async fn query(&self, anchor: Option<ItemId>) -> RemoteResult<FetchResult<Self::Payload>> {
        (**self).query(anchor).await
    }
}
