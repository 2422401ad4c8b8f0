//! In-memory remote collection.
//!
//! `MemoryCollection` owns an ordered `Vec` of items behind a `RwLock` and
//! answers queries with a fixed-size slice around the anchor. It also exposes
//! the mutation operations a test harness or simulated backend uses to change
//! the collection between fetches (prepending new items shifts every index).
//!
//! # Slice policy
//!
//! For an anchor at index `a`, the slice starts at `a - lead` (saturating at
//! zero) and holds up to `slice_len` items. Near the tail the start is pulled
//! back so the slice stays full-length when the collection allows it. A
//! missing or unknown anchor yields the head of the collection.

use crate::collection::RemoteCollection;
use crate::config::RemoteConfig;
use crate::error::{RemoteError, RemoteResult};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use window_model::{FetchResult, Item, ItemId};

/// In-memory implementation of `RemoteCollection`
///
/// Thread-safe; share it with `Arc` between the sync engine and whatever
/// mutates the collection.
#[derive(Debug)]
pub struct MemoryCollection<P> {
    items: RwLock<Vec<Item<P>>>,
    slice_len: usize,
    lead: usize,
}

impl<P: Clone> MemoryCollection<P> {
    /// Create an empty collection
    pub fn new(config: &RemoteConfig) -> Self {
        Self::with_items(config, Vec::new())
    }

    /// Create a collection holding `items`
    pub fn with_items(config: &RemoteConfig, items: Vec<Item<P>>) -> Self {
        Self {
            items: RwLock::new(items),
            slice_len: config.slice_len.max(1),
            lead: config.lead,
        }
    }

    /// Create a collection of `count` items with generated ids
    pub fn seeded(config: &RemoteConfig, count: usize, payload: impl Fn(usize) -> P) -> Self {
        let items = (0..count)
            .map(|i| Item::with_generated_id(payload(i)))
            .collect();
        Self::with_items(config, items)
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Item<P>>> {
        self.items.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Item<P>>> {
        self.items.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of items in the collection
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the collection is empty
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Copy of the full collection, in order
    pub fn snapshot(&self) -> Vec<Item<P>> {
        self.read().clone()
    }

    /// Absolute index of the item with the given id
    pub fn position_of(&self, id: &ItemId) -> Option<usize> {
        self.read().iter().position(|item| &item.id == id)
    }

    /// Id of the item at an absolute index
    pub fn id_at(&self, index: usize) -> Option<ItemId> {
        self.read().get(index).map(|item| item.id.clone())
    }

    /// Insert a new item at the head of the collection, shifting every index by one
    pub fn prepend(&self, payload: P) -> ItemId {
        let item = Item::with_generated_id(payload);
        let id = item.id.clone();
        self.write().insert(0, item);
        tracing::debug!(target: "remote::mutation", id = %id, "item prepended");
        id
    }

    /// Append a new item at the tail of the collection
    pub fn append(&self, payload: P) -> ItemId {
        let item = Item::with_generated_id(payload);
        let id = item.id.clone();
        self.write().push(item);
        tracing::debug!(target: "remote::mutation", id = %id, "item appended");
        id
    }

    /// Insert an item at an absolute index.
    ///
    /// Ids stay unique: an item whose id is already present is rejected.
    pub fn insert_at(&self, index: usize, item: Item<P>) -> RemoteResult<()> {
        let mut items = self.write();
        if index > items.len() {
            return Err(RemoteError::IndexOutOfBounds {
                index,
                len: items.len(),
            });
        }
        if items.iter().any(|existing| existing.id == item.id) {
            return Err(RemoteError::DuplicateId(item.id));
        }
        tracing::debug!(target: "remote::mutation", id = %item.id, index, "item inserted");
        items.insert(index, item);
        Ok(())
    }

    /// Remove the item with the given id
    pub fn remove(&self, id: &ItemId) -> Option<Item<P>> {
        let mut items = self.write();
        let index = items.iter().position(|item| &item.id == id)?;
        tracing::debug!(target: "remote::mutation", id = %id, index, "item removed");
        Some(items.remove(index))
    }

    /// Replace the payload of an existing item, keeping its identity
    pub fn update(&self, id: &ItemId, payload: P) -> bool {
        match self.write().iter_mut().find(|item| &item.id == id) {
            Some(item) => {
                item.payload = payload;
                true
            }
            None => false,
        }
    }

    /// Compute the slice a query anchored at `anchor` returns
    pub fn slice_around(&self, anchor: Option<&ItemId>) -> FetchResult<P> {
        let items = self.read();
        let total = items.len();

        let anchor_index = match anchor {
            Some(id) => {
                let found = items.iter().position(|item| &item.id == id);
                if found.is_none() {
                    tracing::debug!(
                        target: "remote::query",
                        anchor = %id,
                        "anchor no longer exists, falling back to collection head"
                    );
                }
                found
            }
            None => None,
        };

        let start = match anchor_index {
            Some(index) => index
                .saturating_sub(self.lead)
                .min(total.saturating_sub(self.slice_len)),
            None => 0,
        };
        let end = (start + self.slice_len).min(total);

        FetchResult::new(items[start..end].to_vec(), start, total)
    }
}

impl<P: Clone + Send + Sync + 'static> RemoteCollection for MemoryCollection<P> {
    type Payload = P;

    async fn query(&self, anchor: Option<ItemId>) -> RemoteResult<FetchResult<P>> {
        let result = self.slice_around(anchor.as_ref());
        tracing::trace!(
            target: "remote::query",
            anchor = ?anchor,
            offset = result.slice_offset,
            len = result.slice.len(),
            total = result.total_count,
            "slice served"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn make_collection(count: usize) -> MemoryCollection<String> {
        MemoryCollection::seeded(&RemoteConfig::default(), count, |i| format!("Data {i}"))
    }

    #[test]
    fn test_head_slice_without_anchor() {
        let collection = make_collection(50);
        let result = collection.slice_around(None);

        assert_eq!(result.slice_offset, 0);
        assert_eq!(result.slice.len(), 20);
        assert_eq!(result.total_count, 50);
        assert_eq!(result.slice[0].payload, "Data 0");
    }

    #[test]
    fn test_slice_is_centered_on_anchor() {
        let collection = make_collection(100);
        let anchor = collection.id_at(59).unwrap();
        let result = collection.slice_around(Some(&anchor));

        assert_eq!(result.coverage(), 49..69);
        assert_eq!(result.slice[10].id, anchor);
    }

    #[test]
    fn test_slice_clamped_at_head() {
        let collection = make_collection(100);
        let anchor = collection.id_at(3).unwrap();
        let result = collection.slice_around(Some(&anchor));

        assert_eq!(result.coverage(), 0..20);
    }

    #[test]
    fn test_slice_clamped_at_tail() {
        let collection = make_collection(50);
        let anchor = collection.id_at(48).unwrap();
        let result = collection.slice_around(Some(&anchor));

        assert_eq!(result.coverage(), 30..50);
        assert!(result.validate().is_ok());
    }

    #[test]
    fn test_collection_smaller_than_slice() {
        let collection = make_collection(7);
        let anchor = collection.id_at(6).unwrap();
        let result = collection.slice_around(Some(&anchor));

        assert_eq!(result.coverage(), 0..7);
        assert_eq!(result.total_count, 7);
    }

    #[test]
    fn test_stale_anchor_degrades_to_head() {
        let collection = make_collection(50);
        let anchor = collection.id_at(30).unwrap();
        assert!(collection.remove(&anchor).is_some());

        let result = collection.slice_around(Some(&anchor));
        assert_eq!(result.slice_offset, 0);
        assert_eq!(result.total_count, 49);
    }

    #[test]
    fn test_empty_collection() {
        let collection: MemoryCollection<String> = MemoryCollection::new(&RemoteConfig::default());
        let result = collection.slice_around(None);

        assert!(result.slice.is_empty());
        assert_eq!(result.slice_offset, 0);
        assert_eq!(result.total_count, 0);
    }

    #[test]
    fn test_prepend_shifts_indices() {
        let collection = make_collection(10);
        let first = collection.id_at(0).unwrap();

        let new_id = collection.prepend("Data 10".to_string());

        assert_eq!(collection.len(), 11);
        assert_eq!(collection.position_of(&new_id), Some(0));
        assert_eq!(collection.position_of(&first), Some(1));
    }

    #[test]
    fn test_insert_at_bounds() {
        let collection = make_collection(3);
        assert!(collection.insert_at(3, Item::new("tail", "x".to_string())).is_ok());
        assert_eq!(
            collection.insert_at(9, Item::new("far", "y".to_string())),
            Err(RemoteError::IndexOutOfBounds { index: 9, len: 4 })
        );
    }

    #[test]
    fn test_insert_at_rejects_existing_id() {
        let collection = make_collection(5);
        let taken = collection.id_at(3).unwrap();

        assert_eq!(
            collection.insert_at(0, Item::new(taken.clone(), "copy".to_string())),
            Err(RemoteError::DuplicateId(taken))
        );
        assert_eq!(collection.len(), 5);
        assert!(collection.slice_around(None).validate().is_ok());
    }

    #[test]
    fn test_update_keeps_identity() {
        let collection = make_collection(3);
        let id = collection.id_at(1).unwrap();

        assert!(collection.update(&id, "changed".to_string()));
        assert_eq!(collection.position_of(&id), Some(1));
        assert_eq!(collection.snapshot()[1].payload, "changed");
        assert!(!collection.update(&ItemId::new("missing"), "x".to_string()));
    }

    #[tokio::test]
    async fn test_query_returns_slice() {
        let collection = make_collection(50);
        let anchor = collection.id_at(25).unwrap();

        let result = collection.query(Some(anchor)).await.unwrap();
        assert_eq!(result.coverage(), 15..35);
    }

    proptest! {
        #[test]
        fn prop_slice_is_valid_and_holds_anchor(
            total in 0usize..120,
            slice_len in 1usize..30,
            lead_seed in 0usize..30,
            pick in any::<prop::sample::Index>(),
        ) {
            let lead = lead_seed % slice_len;
            let config = RemoteConfig::default().with_slice_len(slice_len).with_lead(lead);
            let collection = MemoryCollection::seeded(&config, total, |i| i);
            let anchor = (total > 0).then(|| collection.id_at(pick.index(total)).unwrap());

            let result = collection.slice_around(anchor.as_ref());

            prop_assert!(result.validate().is_ok());
            prop_assert_eq!(result.total_count, total);
            prop_assert_eq!(result.slice.len(), slice_len.min(total));
            if let Some(anchor) = &anchor {
                prop_assert!(result.slice.iter().any(|item| &item.id == anchor));
            }
        }
    }
}
