//! The cached window over the remote collection
//!
//! A `WindowCache` holds the most recently fetched contiguous slice of the
//! remote collection, the absolute offset of that slice's first element and
//! the collection's total size at fetch time. It is only ever replaced
//! wholesale from a `FetchResult`; there is no incremental merge.

use crate::{Item, ItemId, VisibleRange, WindowError, WindowResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::Range;

/// Result of a remote query: a contiguous slice plus where it sits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResult<P> {
    /// Items in remote order
    pub slice: Vec<Item<P>>,
    /// Absolute index of `slice[0]` in the remote collection
    pub slice_offset: usize,
    /// Total size of the remote collection at query time
    pub total_count: usize,
}

impl<P> FetchResult<P> {
    /// Create a new fetch result
    pub fn new(slice: Vec<Item<P>>, slice_offset: usize, total_count: usize) -> Self {
        Self {
            slice,
            slice_offset,
            total_count,
        }
    }

    /// Result describing an empty collection
    pub fn empty() -> Self {
        Self::new(Vec::new(), 0, 0)
    }

    /// Absolute indices covered by the slice
    pub fn coverage(&self) -> Range<usize> {
        self.slice_offset..self.slice_offset + self.slice.len()
    }

    /// Check the window invariants this result would establish
    pub fn validate(&self) -> WindowResult<()> {
        if self.slice_offset + self.slice.len() > self.total_count {
            return Err(WindowError::ExceedsTotal {
                offset: self.slice_offset,
                len: self.slice.len(),
                total: self.total_count,
            });
        }

        let mut seen = HashSet::with_capacity(self.slice.len());
        for item in &self.slice {
            if !seen.insert(&item.id) {
                return Err(WindowError::DuplicateId(item.id.clone()));
            }
        }

        Ok(())
    }
}

/// Locally cached slice of the remote collection.
///
/// `items[i]` represents the remote element at absolute index `offset + i`.
/// Before the first successful fetch the window is empty with
/// `offset == total_count == 0` and `generation == 0`; that is the only
/// uninitialized state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowCache<P> {
    items: Vec<Item<P>>,
    offset: usize,
    total_count: usize,
    /// Anchor the current contents were fetched around (None for anchor-less fetches)
    anchor: Option<ItemId>,
    /// Number of replacements applied so far
    generation: u64,
}

impl<P> Default for WindowCache<P> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            offset: 0,
            total_count: 0,
            anchor: None,
            generation: 0,
        }
    }
}

impl<P> WindowCache<P> {
    /// Create an empty, uninitialized window
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole window with a fetch result.
    ///
    /// The result is validated first; on error the window is left untouched.
    pub fn replace(&mut self, result: FetchResult<P>) -> WindowResult<()> {
        self.replace_anchored(result, None)
    }

    /// Replace the window, recording the anchor the result was fetched around
    pub fn replace_anchored(
        &mut self,
        result: FetchResult<P>,
        anchor: Option<ItemId>,
    ) -> WindowResult<()> {
        result.validate()?;

        self.items = result.slice;
        self.offset = result.slice_offset;
        self.total_count = result.total_count;
        self.anchor = anchor;
        self.generation += 1;
        Ok(())
    }

    /// Build the successor window without touching `self`
    pub fn replaced(&self, result: FetchResult<P>, anchor: Option<ItemId>) -> WindowResult<Self> {
        result.validate()?;

        Ok(Self {
            items: result.slice,
            offset: result.slice_offset,
            total_count: result.total_count,
            anchor,
            generation: self.generation + 1,
        })
    }

    /// Item at an absolute index, or `None` when the window does not hold it
    pub fn item_at(&self, absolute_index: usize) -> Option<&Item<P>> {
        self.local_index(absolute_index).map(|local| &self.items[local])
    }

    /// Position within `items` of an absolute index
    pub fn local_index(&self, absolute_index: usize) -> Option<usize> {
        let local = absolute_index.checked_sub(self.offset)?;
        (local < self.items.len()).then_some(local)
    }

    /// Position within `items` of the held index closest to `absolute_index`.
    ///
    /// Returns `None` only when the window is empty.
    pub fn nearest_local(&self, absolute_index: usize) -> Option<usize> {
        let last = self.items.len().checked_sub(1)?;
        Some(absolute_index.saturating_sub(self.offset).min(last))
    }

    /// Position within `items` of the item with the given id
    pub fn position_of(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    /// Local position of the last index in `range` that the window holds.
    ///
    /// Returns `None` when the range shares no index with the window.
    pub fn last_resolved(&self, range: VisibleRange) -> Option<usize> {
        range
            .intersect(self.coverage())
            .map(|covered| covered.end() - self.offset)
    }

    /// Absolute indices held by the window
    pub fn coverage(&self) -> Range<usize> {
        self.offset..self.window_end()
    }

    /// Check whether every index of `range` is held by the window
    pub fn covers(&self, range: VisibleRange) -> bool {
        range.start() >= self.offset && range.end() < self.window_end()
    }

    /// One past the last absolute index held by the window
    pub fn window_end(&self) -> usize {
        self.offset + self.items.len()
    }

    /// Whether the window has ever been populated by a successful fetch
    pub fn is_initialized(&self) -> bool {
        self.generation > 0
    }

    /// Whether the window holds no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items held
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Held items in remote order
    pub fn items(&self) -> &[Item<P>] {
        &self.items
    }

    /// Absolute index of `items[0]`
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Total size of the remote collection as of the last fetch
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// Anchor the current contents were fetched around
    pub fn anchor(&self) -> Option<&ItemId> {
        self.anchor.as_ref()
    }

    /// Number of replacements applied so far
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
