//! Viewport adapter: maps visible indices onto the cached window.

use serde::Serialize;
use viewport::ViewportVirtualizer;
use window_model::{Item, VisibleRange, WindowCache};

/// One rendered row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowSlot<'a, P> {
    /// The window holds the item at this index
    Loaded { index: usize, item: &'a Item<P> },
    /// The index is visible but not cached yet
    Placeholder { index: usize },
}

impl<'a, P> RowSlot<'a, P> {
    /// Absolute index of the row
    pub fn index(&self) -> usize {
        match self {
            RowSlot::Loaded { index, .. } | RowSlot::Placeholder { index } => *index,
        }
    }

    /// The cached item, if loaded
    pub fn item(&self) -> Option<&'a Item<P>> {
        match self {
            RowSlot::Loaded { item, .. } => Some(item),
            RowSlot::Placeholder { .. } => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, RowSlot::Placeholder { .. })
    }
}

/// What the list should display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "rows", rename_all = "snake_case")]
pub enum RenderView<'a, P> {
    /// Nothing fetched yet
    Loading,
    /// The remote collection is empty
    Empty,
    Rows(Vec<RowSlot<'a, P>>),
}

/// Resolve every index of `range` against the window
pub fn rows<P>(window: &WindowCache<P>, range: VisibleRange) -> Vec<RowSlot<'_, P>> {
    range
        .indices()
        .map(|index| match window.item_at(index) {
            Some(item) => RowSlot::Loaded { index, item },
            None => RowSlot::Placeholder { index },
        })
        .collect()
}

/// Decide what to display for the current window and visible range
pub fn render_view<P>(window: &WindowCache<P>, range: Option<VisibleRange>) -> RenderView<'_, P> {
    if !window.is_initialized() {
        return RenderView::Loading;
    }
    if window.total_count() == 0 {
        return RenderView::Empty;
    }
    match range {
        Some(range) => RenderView::Rows(rows(window, range)),
        None => RenderView::Rows(Vec::new()),
    }
}

/// Push the window's total to the virtualizer. Returns whether it changed.
pub fn sync_total_count<V, P>(virtualizer: &mut V, window: &WindowCache<P>) -> bool
where
    V: ViewportVirtualizer + ?Sized,
{
    if !window.is_initialized() || virtualizer.total_count() == window.total_count() {
        return false;
    }
    tracing::debug!(
        target: "viewport::range",
        from = virtualizer.total_count(),
        to = window.total_count(),
        "total count changed"
    );
    virtualizer.set_total_count(window.total_count());
    true
}
