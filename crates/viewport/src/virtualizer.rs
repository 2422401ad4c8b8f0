//! Scroll-offset to visible-range virtualization
//!
//! Rows are laid out top to bottom at a fixed estimated size. The visible
//! range is every row intersecting `[scroll_offset, scroll_offset + height)`,
//! widened by the overscan margin and clamped to the item count. Because the
//! size is only an estimate, it affects scrollbar proportions, never which
//! data is synchronized.

use crate::ViewportConfig;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use window_model::VisibleRange;

/// A producer of visible index ranges
pub trait ViewportVirtualizer {
    /// Number of items the scrollable extent represents
    fn total_count(&self) -> usize;

    /// Update the number of items. Must be called whenever the known total changes.
    fn set_total_count(&mut self, total_count: usize);

    /// Current visible range, or `None` when nothing is visible
    fn visible_range(&self) -> Option<VisibleRange>;

    /// Receive a notification every time the visible range changes
    fn subscribe(&self) -> watch::Receiver<Option<VisibleRange>>;

    /// Current scroll offset
    fn scroll_offset(&self) -> f64;

    /// Estimated height of one row
    fn row_size(&self) -> f64;

    /// Scroll to an absolute offset, returning the new visible range
    fn scroll_to(&mut self, offset: f64) -> Option<VisibleRange>;

    /// Change the viewport height, returning the new visible range
    fn resize(&mut self, viewport_height: f64) -> Option<VisibleRange>;

    /// Scroll by a relative delta
    fn scroll_by(&mut self, delta: f64) -> Option<VisibleRange> {
        self.scroll_to(self.scroll_offset() + delta)
    }

    /// Scroll so that the row at `index` is at the top of the viewport
    fn scroll_to_index(&mut self, index: usize) -> Option<VisibleRange> {
        self.scroll_to(index as f64 * self.row_size())
    }
}

/// Position of a rendered row inside the scroll container
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VirtualRow {
    /// Absolute item index
    pub index: usize,
    /// Offset of the row's top edge from the top of the list
    pub start: f64,
    /// Row height
    pub size: f64,
}

/// Compute the visible range for a list of `total_count` equally sized rows
pub fn compute_visible_range(
    total_count: usize,
    scroll_offset: f64,
    viewport_height: f64,
    row_size: f64,
    overscan: usize,
) -> Option<VisibleRange> {
    if total_count == 0 || viewport_height <= 0.0 || row_size <= 0.0 {
        return None;
    }

    let scroll_offset = scroll_offset.max(0.0);
    let first = (scroll_offset / row_size).floor() as usize;
    let last_exclusive = ((scroll_offset + viewport_height) / row_size).ceil() as usize;

    let first = first.min(total_count - 1);
    let last_exclusive = last_exclusive.clamp(first + 1, total_count);

    let start = first.saturating_sub(overscan);
    let end_exclusive = (last_exclusive + overscan).min(total_count);

    VisibleRange::from_exclusive(start..end_exclusive)
}

/// Virtualizer for rows of a fixed estimated size
#[derive(Debug)]
pub struct FixedRowVirtualizer {
    config: ViewportConfig,
    total_count: usize,
    scroll_offset: f64,
    range_tx: watch::Sender<Option<VisibleRange>>,
}

impl FixedRowVirtualizer {
    /// Create a virtualizer over an empty list
    pub fn new(config: ViewportConfig) -> Self {
        let (range_tx, _rx) = watch::channel(None);
        Self {
            config,
            total_count: 0,
            scroll_offset: 0.0,
            range_tx,
        }
    }

    /// Create a virtualizer over `total_count` rows
    pub fn with_total_count(config: ViewportConfig, total_count: usize) -> Self {
        let mut virtualizer = Self::new(config);
        virtualizer.set_total_count(total_count);
        virtualizer
    }

    /// Get the configuration
    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    /// Height of the whole list (for the scroll container)
    pub fn total_size(&self) -> f64 {
        self.total_count as f64 * self.config.estimated_row_size
    }

    /// Largest scroll offset that still fills the viewport
    pub fn max_scroll_offset(&self) -> f64 {
        (self.total_size() - self.config.viewport_height).max(0.0)
    }

    /// Rows to render with their positions
    pub fn virtual_rows(&self) -> Vec<VirtualRow> {
        let size = self.config.estimated_row_size;
        self.visible_range()
            .map(|range| {
                range
                    .indices()
                    .map(|index| VirtualRow {
                        index,
                        start: index as f64 * size,
                        size,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn compute(&self) -> Option<VisibleRange> {
        compute_visible_range(
            self.total_count,
            self.scroll_offset,
            self.config.viewport_height,
            self.config.estimated_row_size,
            self.config.overscan,
        )
    }

    fn publish(&self) -> Option<VisibleRange> {
        let range = self.compute();
        self.range_tx.send_if_modified(|current| {
            if *current == range {
                return false;
            }
            tracing::trace!(
                target: "viewport::range",
                from = ?current,
                to = ?range,
                scroll_offset = self.scroll_offset,
                "visible range changed"
            );
            *current = range;
            true
        });
        range
    }
}

impl ViewportVirtualizer for FixedRowVirtualizer {
    fn total_count(&self) -> usize {
        self.total_count
    }

    fn set_total_count(&mut self, total_count: usize) {
        self.total_count = total_count;
        self.scroll_offset = self.scroll_offset.min(self.max_scroll_offset());
        self.publish();
    }

    fn visible_range(&self) -> Option<VisibleRange> {
        *self.range_tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<Option<VisibleRange>> {
        self.range_tx.subscribe()
    }

    fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    fn row_size(&self) -> f64 {
        self.config.estimated_row_size
    }

    fn scroll_to(&mut self, offset: f64) -> Option<VisibleRange> {
        self.scroll_offset = offset.clamp(0.0, self.max_scroll_offset());
        self.publish()
    }

    fn resize(&mut self, viewport_height: f64) -> Option<VisibleRange> {
        self.config.viewport_height = viewport_height.max(0.0);
        self.scroll_offset = self.scroll_offset.min(self.max_scroll_offset());
        self.publish()
    }
}
