//! Visible index ranges reported by the viewport

use serde::{Deserialize, Serialize};
use std::ops::{Range, RangeInclusive};

/// Inclusive range of absolute indices into the remote collection.
///
/// The range may reference indices the cached window does not hold yet;
/// that is what triggers a re-sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisibleRange {
    start: usize,
    end: usize,
}

impl VisibleRange {
    /// Create a range covering `start..=end`.
    ///
    /// Bounds given in the wrong order are swapped, so `start <= end` always holds.
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Convert a half-open range, returning `None` when it is empty
    pub fn from_exclusive(range: Range<usize>) -> Option<Self> {
        if range.is_empty() {
            None
        } else {
            Some(Self {
                start: range.start,
                end: range.end - 1,
            })
        }
    }

    /// First visible index
    pub fn start(&self) -> usize {
        self.start
    }

    /// Last visible index (inclusive)
    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of indices in the range (always at least 1)
    pub fn len(&self) -> usize {
        (self.end - self.start).saturating_add(1)
    }

    /// Index in the middle of the range, rounding toward the end
    pub fn midpoint(&self) -> usize {
        self.start + self.len() / 2
    }

    /// Check whether an absolute index is in the range
    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index <= self.end
    }

    /// Iterate over the absolute indices of the range
    pub fn indices(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }

    /// Intersect with a half-open span of absolute indices
    pub fn intersect(&self, span: Range<usize>) -> Option<Self> {
        let start = self.start.max(span.start);
        let end_exclusive = self.end.saturating_add(1).min(span.end);
        Self::from_exclusive(start..end_exclusive)
    }
}

impl std::fmt::Display for VisibleRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_len_is_inclusive() {
        let range = VisibleRange::new(58, 59);
        assert_eq!(range.len(), 2);
        assert_eq!(VisibleRange::new(4, 4).len(), 1);
    }

    #[test]
    fn test_reversed_bounds_are_swapped() {
        let range = VisibleRange::new(10, 3);
        assert_eq!(range.start(), 3);
        assert_eq!(range.end(), 10);
    }

    #[test]
    fn test_from_exclusive() {
        assert_eq!(VisibleRange::from_exclusive(5..5), None);
        assert_eq!(
            VisibleRange::from_exclusive(5..8),
            Some(VisibleRange::new(5, 7))
        );
    }

    #[test]
    fn test_intersect() {
        let range = VisibleRange::new(10, 19);
        assert_eq!(range.intersect(15..40), Some(VisibleRange::new(15, 19)));
        assert_eq!(range.intersect(0..12), Some(VisibleRange::new(10, 11)));
        assert_eq!(range.intersect(20..30), None);
        assert_eq!(range.intersect(0..10), None);
    }

    #[test]
    fn test_midpoint() {
        assert_eq!(VisibleRange::new(58, 59).midpoint(), 59);
        assert_eq!(VisibleRange::new(50, 61).midpoint(), 56);
        assert_eq!(VisibleRange::new(7, 7).midpoint(), 7);
    }

    #[test]
    fn test_range_at_usize_max_does_not_overflow() {
        let range = VisibleRange::new(usize::MAX - 2, usize::MAX);
        assert_eq!(range.len(), 3);
        assert_eq!(
            range.intersect(usize::MAX - 1..usize::MAX),
            Some(VisibleRange::new(usize::MAX - 1, usize::MAX - 1))
        );
        assert_eq!(VisibleRange::new(0, usize::MAX).len(), usize::MAX);
    }

    #[test]
    fn test_indices() {
        let collected: Vec<usize> = VisibleRange::new(2, 5).indices().collect();
        assert_eq!(collected, vec![2, 3, 4, 5]);
    }
}
