//! Re-evaluation: does the cached window cover the visible range?
//!
//! `evaluate` is a pure function of the visible range, the window snapshot
//! and whether a fetch is in flight. Conditions are checked in priority order
//! and the first match wins:
//!
//! 1. a fetch is in flight: nothing to decide
//! 2. the window was never populated: fetch without an anchor
//! 3. the last visible item sits within one viewport of the window's tail
//!    (and the window does not already reach the end of the collection)
//! 4. the viewport is not at the very top and that same item sits within one
//!    viewport of the window's head
//! 5. the top of the collection is visible but the window starts further down
//! 6. the visible range shares no index with the window: fetch anchored at
//!    the window edge nearest the range
//!
//! Rules 3 to 5 only decide *whether* to fetch. The fetch itself is anchored
//! at the held item nearest the middle of the visible range, so the returned
//! slice extends on both sides of what is on screen.
//!
//! A window that was fetched around a visible item and still holds the whole
//! range is `Settled`. When the planned anchor is the one the window was
//! already fetched around but rows are still missing, the fetch moves to the
//! window edge next to the gap; if no other anchor can help, the decision is
//! `Settled` as well.

use serde::{Deserialize, Serialize};
use window_model::{ItemId, VisibleRange, WindowCache};

/// Why a fetch was decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyncTrigger {
    /// The window has never been populated
    Uninitialized,
    /// Fewer than one viewport of cached items remain below the visible range
    UpperBound,
    /// Fewer than one viewport of cached items remain above the visible range
    LowerBound,
    /// The visible range lies entirely outside the window
    OutOfWindow,
}

/// Why no fetch is needed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdleReason {
    /// A fetch is already outstanding; the trigger is dropped
    InFlight,
    /// The viewport reports nothing visible
    NoVisibleRange,
    /// The remote collection is empty
    EmptyCollection,
    /// The window covers the visible range with enough margin
    Covered,
    /// The window was fetched around a visible item and a new fetch would not
    /// change what is held
    Settled,
}

/// A fetch the engine should issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchPlan {
    pub trigger: SyncTrigger,
    /// Item to center the slice on; `None` lets the remote pick its default
    pub anchor: Option<ItemId>,
    /// Position of the anchor within the current window
    pub local_position: Option<usize>,
}

/// Outcome of a re-evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncDecision {
    Idle(IdleReason),
    Fetch(FetchPlan),
}

impl SyncDecision {
    /// Whether a fetch was decided
    pub fn is_fetch(&self) -> bool {
        matches!(self, SyncDecision::Fetch(_))
    }

    /// The trigger of a fetch decision
    pub fn trigger(&self) -> Option<SyncTrigger> {
        match self {
            SyncDecision::Fetch(plan) => Some(plan.trigger),
            SyncDecision::Idle(_) => None,
        }
    }

    /// The anchor of a fetch decision
    pub fn anchor(&self) -> Option<&ItemId> {
        match self {
            SyncDecision::Fetch(plan) => plan.anchor.as_ref(),
            SyncDecision::Idle(_) => None,
        }
    }
}

/// Decide whether the window must be re-fetched for `range`
pub fn evaluate<P>(
    range: Option<VisibleRange>,
    window: &WindowCache<P>,
    in_flight: bool,
) -> SyncDecision {
    if in_flight {
        return SyncDecision::Idle(IdleReason::InFlight);
    }

    if !window.is_initialized() {
        return SyncDecision::Fetch(FetchPlan {
            trigger: SyncTrigger::Uninitialized,
            anchor: None,
            local_position: None,
        });
    }

    if window.total_count() == 0 {
        return SyncDecision::Idle(IdleReason::EmptyCollection);
    }

    let Some(range) = range else {
        return SyncDecision::Idle(IdleReason::NoVisibleRange);
    };

    if window.is_empty() {
        // Only an anchored fetch can come back empty from a non-empty
        // collection; go back to the remote's default position once.
        return match window.anchor() {
            Some(_) => SyncDecision::Fetch(FetchPlan {
                trigger: SyncTrigger::OutOfWindow,
                anchor: None,
                local_position: None,
            }),
            None => SyncDecision::Idle(IdleReason::Settled),
        };
    }

    let plan = match window.last_resolved(range) {
        Some(local) => {
            let trigger = match proximity_trigger(range, window, local) {
                Some(trigger) => trigger,
                // Rule 4 never fires with the first row visible
                None if range.start() < window.offset() => SyncTrigger::LowerBound,
                None => return SyncDecision::Idle(IdleReason::Covered),
            };
            centered_plan(trigger, range, window)
        }
        None => match out_of_window_edge(range, window) {
            Some(local) => plan_at(SyncTrigger::OutOfWindow, window, local),
            None => return SyncDecision::Idle(IdleReason::Covered),
        },
    };

    let Some(current) = window.anchor() else {
        return SyncDecision::Fetch(plan);
    };

    if window.covers(range) && anchor_is_visible(range, window, current) {
        return SyncDecision::Idle(IdleReason::Settled);
    }

    if plan.anchor.as_ref() == Some(current) {
        // The same anchor would return the same slice; widen toward the gap instead
        return match uncovered_edge(range, window) {
            Some(local) if &window.items()[local].id != current => {
                SyncDecision::Fetch(plan_at(plan.trigger, window, local))
            }
            _ => SyncDecision::Idle(IdleReason::Settled),
        };
    }

    SyncDecision::Fetch(plan)
}

/// Fetch anchored at the held item nearest the middle of `range`
fn centered_plan<P>(
    trigger: SyncTrigger,
    range: VisibleRange,
    window: &WindowCache<P>,
) -> FetchPlan {
    let local = window.nearest_local(range.midpoint()).unwrap_or_default();
    plan_at(trigger, window, local)
}

fn plan_at<P>(trigger: SyncTrigger, window: &WindowCache<P>, local: usize) -> FetchPlan {
    FetchPlan {
        trigger,
        anchor: Some(window.items()[local].id.clone()),
        local_position: Some(local),
    }
}

fn anchor_is_visible<P>(range: VisibleRange, window: &WindowCache<P>, anchor: &ItemId) -> bool {
    window
        .position_of(anchor)
        .is_some_and(|local| range.contains(window.offset() + local))
}

/// Window edge next to the part of `range` the window does not hold.
///
/// `None` when the range is fully held, when the gap lies past the ends of the
/// collection, or when the range is longer than the window could ever be.
fn uncovered_edge<P>(range: VisibleRange, window: &WindowCache<P>) -> Option<usize> {
    if range.len() > window.len() {
        return None;
    }
    if range.end() >= window.window_end() && window.window_end() < window.total_count() {
        Some(window.len() - 1)
    } else if range.start() < window.offset() {
        Some(0)
    } else {
        None
    }
}

/// Edge proximity of the last resolved visible item at `local`
fn proximity_trigger<P>(
    range: VisibleRange,
    window: &WindowCache<P>,
    local: usize,
) -> Option<SyncTrigger> {
    let visible = range.len();
    let more_below = window.window_end() < window.total_count();
    let more_above = window.offset() > 0;

    if more_below && local >= window.len().saturating_sub(visible) {
        return Some(SyncTrigger::UpperBound);
    }

    if more_above && range.start() > 0 && local <= visible - 1 {
        return Some(SyncTrigger::LowerBound);
    }

    None
}

/// Window edge nearest a range that lies entirely outside the window
fn out_of_window_edge<P>(range: VisibleRange, window: &WindowCache<P>) -> Option<usize> {
    if range.start() >= window.window_end() {
        (window.window_end() < window.total_count()).then(|| window.len() - 1)
    } else {
        (window.offset() > 0).then_some(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use window_model::{FetchResult, Item};

    fn make_window(offset: usize, len: usize, total: usize) -> WindowCache<String> {
        make_window_anchored(offset, len, total, None)
    }

    fn make_window_anchored(
        offset: usize,
        len: usize,
        total: usize,
        anchor: Option<usize>,
    ) -> WindowCache<String> {
        let slice = (offset..offset + len)
            .map(|i| Item::new(format!("id-{i}"), format!("Data {i}")))
            .collect();
        let mut window = WindowCache::new();
        window
            .replace_anchored(
                FetchResult::new(slice, offset, total),
                anchor.map(|i| ItemId::new(format!("id-{i}"))),
            )
            .unwrap();
        window
    }

    fn range_ending_at(end: usize, len: usize) -> VisibleRange {
        VisibleRange::new(end + 1 - len, end)
    }

    #[test]
    fn test_uninitialized_fetches_without_anchor() {
        let window: WindowCache<String> = WindowCache::new();
        let decision = evaluate(None, &window, false);

        assert_eq!(
            decision,
            SyncDecision::Fetch(FetchPlan {
                trigger: SyncTrigger::Uninitialized,
                anchor: None,
                local_position: None,
            })
        );
    }

    #[test]
    fn test_in_flight_suppresses_everything() {
        let window: WindowCache<String> = WindowCache::new();
        assert_eq!(
            evaluate(None, &window, true),
            SyncDecision::Idle(IdleReason::InFlight)
        );

        let window = make_window(40, 20, 100);
        assert_eq!(
            evaluate(Some(VisibleRange::new(58, 59)), &window, true),
            SyncDecision::Idle(IdleReason::InFlight)
        );
    }

    #[test]
    fn test_edge_trigger_near_tail() {
        // 20 items at offset 5, viewport of 10; last visible at local 18
        let window = make_window(5, 20, 100);
        let decision = evaluate(Some(range_ending_at(5 + 18, 10)), &window, false);

        // Anchored in the middle of the visible range [14, 23]
        assert_eq!(
            decision,
            SyncDecision::Fetch(FetchPlan {
                trigger: SyncTrigger::UpperBound,
                anchor: Some(ItemId::new("id-19")),
                local_position: Some(14),
            })
        );
    }

    #[test]
    fn test_last_visible_at_local_five_is_head_proximity() {
        // Range [1, 10] over a window at offset 5: the last visible item sits
        // at local 5, within one viewport of the head
        let window = make_window(5, 20, 100);
        let decision = evaluate(Some(range_ending_at(5 + 5, 10)), &window, false);

        assert_eq!(
            decision,
            SyncDecision::Fetch(FetchPlan {
                trigger: SyncTrigger::LowerBound,
                anchor: Some(ItemId::new("id-6")),
                local_position: Some(1),
            })
        );
    }

    #[test]
    fn test_mid_window_range_needs_no_fetch() {
        let window = make_window(100, 40, 500);
        // last visible at local 24: more than a viewport from either edge
        let decision = evaluate(Some(VisibleRange::new(115, 124)), &window, false);

        assert_eq!(decision, SyncDecision::Idle(IdleReason::Covered));
    }

    #[test]
    fn test_scroll_to_window_tail_anchors_range_middle() {
        let window = make_window(40, 20, 100);
        let decision = evaluate(Some(VisibleRange::new(58, 59)), &window, false);

        assert_eq!(decision.trigger(), Some(SyncTrigger::UpperBound));
        assert_eq!(decision.anchor(), Some(&ItemId::new("id-59")));
        assert_eq!(
            decision,
            SyncDecision::Fetch(FetchPlan {
                trigger: SyncTrigger::UpperBound,
                anchor: Some(ItemId::new("id-59")),
                local_position: Some(19),
            })
        );
    }

    #[test]
    fn test_lower_bound_when_scrolling_up() {
        let window = make_window(40, 20, 100);
        // range 37..=44: last visible at local 4 <= 7
        let decision = evaluate(Some(VisibleRange::new(37, 44)), &window, false);

        assert_eq!(decision.trigger(), Some(SyncTrigger::LowerBound));
        assert_eq!(decision.anchor(), Some(&ItemId::new("id-41")));
    }

    #[test]
    fn test_lower_bound_ignored_at_top_of_collection() {
        let window = make_window(0, 20, 100);
        let decision = evaluate(Some(VisibleRange::new(0, 4)), &window, false);

        assert_eq!(decision, SyncDecision::Idle(IdleReason::Covered));
    }

    #[test]
    fn test_leading_gap_at_top_of_collection() {
        // Fetched around id-12 while scrolling up, then jumped to the top
        let window = make_window_anchored(2, 20, 100, Some(12));
        let decision = evaluate(Some(VisibleRange::new(0, 4)), &window, false);

        assert_eq!(
            decision,
            SyncDecision::Fetch(FetchPlan {
                trigger: SyncTrigger::LowerBound,
                anchor: Some(ItemId::new("id-2")),
                local_position: Some(0),
            })
        );
    }

    #[test]
    fn test_upper_bound_ignored_at_end_of_collection() {
        let window = make_window(30, 20, 50);
        let decision = evaluate(Some(VisibleRange::new(45, 49)), &window, false);

        assert_eq!(decision, SyncDecision::Idle(IdleReason::Covered));
    }

    #[test]
    fn test_whole_collection_cached_is_stable() {
        let window = make_window(0, 7, 7);
        for end in 0usize..7 {
            let range = VisibleRange::new(end.saturating_sub(4), end);
            assert!(!evaluate(Some(range), &window, false).is_fetch());
        }
    }

    #[test]
    fn test_empty_collection_is_stable() {
        let mut window: WindowCache<String> = WindowCache::new();
        window.replace(FetchResult::empty()).unwrap();

        assert_eq!(
            evaluate(None, &window, false),
            SyncDecision::Idle(IdleReason::EmptyCollection)
        );
        assert_eq!(
            evaluate(Some(VisibleRange::new(0, 4)), &window, false),
            SyncDecision::Idle(IdleReason::EmptyCollection)
        );
    }

    #[test]
    fn test_range_beyond_window_fetches_from_tail_edge() {
        let window = make_window(0, 20, 200);
        let decision = evaluate(Some(VisibleRange::new(120, 124)), &window, false);

        assert_eq!(decision.trigger(), Some(SyncTrigger::OutOfWindow));
        assert_eq!(decision.anchor(), Some(&ItemId::new("id-19")));
    }

    #[test]
    fn test_range_before_window_fetches_from_head_edge() {
        let window = make_window(100, 20, 200);
        let decision = evaluate(Some(VisibleRange::new(0, 4)), &window, false);

        assert_eq!(decision.trigger(), Some(SyncTrigger::OutOfWindow));
        assert_eq!(decision.anchor(), Some(&ItemId::new("id-100")));
    }

    #[test]
    fn test_window_centered_on_anchor_is_settled() {
        // Fetched around id-55 -> [45, 65); viewport of 10 over [50, 59]
        let window = make_window_anchored(45, 20, 100, Some(55));
        let decision = evaluate(Some(VisibleRange::new(50, 59)), &window, false);

        assert_eq!(decision, SyncDecision::Idle(IdleReason::Settled));

        // Once the anchor scrolls out of view the tail trigger fetches again
        let decision = evaluate(Some(VisibleRange::new(56, 65)), &window, false);
        assert_eq!(decision.trigger(), Some(SyncTrigger::UpperBound));
        assert_eq!(decision.anchor(), Some(&ItemId::new("id-61")));
    }

    #[test]
    fn test_tall_viewport_anchors_inside_the_gap() {
        // 12 visible rows [50, 61]; fetched around id-46 -> [36, 56)
        let window = make_window_anchored(36, 20, 200, Some(46));
        let decision = evaluate(Some(VisibleRange::new(50, 61)), &window, false);

        // The middle row 56 is not held yet; the nearest held row is 55
        assert_eq!(
            decision,
            SyncDecision::Fetch(FetchPlan {
                trigger: SyncTrigger::UpperBound,
                anchor: Some(ItemId::new("id-55")),
                local_position: Some(19),
            })
        );

        // Fetched around id-55 -> [45, 65): fully held
        let window = make_window_anchored(45, 20, 200, Some(55));
        assert_eq!(
            evaluate(Some(VisibleRange::new(50, 61)), &window, false),
            SyncDecision::Idle(IdleReason::Settled)
        );
    }

    #[test]
    fn test_same_anchor_with_gap_moves_to_gap_edge() {
        // A remote with a longer lead: fetched around id-56 -> [41, 61)
        let window = make_window_anchored(41, 20, 200, Some(56));
        let decision = evaluate(Some(VisibleRange::new(50, 61)), &window, false);

        assert_eq!(
            decision,
            SyncDecision::Fetch(FetchPlan {
                trigger: SyncTrigger::UpperBound,
                anchor: Some(ItemId::new("id-60")),
                local_position: Some(19),
            })
        );

        // Serving the anchor first leaves nothing else to try
        let window = make_window_anchored(56, 20, 200, Some(56));
        assert_eq!(
            evaluate(Some(VisibleRange::new(50, 61)), &window, false),
            SyncDecision::Idle(IdleReason::Settled)
        );
    }

    #[test]
    fn test_range_longer_than_window_is_settled() {
        // 25 rows can never fit a 20-item window; do not keep refetching
        let window = make_window_anchored(40, 20, 200, Some(50));
        let decision = evaluate(Some(VisibleRange::new(38, 62)), &window, false);

        assert_eq!(decision, SyncDecision::Idle(IdleReason::Settled));
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let window = make_window(100, 40, 500);
        let range = Some(VisibleRange::new(115, 124));

        let first = evaluate(range, &window, false);
        let second = evaluate(range, &window, false);
        assert_eq!(first, second);
        assert!(!second.is_fetch());
    }

    #[test]
    fn test_no_visible_range() {
        let window = make_window(0, 20, 50);
        assert_eq!(
            evaluate(None, &window, false),
            SyncDecision::Idle(IdleReason::NoVisibleRange)
        );
    }
}
