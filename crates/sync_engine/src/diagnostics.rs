//! Read-only diagnostic export of the three debug views:
//! rendered rows, cached window and the full remote collection.

use crate::adapter::{rows, RowSlot};
use crate::error::SyncResult;
use crate::status::SyncStatus;
use serde::Serialize;
use std::collections::HashSet;
use window_model::{Item, ItemId, VisibleRange, WindowCache};

/// A row as the list renders it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedRow<P> {
    pub index: usize,
    /// `None` for a placeholder
    pub id: Option<ItemId>,
    pub payload: Option<P>,
}

/// A cached window entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CachedEntry<P> {
    pub index: usize,
    pub id: ItemId,
    pub payload: P,
    /// Whether the row is currently in the visible range
    pub visible: bool,
}

/// A remote collection entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemoteEntry<P> {
    pub index: usize,
    pub id: ItemId,
    pub payload: P,
    /// Whether the window currently holds this item
    pub cached: bool,
}

/// Point-in-time dump of everything the list knows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticsSnapshot<P> {
    pub visible_range: Option<VisibleRange>,
    pub status: SyncStatus,
    pub rendered: Vec<RenderedRow<P>>,
    pub window: Vec<CachedEntry<P>>,
    pub remote: Vec<RemoteEntry<P>>,
}

impl<P: Serialize> DiagnosticsSnapshot<P> {
    /// Serialize as pretty-printed JSON
    pub fn to_json(&self) -> SyncResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Build a diagnostics snapshot.
///
/// `remote_items` is whatever snapshot of the remote collection the caller
/// can see; pass an empty slice when the remote is opaque.
pub fn export<P: Clone>(
    window: &WindowCache<P>,
    visible_range: Option<VisibleRange>,
    remote_items: &[Item<P>],
    status: SyncStatus,
) -> DiagnosticsSnapshot<P> {
    let rendered = visible_range
        .map(|range| {
            rows(window, range)
                .into_iter()
                .map(|slot| match slot {
                    RowSlot::Loaded { index, item } => RenderedRow {
                        index,
                        id: Some(item.id.clone()),
                        payload: Some(item.payload.clone()),
                    },
                    RowSlot::Placeholder { index } => RenderedRow {
                        index,
                        id: None,
                        payload: None,
                    },
                })
                .collect()
        })
        .unwrap_or_default();

    let cached_entries = window
        .items()
        .iter()
        .enumerate()
        .map(|(local, item)| {
            let index = window.offset() + local;
            CachedEntry {
                index,
                id: item.id.clone(),
                payload: item.payload.clone(),
                visible: visible_range.is_some_and(|range| range.contains(index)),
            }
        })
        .collect();

    let cached: HashSet<&ItemId> = window.items().iter().map(|item| &item.id).collect();
    let remote = remote_items
        .iter()
        .enumerate()
        .map(|(index, item)| RemoteEntry {
            index,
            id: item.id.clone(),
            payload: item.payload.clone(),
            cached: cached.contains(&item.id),
        })
        .collect();

    DiagnosticsSnapshot {
        visible_range,
        status,
        rendered,
        window: cached_entries,
        remote,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use window_model::FetchResult;

    fn make_items(count: usize) -> Vec<Item<String>> {
        (0..count)
            .map(|i| Item::new(format!("id-{i}"), format!("Data {i}")))
            .collect()
    }

    fn make_window(remote: &[Item<String>], offset: usize, len: usize) -> WindowCache<String> {
        let mut window = WindowCache::new();
        let slice = remote[offset..offset + len].to_vec();
        window
            .replace(FetchResult::new(slice, offset, remote.len()))
            .unwrap();
        window
    }

    #[test]
    fn test_export_flags_visible_and_cached() {
        let remote = make_items(10);
        let window = make_window(&remote, 2, 4);
        let snapshot = export(
            &window,
            Some(VisibleRange::new(4, 7)),
            &remote,
            SyncStatus::default(),
        );

        assert_eq!(snapshot.rendered.len(), 4);
        assert_eq!(snapshot.rendered[0].payload.as_deref(), Some("Data 4"));
        assert_eq!(snapshot.rendered[2].id, None);

        let visible: Vec<usize> = snapshot
            .window
            .iter()
            .filter(|entry| entry.visible)
            .map(|entry| entry.index)
            .collect();
        assert_eq!(visible, vec![4, 5]);

        let cached: Vec<usize> = snapshot
            .remote
            .iter()
            .filter(|entry| entry.cached)
            .map(|entry| entry.index)
            .collect();
        assert_eq!(cached, vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_export_without_range_or_remote() {
        let remote = make_items(5);
        let window = make_window(&remote, 0, 5);
        let snapshot = export(&window, None, &[], SyncStatus::default());

        assert!(snapshot.rendered.is_empty());
        assert!(snapshot.window.iter().all(|entry| !entry.visible));
        assert!(snapshot.remote.is_empty());
    }

    #[test]
    fn test_to_json() {
        let remote = make_items(3);
        let window = make_window(&remote, 0, 2);
        let snapshot = export(&window, Some(VisibleRange::new(0, 2)), &remote, SyncStatus::default());

        let json = snapshot.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["visible_range"]["start"], 0);
        assert_eq!(value["rendered"][2]["payload"], serde_json::Value::Null);
        assert_eq!(value["remote"][2]["cached"], false);
        assert_eq!(value["status"]["phase"], "Idle");
    }
}
