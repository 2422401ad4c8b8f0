//! Scripted run of a windowed list against a simulated remote.

use crate::settings::{DemoSettings, ScriptStep};
use remote_source::{MemoryCollection, SimulatedRemote};
use std::sync::Arc;
use std::time::Duration;
use sync_engine::{
    export, render_view, DriverHandle, RenderView, RowSlot, SyncDriver, SyncEngine, SyncStats,
    SyncStatus,
};
use viewport::FixedRowVirtualizer;

type DemoRemote = SimulatedRemote<MemoryCollection<String>>;

/// Summary of a finished run
#[derive(Debug, Clone)]
pub struct DemoReport {
    /// Frames rendered, one per settled step
    pub frames: Vec<Vec<String>>,
    /// Diagnostic dumps in JSON
    pub dumps: Vec<String>,
    pub status: SyncStatus,
    pub stats: SyncStats,
}

/// Run the scripted demo and return what was rendered
pub async fn run(settings: DemoSettings) -> anyhow::Result<DemoReport> {
    let collection = MemoryCollection::seeded(&settings.remote, settings.seed_items, |i| {
        format!("Data {i}")
    });
    let remote = Arc::new(SimulatedRemote::new(collection, &settings.remote));
    let engine = SyncEngine::new(Arc::clone(&remote), settings.sync.clone());
    let virtualizer = FixedRowVirtualizer::new(settings.viewport.clone());

    let (handle, task) = SyncDriver::new(engine, virtualizer).spawn();
    let indicator = tokio::spawn(watch_loading(handle.clone()));

    let mut frames = Vec::new();
    let mut dumps = Vec::new();

    handle.settle().await?;
    frames.push(render_frame(&handle));

    for step in &settings.script {
        tracing::debug!(?step, "script step");
        match step {
            ScriptStep::ScrollBy { delta } => handle.scroll_by(*delta)?,
            ScriptStep::ScrollTo { offset } => handle.scroll_to(*offset)?,
            ScriptStep::ScrollToIndex { index } => handle.scroll_to_index(*index)?,
            ScriptStep::Resize { height } => handle.resize(*height)?,
            ScriptStep::AddItem => {
                let count = remote.inner().len();
                let id = remote.inner().prepend(format!("Data {count}"));
                tracing::info!(%id, "item added in backend");
                continue;
            }
            ScriptStep::Wait { ms } => {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
                continue;
            }
            ScriptStep::Dump => {
                let dump = dump_json(&handle, &remote)?;
                println!("{dump}");
                dumps.push(dump);
                continue;
            }
        }

        handle.settle().await?;
        frames.push(render_frame(&handle));
    }

    handle.shutdown()?;
    let engine = task.await?;
    indicator.abort();

    let report = DemoReport {
        frames,
        dumps,
        status: engine.status(),
        stats: engine.stats().clone(),
    };
    tracing::info!(
        issued = report.stats.fetches_issued,
        applied = report.stats.fetches_applied,
        failed = report.stats.fetches_failed,
        discarded = report.stats.fetches_discarded,
        "demo finished"
    );
    Ok(report)
}

/// Print the visible rows, one line per row
fn render_frame(handle: &DriverHandle<String>) -> Vec<String> {
    let window = handle.window();
    let lines = match render_view(&window, handle.visible_range()) {
        RenderView::Loading => vec!["Loading...".to_string()],
        RenderView::Empty => vec!["(empty)".to_string()],
        RenderView::Rows(rows) => rows
            .iter()
            .map(|slot| match slot {
                RowSlot::Loaded { index, item } => format!("#{index:<4} {}", item.payload),
                RowSlot::Placeholder { index } => format!("#{index:<4} ..."),
            })
            .collect(),
    };

    if let Some(range) = handle.visible_range() {
        println!(
            "-- rows {range} | window {:?} of {} --",
            window.coverage(),
            window.total_count()
        );
    }
    for line in &lines {
        println!("{line}");
    }
    lines
}

fn dump_json(handle: &DriverHandle<String>, remote: &DemoRemote) -> anyhow::Result<String> {
    let window = handle.window();
    let snapshot = export(
        &window,
        handle.visible_range(),
        &remote.inner().snapshot(),
        handle.status(),
    );
    Ok(snapshot.to_json()?)
}

/// Log the loading indicator whenever it toggles
async fn watch_loading(handle: DriverHandle<String>) {
    let mut status = handle.status_receiver();
    let mut loading = status.borrow_and_update().is_loading;
    while status.changed().await.is_ok() {
        let now = status.borrow_and_update().is_loading;
        if now != loading {
            loading = now;
            tracing::info!(loading, "loading indicator");
        }
    }
}
