//! Windowed List - headless demo
//!
//! Seeds a simulated remote collection, then replays a script of scrolls
//! and backend insertions against the sync engine, printing the rendered
//! rows after each step.
//!
//! Usage: `windowed-list [settings.json]`

mod demo;
mod settings;

use settings::DemoSettings;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting windowed list demo");

    let settings_path = std::env::args().nth(1).map(PathBuf::from);
    let settings = DemoSettings::load(settings_path.as_deref())?;
    tracing::info!(
        seed_items = settings.seed_items,
        steps = settings.script.len(),
        "Settings loaded"
    );

    let report = demo::run(settings).await?;
    tracing::info!(
        frames = report.frames.len(),
        dumps = report.dumps.len(),
        total = report.status.total_count,
        "Demo complete"
    );
    Ok(())
}
