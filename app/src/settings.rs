//! Demo settings
//!
//! Settings are read from an optional JSON file. Every field has a default,
//! so a file only needs the values it overrides.

use remote_source::RemoteConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use sync_engine::SyncConfig;
use viewport::ViewportConfig;

/// One scripted user or backend action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptStep {
    ScrollBy { delta: f64 },
    ScrollTo { offset: f64 },
    ScrollToIndex { index: usize },
    Resize { height: f64 },
    /// Insert a new item at the head of the remote collection
    AddItem,
    /// Let time pass without waiting for the list to settle
    Wait { ms: u64 },
    /// Print the diagnostic views as JSON
    Dump,
}

/// Demo settings container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoSettings {
    pub remote: RemoteConfig,
    pub viewport: ViewportConfig,
    pub sync: SyncConfig,
    /// Items in the remote collection at startup
    pub seed_items: usize,
    pub script: Vec<ScriptStep>,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            remote: RemoteConfig::default(),
            viewport: ViewportConfig::default(),
            sync: SyncConfig::default(),
            seed_items: 50,
            script: default_script(),
        }
    }
}

/// Scroll to the bottom in viewport-sized steps, add an item, then go back up
fn default_script() -> Vec<ScriptStep> {
    let mut script = vec![ScriptStep::ScrollBy { delta: 400.0 }; 11];
    script.push(ScriptStep::AddItem);
    script.push(ScriptStep::ScrollToIndex { index: 0 });
    script.push(ScriptStep::ScrollBy { delta: 1350.0 });
    script.push(ScriptStep::Dump);
    script
}

impl DemoSettings {
    /// Load settings from `path`, or return defaults if there is no file
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            tracing::info!("Settings file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str::<DemoSettings>(&content) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                tracing::warn!("Failed to parse settings file, using defaults: {}", e);
                Ok(Self::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sync_engine::StalePolicy;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = DemoSettings::default();
        assert_eq!(settings.seed_items, 50);
        assert_eq!(settings.remote.slice_len, 20);
        assert_eq!(settings.viewport.estimated_row_size, 90.0);
        assert!(settings.script.contains(&ScriptStep::AddItem));
    }

    #[test]
    fn test_load_without_path() {
        assert_eq!(DemoSettings::load(None).unwrap(), DemoSettings::default());
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.json");
        assert_eq!(DemoSettings::load(Some(&path)).unwrap(), DemoSettings::default());
    }

    #[test]
    fn test_load_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("demo.json");
        std::fs::write(
            &path,
            r#"{
                "seed_items": 200,
                "remote": { "latency_ms": 0 },
                "sync": { "stale_policy": "discard_out_of_view" },
                "script": [
                    { "action": "scroll_to_index", "index": 120 },
                    { "action": "add_item" },
                    { "action": "wait", "ms": 50 }
                ]
            }"#,
        )
        .unwrap();

        let settings = DemoSettings::load(Some(&path)).unwrap();
        assert_eq!(settings.seed_items, 200);
        assert_eq!(settings.remote.latency_ms, 0);
        assert_eq!(settings.remote.slice_len, 20);
        assert_eq!(settings.sync.stale_policy, StalePolicy::DiscardOutOfView);
        assert_eq!(
            settings.script,
            vec![
                ScriptStep::ScrollToIndex { index: 120 },
                ScriptStep::AddItem,
                ScriptStep::Wait { ms: 50 },
            ]
        );
    }

    #[test]
    fn test_load_invalid_file_falls_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert_eq!(DemoSettings::load(Some(&path)).unwrap(), DemoSettings::default());
    }
}
