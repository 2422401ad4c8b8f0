//! Viewport configuration

use serde::{Deserialize, Serialize};

/// Configuration for the row virtualizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Height of the visible area
    pub viewport_height: f64,
    /// Estimated height of a single row
    pub estimated_row_size: f64,
    /// Number of rows to report above and below the visible area
    pub overscan: usize,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            viewport_height: 400.0,
            estimated_row_size: 90.0,
            overscan: 0,
        }
    }
}

impl ViewportConfig {
    /// Set the viewport height
    pub fn with_viewport_height(mut self, height: f64) -> Self {
        self.viewport_height = height;
        self
    }

    /// Set the estimated row size
    pub fn with_estimated_row_size(mut self, size: f64) -> Self {
        self.estimated_row_size = size;
        self
    }

    /// Set the overscan row count
    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }
}
