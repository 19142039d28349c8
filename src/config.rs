//! Configuration for the viewer controller.
//!
//! All knobs have sensible defaults; a TOML file can override them.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LensError, Result};

/// Viewer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Message pagination settings.
    #[serde(default)]
    pub pager: PagerConfig,
    /// Free-text search settings.
    #[serde(default)]
    pub search: SearchConfig,
}

impl ViewerConfig {
    /// Load configuration from a TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LensError::io(format!("Failed to read config file: {}", path.display()), e)
        })?;

        toml::from_str(&content).map_err(|e| LensError::InvalidConfig {
            message: e.to_string(),
        })
    }
}

/// Message pagination settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagerConfig {
    /// Messages rendered per pagination trigger.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
        }
    }
}

/// Free-text search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Quiet window a query must survive before it is issued.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Trimmed queries shorter than this clear results instead of querying.
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
    /// Result list cap.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl SearchConfig {
    /// Debounce window as a [`Duration`].
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            min_query_len: default_min_query_len(),
            max_results: default_max_results(),
        }
    }
}

// Default value functions for serde
fn default_batch_size() -> usize {
    50
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_min_query_len() -> usize {
    2
}

fn default_max_results() -> usize {
    50
}
