//! Engine configuration
//!
//! Tunables for the editor's timers and default UI geometry. Hosts usually
//! deserialize this from their settings file; every field has a default
//! matching the shipped behavior.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Editor engine tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Trailing debounce for slider-driven config commits, in milliseconds
    pub commit_debounce_ms: u64,
    /// Trailing debounce for whole-graph autosave, in milliseconds
    pub autosave_debounce_ms: u64,
    /// Default sidebar width in pixels
    pub sidebar_width: f64,
    /// Maximum number of undo snapshots kept
    pub undo_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            commit_debounce_ms: 300,
            autosave_debounce_ms: 2000,
            sidebar_width: 400.0,
            undo_depth: 100,
        }
    }
}

impl EngineConfig {
    /// The slider commit window as a duration
    pub fn commit_debounce(&self) -> Duration {
        Duration::from_millis(self.commit_debounce_ms)
    }

    /// The autosave window as a duration
    pub fn autosave_debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }
}
