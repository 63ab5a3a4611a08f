//! Renderer Configuration

use serde::{Deserialize, Serialize};

/// How the property patcher applies a prop change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchMode {
    /// Remove every previous attribute and listener, then add every next one
    #[default]
    ReplaceAll,
    /// Only touch keys whose value changed
    Minimal,
}

/// Renderer configuration options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Prefix marking a prop as an event binding (`onClick` -> `click`)
    pub event_prefix: String,

    /// Property patching strategy
    pub patch_mode: PatchMode,

    /// Maximum fiber nesting before a render is aborted
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            event_prefix: "on".to_string(),
            patch_mode: PatchMode::ReplaceAll,
            max_depth: 256,
        }
    }
}

impl Config {
    /// Event name bound by a prop key, if the key carries the event prefix
    pub fn event_name(&self, key: &str) -> Option<String> {
        let rest = key.strip_prefix(self.event_prefix.as_str())?;
        if rest.is_empty() {
            return None;
        }
        Some(rest.to_lowercase())
    }
}
