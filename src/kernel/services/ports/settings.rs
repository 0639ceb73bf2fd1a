use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::config::{SessionConfig, DEFAULT_AUTOSAVE_DEBOUNCE_MS};

pub const DEFAULT_LOG_FILTER: &str = "canvasdesk=info";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_autosave_debounce_ms")]
    pub autosave_debounce_ms: u64,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            autosave_debounce_ms: DEFAULT_AUTOSAVE_DEBOUNCE_MS,
            log_filter: default_log_filter(),
            log_dir: None,
        }
    }
}

impl Settings {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            autosave_debounce: Duration::from_millis(self.autosave_debounce_ms),
            ..SessionConfig::default()
        }
    }
}

fn default_autosave_debounce_ms() -> u64 {
    DEFAULT_AUTOSAVE_DEBOUNCE_MS
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}
