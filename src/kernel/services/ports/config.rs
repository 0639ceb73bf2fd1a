use std::time::Duration;

use crate::models::DEFAULT_BACKGROUND;

pub const DEFAULT_AUTOSAVE_DEBOUNCE_MS: u64 = 1000;

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub autosave_debounce: Duration,
    pub default_background: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            autosave_debounce: Duration::from_millis(DEFAULT_AUTOSAVE_DEBOUNCE_MS),
            default_background: DEFAULT_BACKGROUND.to_string(),
        }
    }
}

impl SessionConfig {
    pub fn with_debounce_ms(ms: u64) -> Self {
        Self {
            autosave_debounce: Duration::from_millis(ms),
            ..Self::default()
        }
    }
}
