//! Controller configuration.

use std::time::Duration;

/// Default idle time after the last edit before an autosave fires.
pub const DEFAULT_AUTOSAVE_DEBOUNCE: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WizardConfig {
    /// Idle window after the last edit before the draft is saved.
    pub autosave_debounce: Duration,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            autosave_debounce: DEFAULT_AUTOSAVE_DEBOUNCE,
        }
    }
}

impl WizardConfig {
    pub fn with_autosave_millis(millis: u64) -> Self {
        Self {
            autosave_debounce: Duration::from_millis(millis),
        }
    }
}
