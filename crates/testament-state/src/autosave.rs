//! # Autosave Debounce
//!
//! Armed by every edit, reset by every further edit, disarmed by every
//! save. The controller does not own a timer task; the host polls
//! [`WizardController::poll_autosave`](crate::WizardController::poll_autosave)
//! or sleeps until [`AutosaveTimer::deadline`].

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveTimer {
    debounce: Duration,
    deadline: Option<Instant>,
}

impl AutosaveTimer {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            deadline: None,
        }
    }

    /// Start or restart the window from `now`.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.debounce);
    }

    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        matches!(self.deadline, Some(deadline) if now >= deadline)
    }
}
