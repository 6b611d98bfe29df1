//! Timed auto-hide of a revealed credential

use std::time::{Duration, Instant};

/// Default visibility window
const DEFAULT_VISIBILITY: Duration = Duration::from_secs(10);

/// Cancellable auto-hide deadline for a displayed credential
///
/// Arming a new reveal replaces any pending deadline, so two competing hide
/// timers can never race each other.
#[derive(Debug, Clone, Default)]
pub struct RevealTimer {
    deadline: Option<Instant>,
}

impl RevealTimer {
    pub fn new() -> Self {
        Self { deadline: None }
    }

    /// Reveal for the default window
    pub fn reveal(&mut self) {
        self.reveal_for(DEFAULT_VISIBILITY);
    }

    /// Reveal for a custom window, cancelling any pending hide
    pub fn reveal_for(&mut self, window: Duration) {
        self.deadline = Some(Instant::now() + window);
    }

    /// Hide immediately
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Whether the credential is currently visible
    pub fn is_visible(&self) -> bool {
        match self.deadline {
            Some(deadline) => Instant::now() < deadline,
            None => false,
        }
    }

    /// Time left until auto-hide
    pub fn remaining(&self) -> Duration {
        match self.deadline {
            Some(deadline) => deadline.saturating_duration_since(Instant::now()),
            None => Duration::ZERO,
        }
    }
}
