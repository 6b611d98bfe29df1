//! Clock collaborator

use chrono::{DateTime, Utc};

/// Source of the current wall-clock time
///
/// The core only ever derives calendar-day and calendar-month granularity
/// from it.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// System wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
