//! Append-only action log
//!
//! Records every state-changing operation plus selected settings changes,
//! newest first. The log is independent of the ledger: a month rollover
//! clears the ledger but the log survives and records the reset itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::formatter::DigitWidth;
use crate::prefs::Theme;

/// A recorded user or system action
///
/// Stored as `{"type": ..., "details": {...}}` inside each log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details", rename_all = "snake_case")]
pub enum Action {
    /// A credential was generated
    Generate { password: String, is_automatic: bool },

    /// A credential was set by hand
    Manual { password: String },

    /// The current credential was copied out
    Copy { password: String },

    /// Color theme switched
    ThemeChange { theme: Theme },

    /// Digit-width preference switched
    DigitChange { format: DigitWidth },

    /// Network name updated
    SsidChange { ssid: String },

    /// Ledger reset for a new month (or after an unreadable record)
    Reset {
        message: String,
        month: String,
        year: i32,
    },

    /// The credential was revealed on screen
    ShowPassword { password: String },
}

/// One entry in the action log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionLogEntry {
    pub timestamp: DateTime<Utc>,

    #[serde(flatten)]
    pub action: Action,
}

/// Ordered action history, newest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionLog {
    entries: Vec<ActionLogEntry>,
}

impl ActionLog {
    /// Retention cap; the oldest entries are dropped once it is reached
    pub const MAX_ENTRIES: usize = 1000;

    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append an action at the head; always succeeds
    pub fn append(&mut self, timestamp: DateTime<Utc>, action: Action) {
        self.entries.insert(0, ActionLogEntry { timestamp, action });
        self.entries.truncate(Self::MAX_ENTRIES);
    }

    /// Entries, newest first
    pub fn entries(&self) -> &[ActionLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent entry
    pub fn latest(&self) -> Option<&ActionLogEntry> {
        self.entries.first()
    }
}
