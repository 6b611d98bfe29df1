//! Monthly credential ledger
//!
//! The ledger owns the credential entries for the active calendar month,
//! newest first. The head entry is authoritative for "today" only when its
//! date matches the current calendar day; an older head is ordinary history
//! and is never returned as today's credential.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Zero-based calendar month index, as kept in the stored ledger record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthKey(u32);

impl MonthKey {
    /// Create from a raw 0-11 index
    pub fn new(index: u32) -> Self {
        Self(index % 12)
    }

    /// Derive the month key for a point in time
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self(at.month0())
    }

    /// Raw 0-11 index
    pub fn index(&self) -> u32 {
        self.0
    }

    /// English month name, as recorded in reset actions
    pub fn name(&self) -> &'static str {
        match self.0 {
            0 => "January",
            1 => "February",
            2 => "March",
            3 => "April",
            4 => "May",
            5 => "June",
            6 => "July",
            7 => "August",
            8 => "September",
            9 => "October",
            10 => "November",
            _ => "December",
        }
    }
}

/// How a credential entry came to exist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CredentialOrigin {
    #[default]
    Generated,
    ManuallySet,
}

impl CredentialOrigin {
    /// Used to omit the `manual` flag from stored generated entries
    pub fn is_generated(&self) -> bool {
        matches!(self, CredentialOrigin::Generated)
    }
}

/// The stored `manual` flag maps onto [`CredentialOrigin`]
mod manual_flag {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::CredentialOrigin;

    pub fn serialize<S>(origin: &CredentialOrigin, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bool(matches!(origin, CredentialOrigin::ManuallySet))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<CredentialOrigin, D::Error>
    where
        D: Deserializer<'de>,
    {
        let manual = bool::deserialize(deserializer)?;
        Ok(if manual {
            CredentialOrigin::ManuallySet
        } else {
            CredentialOrigin::Generated
        })
    }
}

/// One credential in the monthly ledger
///
/// Never mutated after creation; removed only by a month reset or by the
/// replace-today flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialEntry {
    /// Creation timestamp
    #[serde(rename = "date")]
    pub created_at: DateTime<Utc>,

    /// The credential string, e.g. `Mega042*`
    #[serde(rename = "password")]
    pub value: String,

    /// Stored as a bare `manual: true` flag, absent for generated entries
    #[serde(
        rename = "manual",
        default,
        with = "manual_flag",
        skip_serializing_if = "CredentialOrigin::is_generated"
    )]
    pub origin: CredentialOrigin,
}

impl CredentialEntry {
    /// Create a new entry
    pub fn new(value: impl Into<String>, created_at: DateTime<Utc>, origin: CredentialOrigin) -> Self {
        Self {
            created_at,
            value: value.into(),
            origin,
        }
    }

    /// Whether the entry was created on the same calendar day as `at`
    pub fn created_on_day_of(&self, at: DateTime<Utc>) -> bool {
        self.created_at.date_naive() == at.date_naive()
    }
}

/// Credential entries for the active calendar month, newest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyLedger {
    #[serde(rename = "month")]
    month_key: MonthKey,

    #[serde(rename = "passwords")]
    entries: Vec<CredentialEntry>,
}

impl MonthlyLedger {
    /// Create an empty ledger for a month
    pub fn new(month_key: MonthKey) -> Self {
        Self {
            month_key,
            entries: Vec::new(),
        }
    }

    /// The month this ledger covers
    pub fn month_key(&self) -> MonthKey {
        self.month_key
    }

    /// Entries, newest first
    pub fn entries(&self) -> &[CredentialEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Detect a month rollover and reset the ledger
    ///
    /// On mismatch the entries are cleared wholesale and the ledger adopts
    /// the new month. Returns whether a reset occurred. Idempotent within a
    /// month: a second call is a no-op returning `false`.
    pub fn reconcile(&mut self, now_month: MonthKey) -> bool {
        if self.month_key == now_month {
            return false;
        }

        self.entries.clear();
        self.month_key = now_month;
        true
    }

    /// Today's credential, if the head entry was created today
    ///
    /// Date-only comparison; time of day is ignored. A stale head from a
    /// previous day yields `None` without mutating the ledger.
    pub fn today(&self, now: DateTime<Utc>) -> Option<&CredentialEntry> {
        let head = self.entries.first()?;
        if head.created_on_day_of(now) {
            Some(head)
        } else {
            None
        }
    }

    /// Prepend a new entry; the caller has already resolved uniqueness
    pub fn record_new(&mut self, entry: CredentialEntry) {
        self.entries.insert(0, entry);
    }

    /// Replace today's entry, or record normally when there is none
    ///
    /// The evicted entry is removed entirely, not retained as history.
    pub fn replace_today(&mut self, entry: CredentialEntry, now: DateTime<Utc>) {
        if self.today(now).is_some() {
            self.entries.remove(0);
        }
        self.record_new(entry);
    }

    /// Whether any entry this month carries `value`
    pub fn contains_value(&self, value: &str) -> bool {
        self.entries.iter().any(|e| e.value == value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn entry(value: &str, created_at: DateTime<Utc>) -> CredentialEntry {
        CredentialEntry::new(value, created_at, CredentialOrigin::Generated)
    }

    #[test]
    fn test_today_matches_calendar_day_only() {
        let mut ledger = MonthlyLedger::new(MonthKey::new(5));
        ledger.record_new(entry("Mega111*", at(2024, 6, 10, 8)));

        // Same day, different time of day
        assert_eq!(
            ledger.today(at(2024, 6, 10, 23)).map(|e| e.value.as_str()),
            Some("Mega111*")
        );

        // Next day: stale head is not today's credential
        assert!(ledger.today(at(2024, 6, 11, 0)).is_none());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_today_empty_ledger() {
        let ledger = MonthlyLedger::new(MonthKey::new(0));
        assert!(ledger.today(at(2024, 1, 1, 12)).is_none());
    }

    #[test]
    fn test_reconcile_same_month_is_noop() {
        let mut ledger = MonthlyLedger::new(MonthKey::new(5));
        ledger.record_new(entry("Mega222*", at(2024, 6, 1, 9)));

        assert!(!ledger.reconcile(MonthKey::new(5)));
        assert_eq!(ledger.len(), 1);

        // Idempotent across repeated calls
        assert!(!ledger.reconcile(MonthKey::new(5)));
    }

    #[test]
    fn test_reconcile_rollover_clears_entries() {
        let mut ledger = MonthlyLedger::new(MonthKey::new(5));
        ledger.record_new(entry("Mega222*", at(2024, 6, 1, 9)));
        ledger.record_new(entry("Mega333*", at(2024, 6, 2, 9)));

        assert!(ledger.reconcile(MonthKey::new(6)));
        assert!(ledger.is_empty());
        assert_eq!(ledger.month_key(), MonthKey::new(6));

        assert!(!ledger.reconcile(MonthKey::new(6)));
    }

    #[test]
    fn test_replace_today_swaps_head() {
        let now = at(2024, 6, 10, 14);
        let mut ledger = MonthlyLedger::new(MonthKey::new(5));
        ledger.record_new(entry("Mega001*", at(2024, 6, 9, 9)));
        ledger.record_new(entry("Mega099*", at(2024, 6, 10, 9)));

        let replacement = CredentialEntry::new("Mega042*", now, CredentialOrigin::ManuallySet);
        ledger.replace_today(replacement, now);

        // Count unchanged, new head, evicted value gone entirely
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.entries()[0].value, "Mega042*");
        assert!(!ledger.contains_value("Mega099*"));
    }

    #[test]
    fn test_replace_today_without_today_entry_prepends() {
        let now = at(2024, 6, 10, 14);
        let mut ledger = MonthlyLedger::new(MonthKey::new(5));
        ledger.record_new(entry("Mega001*", at(2024, 6, 9, 9)));

        let manual = CredentialEntry::new("Mega042*", now, CredentialOrigin::ManuallySet);
        ledger.replace_today(manual, now);

        // Stale entry stays behind as ordinary history
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.entries()[0].value, "Mega042*");
        assert_eq!(ledger.entries()[1].value, "Mega001*");
    }

    #[test]
    fn test_stored_record_shape() {
        let mut ledger = MonthlyLedger::new(MonthKey::new(6));
        ledger.record_new(entry("Mega123*", at(2024, 7, 4, 10)));
        ledger.record_new(CredentialEntry::new(
            "Mega042*",
            at(2024, 7, 5, 10),
            CredentialOrigin::ManuallySet,
        ));

        let json = serde_json::to_value(&ledger).unwrap();
        assert_eq!(json["month"], 6);
        assert_eq!(json["passwords"][0]["password"], "Mega042*");
        assert_eq!(json["passwords"][0]["manual"], true);
        // Generated entries omit the manual flag
        assert!(json["passwords"][1].get("manual").is_none());

        let parsed: MonthlyLedger = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, ledger);
        assert_eq!(parsed.entries()[1].origin, CredentialOrigin::Generated);
    }

    #[test]
    fn test_month_key_name() {
        assert_eq!(MonthKey::new(0).name(), "January");
        assert_eq!(MonthKey::new(11).name(), "December");
        assert_eq!(MonthKey::from_datetime(at(2024, 7, 1, 0)).index(), 6);
    }
}
