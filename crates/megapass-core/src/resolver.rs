//! Uniqueness resolution for credential candidates
//!
//! Generated candidates are redrawn until one is not already present in the
//! month's ledger, with a bounded retry budget. Manual candidates are never
//! rejected outright; conflicts surface as confirmation requests resolved by
//! an explicit caller decision.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::formatter::{self, DigitWidth};
use crate::ledger::{CredentialOrigin, MonthlyLedger};
use crate::random::RandomSource;
use crate::MAX_GENERATION_ATTEMPTS;

/// Why a manual candidate needs an explicit confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmReason {
    /// An entry for today already exists and would be evicted
    ReplaceToday,
    /// The value duplicates an entry recorded earlier this month
    DuplicateValue,
}

/// Resolution of a candidate against the monthly ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accept,
    RejectDuplicate,
    NeedsConfirmation(ConfirmReason),
}

/// Decide whether a candidate is acceptable for the given origin
///
/// Generated duplicates are rejected so the caller can redraw; manual
/// conflicts are turned into confirmation requests. The replace-today check
/// takes precedence over the duplicate check.
pub fn resolve_candidate(
    ledger: &MonthlyLedger,
    candidate: &str,
    origin: CredentialOrigin,
    now: DateTime<Utc>,
) -> Outcome {
    match origin {
        CredentialOrigin::Generated => {
            if ledger.contains_value(candidate) {
                Outcome::RejectDuplicate
            } else {
                Outcome::Accept
            }
        }
        CredentialOrigin::ManuallySet => {
            if ledger.today(now).is_some() {
                Outcome::NeedsConfirmation(ConfirmReason::ReplaceToday)
            } else if ledger.contains_value(candidate) {
                Outcome::NeedsConfirmation(ConfirmReason::DuplicateValue)
            } else {
                Outcome::Accept
            }
        }
    }
}

/// Draw candidates until one is unused this month
///
/// Fails with [`Error::CredentialSpaceExhausted`] instead of looping forever:
/// immediately when the ledger already holds every value of the width's
/// space, otherwise after [`MAX_GENERATION_ATTEMPTS`] rejected draws.
pub fn generate_unique(
    ledger: &MonthlyLedger,
    width: DigitWidth,
    rng: &mut dyn RandomSource,
    now: DateTime<Utc>,
) -> Result<String> {
    if space_exhausted(ledger, width) {
        return Err(Error::CredentialSpaceExhausted {
            digits: width.digits(),
        });
    }

    for _ in 0..MAX_GENERATION_ATTEMPTS {
        let candidate = formatter::format_credential(rng, width);
        if let Outcome::Accept = resolve_candidate(ledger, &candidate, CredentialOrigin::Generated, now)
        {
            return Ok(candidate);
        }
    }

    Err(Error::CredentialSpaceExhausted {
        digits: width.digits(),
    })
}

/// Whether every well-formed value of `width` is already in the ledger
fn space_exhausted(ledger: &MonthlyLedger, width: DigitWidth) -> bool {
    let distinct: HashSet<&str> = ledger
        .entries()
        .iter()
        .map(|e| e.value.as_str())
        .filter(|v| formatter::is_valid_format(v, width))
        .collect();

    distinct.len() as u32 >= width.space()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{CredentialEntry, MonthKey};
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    struct SeededSource(ChaCha8Rng);

    impl SeededSource {
        fn new(seed: u64) -> Self {
            Self(ChaCha8Rng::seed_from_u64(seed))
        }
    }

    impl RandomSource for SeededSource {
        fn next_int(&mut self, bound: u32) -> u32 {
            use rand::Rng;
            self.0.gen_range(0..bound)
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap()
    }

    fn ledger_with(values: &[&str]) -> MonthlyLedger {
        let mut ledger = MonthlyLedger::new(MonthKey::new(5));
        for value in values {
            ledger.record_new(CredentialEntry::new(
                *value,
                now(),
                CredentialOrigin::Generated,
            ));
        }
        ledger
    }

    #[test]
    fn test_generated_duplicate_rejected() {
        let ledger = ledger_with(&["Mega042*"]);

        assert_eq!(
            resolve_candidate(&ledger, "Mega042*", CredentialOrigin::Generated, now()),
            Outcome::RejectDuplicate
        );
        assert_eq!(
            resolve_candidate(&ledger, "Mega043*", CredentialOrigin::Generated, now()),
            Outcome::Accept
        );
    }

    #[test]
    fn test_manual_replace_today_takes_precedence() {
        // Head entry is from today, and the candidate also duplicates it
        let ledger = ledger_with(&["Mega042*"]);

        assert_eq!(
            resolve_candidate(&ledger, "Mega042*", CredentialOrigin::ManuallySet, now()),
            Outcome::NeedsConfirmation(ConfirmReason::ReplaceToday)
        );
    }

    #[test]
    fn test_manual_duplicate_without_today_entry() {
        let mut ledger = MonthlyLedger::new(MonthKey::new(5));
        ledger.record_new(CredentialEntry::new(
            "Mega042*",
            Utc.with_ymd_and_hms(2024, 6, 9, 12, 0, 0).unwrap(),
            CredentialOrigin::Generated,
        ));

        assert_eq!(
            resolve_candidate(&ledger, "Mega042*", CredentialOrigin::ManuallySet, now()),
            Outcome::NeedsConfirmation(ConfirmReason::DuplicateValue)
        );
        assert_eq!(
            resolve_candidate(&ledger, "Mega777*", CredentialOrigin::ManuallySet, now()),
            Outcome::Accept
        );
    }

    #[test]
    fn test_generate_unique_avoids_existing() {
        let ledger = ledger_with(&["Mega001*", "Mega002*", "Mega003*"]);
        let mut rng = SeededSource::new(7);

        for _ in 0..100 {
            let value = generate_unique(&ledger, DigitWidth::Three, &mut rng, now()).unwrap();
            assert!(!ledger.contains_value(&value));
            assert!(formatter::is_valid_format(&value, DigitWidth::Three));
        }
    }

    #[test]
    fn test_exhausted_space_fails_fast() {
        let mut ledger = MonthlyLedger::new(MonthKey::new(5));
        for n in 0..1000 {
            ledger.record_new(CredentialEntry::new(
                format!("Mega{:03}*", n),
                now(),
                CredentialOrigin::Generated,
            ));
        }

        let mut rng = SeededSource::new(7);
        let err = generate_unique(&ledger, DigitWidth::Three, &mut rng, now()).unwrap_err();
        assert!(matches!(err, Error::CredentialSpaceExhausted { digits: 3 }));

        // The four-digit space is still open
        let value = generate_unique(&ledger, DigitWidth::Four, &mut rng, now()).unwrap();
        assert!(formatter::is_valid_format(&value, DigitWidth::Four));
    }

    struct CyclingSource(u32);

    impl RandomSource for CyclingSource {
        fn next_int(&mut self, bound: u32) -> u32 {
            let value = self.0 % bound;
            self.0 = self.0.wrapping_add(1);
            value
        }
    }

    #[test]
    fn test_near_exhausted_space_finds_last_value() {
        // Every value but one is taken; the loop must still find it
        let mut ledger = MonthlyLedger::new(MonthKey::new(5));
        for n in 0..1000 {
            if n == 512 {
                continue;
            }
            ledger.record_new(CredentialEntry::new(
                format!("Mega{:03}*", n),
                now(),
                CredentialOrigin::Generated,
            ));
        }

        let mut rng = CyclingSource(0);
        let value = generate_unique(&ledger, DigitWidth::Three, &mut rng, now()).unwrap();
        assert_eq!(value, "Mega512*");
    }
}
