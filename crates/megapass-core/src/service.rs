//! Credential service
//!
//! The session object owning the ledger, action log, and preferences.
//! Every user intent enters here, is validated and applied, recorded in the
//! action log, and handed to the persistence gateway. There are no
//! module-level globals; a process holds exactly one service per store.

use chrono::{DateTime, Datelike, Utc};
use tracing::warn;

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::formatter::{self, DigitWidth};
use crate::ledger::{CredentialEntry, CredentialOrigin, MonthKey, MonthlyLedger};
use crate::log::{Action, ActionLog};
use crate::prefs::{Preferences, Theme};
use crate::random::RandomSource;
use crate::resolver::{self, ConfirmReason, Outcome};
use crate::reveal::RevealTimer;

/// Durable load/save of the ledger, log, and preferences
///
/// `load_*` returns `Ok(None)` for an absent record and `Err` for an
/// unreadable one; the service discards unreadable records and
/// reinitializes rather than surfacing a crash.
pub trait PersistenceGateway {
    fn load_ledger(&self) -> Result<Option<MonthlyLedger>>;
    fn save_ledger(&self, ledger: &MonthlyLedger) -> Result<()>;

    fn load_log(&self) -> Result<Option<ActionLog>>;
    fn save_log(&self, log: &ActionLog) -> Result<()>;

    fn load_prefs(&self) -> Result<Option<Preferences>>;
    fn save_prefs(&self, prefs: &Preferences) -> Result<()>;
}

/// Result of a manual-set request
#[derive(Debug, Clone, PartialEq)]
pub enum SetManualOutcome {
    /// The credential was recorded
    Applied(CredentialEntry),
    /// The caller must confirm before anything changes
    NeedsConfirmation(ConfirmReason),
}

/// The core session object
pub struct CredentialService<G, C, R> {
    gateway: G,
    clock: C,
    rng: R,
    ledger: MonthlyLedger,
    log: ActionLog,
    prefs: Preferences,
    reveal: RevealTimer,
}

impl<G, C, R> CredentialService<G, C, R>
where
    G: PersistenceGateway,
    C: Clock,
    R: RandomSource,
{
    /// Load persisted state and reconcile the month
    ///
    /// Unreadable records are discarded and reinitialized; a discarded
    /// ledger is treated like a month rollover and recorded as a reset.
    pub fn open(gateway: G, clock: C, rng: R) -> Result<Self> {
        let now = clock.now();
        let month = MonthKey::from_datetime(now);

        let prefs = match gateway.load_prefs() {
            Ok(Some(prefs)) => prefs,
            Ok(None) => Preferences::default(),
            Err(e) => {
                warn!("Discarding unreadable preferences: {}", e);
                Preferences::default()
            }
        };

        let log = match gateway.load_log() {
            Ok(Some(log)) => log,
            Ok(None) => ActionLog::new(),
            Err(e) => {
                warn!("Discarding unreadable action log: {}", e);
                ActionLog::new()
            }
        };

        let (ledger, discarded) = match gateway.load_ledger() {
            Ok(Some(ledger)) => (ledger, false),
            Ok(None) => (MonthlyLedger::new(month), false),
            Err(e) => {
                warn!("Discarding unreadable ledger: {}", e);
                (MonthlyLedger::new(month), true)
            }
        };

        let mut service = Self {
            gateway,
            clock,
            rng,
            ledger,
            log,
            prefs,
            reveal: RevealTimer::new(),
        };

        let rolled_over = service.ledger.reconcile(month);
        if rolled_over || discarded {
            service.append_reset(now);
            service.persist()?;
        }

        Ok(service)
    }

    /// Generate a fresh unique credential for today
    ///
    /// Always produces a new entry, even when today already has one; the
    /// previous entry stays behind as history.
    pub fn generate(&mut self) -> Result<CredentialEntry> {
        let now = self.clock.now();
        self.reconcile_at(now)?;

        let value = resolver::generate_unique(
            &self.ledger,
            self.prefs.digit_width,
            &mut self.rng,
            now,
        )?;

        let entry = CredentialEntry::new(value.clone(), now, CredentialOrigin::Generated);
        self.ledger.record_new(entry.clone());
        self.log.append(
            now,
            Action::Generate {
                password: value,
                is_automatic: true,
            },
        );
        self.persist()?;

        Ok(entry)
    }

    /// Today's credential, if one was recorded today
    pub fn today(&self) -> Option<&CredentialEntry> {
        self.ledger.today(self.clock.now())
    }

    /// Request a manual credential
    ///
    /// Validates the format against the active digit preference, then
    /// resolves conflicts. A conflicting candidate changes nothing until
    /// the caller confirms via [`confirm_manual`](Self::confirm_manual);
    /// declining is simply not calling it.
    pub fn set_manual(&mut self, candidate: &str) -> Result<SetManualOutcome> {
        let candidate = candidate.trim();
        self.check_format(candidate)?;

        let now = self.clock.now();
        self.reconcile_at(now)?;

        match resolver::resolve_candidate(
            &self.ledger,
            candidate,
            CredentialOrigin::ManuallySet,
            now,
        ) {
            Outcome::Accept => {
                let entry = self.commit_manual(candidate, now)?;
                Ok(SetManualOutcome::Applied(entry))
            }
            Outcome::NeedsConfirmation(reason) => Ok(SetManualOutcome::NeedsConfirmation(reason)),
            Outcome::RejectDuplicate => Ok(SetManualOutcome::NeedsConfirmation(
                ConfirmReason::DuplicateValue,
            )),
        }
    }

    /// Apply a manual credential after the caller's explicit confirmation
    ///
    /// Evicts today's existing entry when there is one, then records the
    /// manual entry.
    pub fn confirm_manual(&mut self, candidate: &str) -> Result<CredentialEntry> {
        let candidate = candidate.trim();
        self.check_format(candidate)?;

        let now = self.clock.now();
        self.reconcile_at(now)?;
        self.commit_manual(candidate, now)
    }

    /// Hand out today's credential for the clipboard and record the copy
    ///
    /// The actual clipboard write is the presentation layer's fire-and-forget
    /// concern; its failure never rolls back the recorded action.
    pub fn copy_today(&mut self) -> Result<String> {
        let now = self.clock.now();
        let value = self
            .ledger
            .today(now)
            .ok_or(Error::NoCredentialToday)?
            .value
            .clone();

        self.log.append(
            now,
            Action::Copy {
                password: value.clone(),
            },
        );
        self.gateway.save_log(&self.log)?;

        Ok(value)
    }

    /// Reveal today's credential, arming the auto-hide timer
    pub fn reveal_today(&mut self) -> Result<String> {
        let now = self.clock.now();
        let value = self
            .ledger
            .today(now)
            .ok_or(Error::NoCredentialToday)?
            .value
            .clone();

        self.reveal.reveal();
        self.log.append(
            now,
            Action::ShowPassword {
                password: value.clone(),
            },
        );
        self.gateway.save_log(&self.log)?;

        Ok(value)
    }

    /// Hide a revealed credential before the timer fires
    pub fn hide(&mut self) {
        self.reveal.cancel();
    }

    /// Whether a revealed credential is still visible
    pub fn is_revealed(&self) -> bool {
        self.reveal.is_visible()
    }

    /// Switch the color theme
    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        self.prefs.theme = theme;
        self.gateway.save_prefs(&self.prefs)?;

        let now = self.clock.now();
        self.log.append(now, Action::ThemeChange { theme });
        self.gateway.save_log(&self.log)
    }

    /// Switch the credential digit width
    pub fn set_digit_width(&mut self, width: DigitWidth) -> Result<()> {
        self.prefs.digit_width = width;
        self.gateway.save_prefs(&self.prefs)?;

        let now = self.clock.now();
        self.log.append(now, Action::DigitChange { format: width });
        self.gateway.save_log(&self.log)
    }

    /// Update the network name embedded in join codes
    pub fn set_network_name(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::EmptyNetworkName);
        }

        self.prefs.network_name = name.to_string();
        self.gateway.save_prefs(&self.prefs)?;

        let now = self.clock.now();
        self.log.append(
            now,
            Action::SsidChange {
                ssid: name.to_string(),
            },
        );
        self.gateway.save_log(&self.log)
    }

    pub fn ledger(&self) -> &MonthlyLedger {
        &self.ledger
    }

    pub fn log(&self) -> &ActionLog {
        &self.log
    }

    pub fn prefs(&self) -> &Preferences {
        &self.prefs
    }

    pub fn network_name(&self) -> &str {
        &self.prefs.network_name
    }

    fn check_format(&self, candidate: &str) -> Result<()> {
        let width = self.prefs.digit_width;
        if formatter::is_valid_format(candidate, width) {
            Ok(())
        } else {
            Err(Error::InvalidFormat {
                expected: width.digits(),
            })
        }
    }

    fn commit_manual(&mut self, candidate: &str, now: DateTime<Utc>) -> Result<CredentialEntry> {
        let entry = CredentialEntry::new(candidate, now, CredentialOrigin::ManuallySet);
        self.ledger.replace_today(entry.clone(), now);
        self.log.append(
            now,
            Action::Manual {
                password: candidate.to_string(),
            },
        );
        self.persist()?;

        Ok(entry)
    }

    /// Reset the ledger if the month rolled over mid-session
    fn reconcile_at(&mut self, now: DateTime<Utc>) -> Result<()> {
        let month = MonthKey::from_datetime(now);
        if self.ledger.reconcile(month) {
            self.append_reset(now);
            self.persist()?;
        }
        Ok(())
    }

    fn append_reset(&mut self, now: DateTime<Utc>) {
        let month = MonthKey::from_datetime(now);
        self.log.append(
            now,
            Action::Reset {
                message: "Monthly password history reset".to_string(),
                month: month.name().to_string(),
                year: now.year(),
            },
        );
    }

    fn persist(&self) -> Result<()> {
        self.gateway.save_ledger(&self.ledger)?;
        self.gateway.save_log(&self.log)
    }
}
