//! Shift-tracking session: the ledger plus its collaborators.
//!
//! [`Tracker`] owns the [`Ledger`] for one driver session and wires it to a
//! persistence collaborator ([`LedgerStore`]) and a notification collaborator
//! ([`Notifier`]).
//!
//! # Persistence
//!
//! Every mutation is applied in memory first, then saved. A failed save is
//! returned to the caller but never rolls back the in-memory change; the
//! caller can show the error and call [`Tracker::retry_persist`] later.

use std::convert::Infallible;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};

use crate::activity::ActivityType;
use crate::allowance::{AllowanceError, ExtensionAllowance};
use crate::engine::{self, Advisory, DaySummary, DriveLimits, Snapshot};
use crate::ledger::{Ledger, StoredLedger};
use crate::types::ActivityEvent;

/// Loads and saves the ledger.
pub trait LedgerStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Rehydrates the ledger. Corrupt records should be dropped, not fail the load.
    fn load(&self) -> Result<Ledger, Self::Error>;

    /// Persists the whole ledger.
    fn save(&mut self, ledger: &Ledger) -> Result<(), Self::Error>;

    /// Days on which extended driving was used, if this store records them.
    ///
    /// `None` means the store does not track them and the session keeps its own.
    fn load_extension_days(&self) -> Result<Option<Vec<NaiveDate>>, Self::Error> {
        Ok(None)
    }
}

/// Receives advisory messages. Fire-and-forget.
pub trait Notifier {
    fn notify(&self, message: &str);
}

impl<F: Fn(&str)> Notifier for F {
    fn notify(&self, message: &str) {
        self(message);
    }
}

/// Anything that can switch the driver's activity.
///
/// Manual starts and accepted suggestions both go through this.
pub trait ActivitySwitch {
    type Error;

    fn switch_to(&mut self, activity: ActivityType, now: DateTime<Utc>) -> Result<(), Self::Error>;
}

impl ActivitySwitch for Ledger {
    type Error = Infallible;

    fn switch_to(&mut self, activity: ActivityType, now: DateTime<Utc>) -> Result<(), Infallible> {
        self.start(activity, now);
        Ok(())
    }
}

/// In-memory store holding the serialized form.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    stored: StoredLedger,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn with_stored(stored: StoredLedger) -> Self {
        Self { stored, saves: 0 }
    }

    pub const fn stored(&self) -> &StoredLedger {
        &self.stored
    }

    /// Number of successful saves.
    pub const fn saves(&self) -> usize {
        self.saves
    }
}

impl LedgerStore for MemoryStore {
    type Error = Infallible;

    fn load(&self) -> Result<Ledger, Infallible> {
        let (ledger, discarded) = Ledger::rehydrate(self.stored.clone());
        if discarded > 0 {
            tracing::warn!(discarded, "dropped corrupt records while loading ledger");
        }
        Ok(ledger)
    }

    fn save(&mut self, ledger: &Ledger) -> Result<(), Infallible> {
        self.stored = ledger.to_stored();
        self.saves += 1;
        Ok(())
    }
}

/// One driver session.
pub struct Tracker<S, N, Tz: TimeZone = Local> {
    ledger: Ledger,
    store: S,
    notifier: N,
    tz: Tz,
    limits: DriveLimits,
    allowance: ExtensionAllowance,
    unsaved: bool,
}

impl<S: LedgerStore, N: Notifier, Tz: TimeZone> Tracker<S, N, Tz> {
    /// Opens a session, rehydrating the ledger from `store`.
    ///
    /// `tz` decides where "today" starts.
    pub fn open(store: S, notifier: N, tz: Tz) -> Result<Self, S::Error> {
        let ledger = store.load()?;
        tracing::debug!(
            events = ledger.events().len(),
            running = ledger.current().is_some(),
            "ledger loaded"
        );
        Ok(Self {
            ledger,
            store,
            notifier,
            tz,
            limits: DriveLimits::default(),
            allowance: ExtensionAllowance::default(),
            unsaved: false,
        })
    }

    #[must_use]
    pub const fn with_limits(mut self, limits: DriveLimits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use]
    pub fn with_allowance(mut self, allowance: ExtensionAllowance) -> Self {
        self.allowance = allowance;
        self
    }

    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Direct access to the store, for data the ledger does not own.
    pub const fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub const fn limits(&self) -> &DriveLimits {
        &self.limits
    }

    pub const fn allowance(&self) -> &ExtensionAllowance {
        &self.allowance
    }

    pub const fn tz(&self) -> &Tz {
        &self.tz
    }

    /// True when the last save failed and the store is behind memory.
    pub const fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    /// Starts `activity`, closing whatever was running.
    pub fn start(
        &mut self,
        activity: ActivityType,
        now: DateTime<Utc>,
    ) -> Result<Option<ActivityEvent>, S::Error> {
        let closed = self.ledger.start(activity, now);
        self.persist()?;
        Ok(closed)
    }

    /// Stops the running activity and re-evaluates the limits.
    ///
    /// Idle sessions are left untouched: nothing is saved or evaluated.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Result<Option<ActivityEvent>, S::Error> {
        let Some(closed) = self.ledger.stop(now) else {
            return Ok(None);
        };
        self.evaluate(now);
        self.persist()?;
        Ok(Some(closed))
    }

    /// Drops the whole history. Irreversible.
    pub fn clear(&mut self) -> Result<(), S::Error> {
        self.ledger.clear();
        self.persist()
    }

    /// Replaces the whole ledger with a serialized one.
    ///
    /// Corrupt records are dropped; returns how many.
    pub fn replace(&mut self, stored: StoredLedger) -> Result<usize, S::Error> {
        let (ledger, discarded) = Ledger::rehydrate(stored);
        self.ledger = ledger;
        self.persist()?;
        Ok(discarded)
    }

    /// Periodic re-evaluation; advisories are also sent to the notifier.
    pub fn tick(&self, now: DateTime<Utc>) -> Vec<Advisory> {
        self.evaluate(now)
    }

    /// Advisories that apply at `now`, without notifying.
    pub fn advisories(&self, now: DateTime<Utc>) -> Vec<Advisory> {
        engine::evaluate_thresholds(&self.ledger, &self.limits, &self.allowance, now, &self.tz)
    }

    pub fn summary(&self, now: DateTime<Utc>) -> DaySummary {
        engine::summarize(&self.ledger, now, &self.tz)
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> Snapshot {
        engine::snapshot(&self.ledger, now, &self.tz)
    }

    /// Local calendar day of `now`.
    pub fn local_day(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.tz).date_naive()
    }

    /// Consumes today's extended-driving allowance.
    ///
    /// Returns the day that was marked. Persisting the day is up to the caller.
    pub fn extend_today(&mut self, now: DateTime<Utc>) -> Result<NaiveDate, AllowanceError> {
        let today = self.local_day(now);
        self.allowance.consume(today)?;
        Ok(today)
    }

    /// Replaces the in-memory ledger with the stored one.
    ///
    /// Unsaved changes are discarded. Extension days are refreshed too when
    /// the store records them.
    pub fn reload(&mut self) -> Result<(), S::Error> {
        self.ledger = self.store.load()?;
        self.unsaved = false;
        if let Some(days) = self.store.load_extension_days()? {
            self.allowance =
                ExtensionAllowance::new(self.allowance.weekly_quota()).with_used_days(days);
        }
        Ok(())
    }

    /// Saves again after a failed save. No-op when nothing is pending.
    pub fn retry_persist(&mut self) -> Result<(), S::Error> {
        if self.unsaved {
            self.persist()?;
        }
        Ok(())
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn evaluate(&self, now: DateTime<Utc>) -> Vec<Advisory> {
        let advisories = self.advisories(now);
        for advisory in &advisories {
            self.notifier.notify(&advisory.message());
        }
        advisories
    }

    fn persist(&mut self) -> Result<(), S::Error> {
        match self.store.save(&self.ledger) {
            Ok(()) => {
                self.unsaved = false;
                Ok(())
            }
            Err(err) => {
                self.unsaved = true;
                tracing::warn!(error = %err, "failed to save ledger, keeping in-memory state");
                Err(err)
            }
        }
    }
}

impl<S: LedgerStore, N: Notifier, Tz: TimeZone> ActivitySwitch for Tracker<S, N, Tz> {
    type Error = S::Error;

    fn switch_to(&mut self, activity: ActivityType, now: DateTime<Utc>) -> Result<(), S::Error> {
        self.start(activity, now).map(|_| ())
    }
}
