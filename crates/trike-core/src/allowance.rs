//! Extended-driving allowance.
//!
//! A driver may extend the daily driving limit on a small number of days per
//! week (Monday-based ISO weeks). This module only tracks which local calendar
//! days have consumed an extension; deciding when to offer one is the job of
//! [`crate::engine::evaluate_thresholds`].

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate};
use thiserror::Error;

/// Default number of extended driving days per week.
pub const DEFAULT_WEEKLY_EXTENSIONS: u8 = 2;

/// Errors when consuming an extension.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AllowanceError {
    /// An extension was already consumed for this day.
    #[error("extended driving already used on {day}")]
    AlreadyUsed { day: NaiveDate },
    /// The weekly quota is spent.
    #[error("all {quota} extended driving days for the week of {week_start} are used")]
    QuotaExhausted { week_start: NaiveDate, quota: u8 },
}

/// Days on which the extended-driving allowance was consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionAllowance {
    weekly_quota: u8,
    used: BTreeSet<NaiveDate>,
}

impl Default for ExtensionAllowance {
    fn default() -> Self {
        Self::new(DEFAULT_WEEKLY_EXTENSIONS)
    }
}

impl ExtensionAllowance {
    pub const fn new(weekly_quota: u8) -> Self {
        Self {
            weekly_quota,
            used: BTreeSet::new(),
        }
    }

    /// Seeds the allowance with previously consumed days.
    #[must_use]
    pub fn with_used_days(mut self, days: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.used.extend(days);
        self
    }

    pub const fn weekly_quota(&self) -> u8 {
        self.weekly_quota
    }

    pub fn used_days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.used.iter().copied()
    }

    pub fn is_used_on(&self, day: NaiveDate) -> bool {
        self.used.contains(&day)
    }

    /// Extensions consumed in the ISO week containing `day`.
    pub fn used_in_week(&self, day: NaiveDate) -> u8 {
        let week = day.iso_week();
        let count = self
            .used
            .iter()
            .filter(|used| used.iso_week() == week)
            .count();
        u8::try_from(count).unwrap_or(u8::MAX)
    }

    /// Extensions still available in the ISO week containing `day`.
    pub fn remaining_in_week(&self, day: NaiveDate) -> u8 {
        self.weekly_quota.saturating_sub(self.used_in_week(day))
    }

    /// True when `day` has not used an extension and the week has one left.
    pub fn is_available(&self, day: NaiveDate) -> bool {
        !self.is_used_on(day) && self.remaining_in_week(day) > 0
    }

    /// Marks `day` as an extended driving day.
    pub fn consume(&mut self, day: NaiveDate) -> Result<(), AllowanceError> {
        if self.is_used_on(day) {
            return Err(AllowanceError::AlreadyUsed { day });
        }
        if self.remaining_in_week(day) == 0 {
            return Err(AllowanceError::QuotaExhausted {
                week_start: week_start(day),
                quota: self.weekly_quota,
            });
        }
        self.used.insert(day);
        tracing::debug!(%day, remaining = self.remaining_in_week(day), "extension consumed");
        Ok(())
    }
}

fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.weekday().num_days_from_monday()))
}
