//! Core type definitions with validation.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::activity::ActivityType;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// An interval ended before it started.
    #[error("interval ends at {end} before it starts at {start}")]
    InvertedInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// The confidence value was out of range.
    #[error("confidence must be between 0.0 and 1.0, got {value}")]
    ConfidenceOutOfRange { value: f32 },
}

/// A closed activity interval.
///
/// Immutable once built; `end >= start` is guaranteed by [`ActivityEvent::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityEvent {
    activity: ActivityType,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl ActivityEvent {
    /// Creates a closed interval, rejecting `end < start`.
    pub fn new(
        activity: ActivityType,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if end < start {
            return Err(ValidationError::InvertedInterval { start, end });
        }
        Ok(Self {
            activity,
            start,
            end,
        })
    }

    /// Closes an open interval at `now`.
    ///
    /// A clock that moved backwards is clamped to the start so the interval
    /// is never inverted.
    pub fn closing(open: CurrentActivity, now: DateTime<Utc>) -> Self {
        Self {
            activity: open.activity,
            start: open.started_at,
            end: now.max(open.started_at),
        }
    }

    pub const fn activity(&self) -> ActivityType {
        self.activity
    }

    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Full length of the interval.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Length of the intersection with `[window_start, window_end]`, never negative.
    pub fn overlap(&self, window_start: DateTime<Utc>, window_end: DateTime<Utc>) -> Duration {
        let start = self.start.max(window_start);
        let end = self.end.min(window_end);
        if end > start {
            end - start
        } else {
            Duration::zero()
        }
    }
}

/// The single open interval: "doing `activity` since `started_at`".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentActivity {
    pub activity: ActivityType,
    pub started_at: DateTime<Utc>,
}

impl CurrentActivity {
    /// Time accrued up to `now`; zero if `now` precedes the start.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        (now - self.started_at).max(Duration::zero())
    }
}

/// A confidence score in the range \[0.0, 1.0\].
///
/// Used for classifier output. Values are clamped during deserialization.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Confidence(f32);

impl Confidence {
    /// The maximum confidence value (1.0).
    pub const MAX: Self = Self(1.0);

    /// The minimum confidence value (0.0).
    pub const MIN: Self = Self(0.0);

    /// Creates a new confidence value after validation.
    ///
    /// Returns an error if the value is outside \[0.0, 1.0\] or is NaN.
    pub fn new(value: f32) -> Result<Self, ValidationError> {
        if value.is_nan() || !(0.0..=1.0).contains(&value) {
            return Err(ValidationError::ConfidenceOutOfRange { value });
        }
        Ok(Self(value))
    }

    /// Creates a confidence value, clamping to \[0.0, 1.0\].
    ///
    /// NaN values become 0.0.
    #[must_use]
    pub const fn clamped(value: f32) -> Self {
        if value.is_nan() || value < 0.0 {
            Self(0.0)
        } else if value > 1.0 {
            Self(1.0)
        } else {
            Self(value)
        }
    }

    #[must_use]
    pub const fn value(self) -> f32 {
        self.0
    }

    /// Whole-number percentage, for display.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "value is clamped to [0.0, 1.0] so the percentage fits in u8"
    )]
    pub fn percent(self) -> u8 {
        (self.0 * 100.0).round() as u8
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl TryFrom<f32> for Confidence {
    type Error = ValidationError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Confidence> for f32 {
    fn from(c: Confidence) -> Self {
        c.0
    }
}

impl Serialize for Confidence {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Confidence {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = f32::deserialize(deserializer)?;
        Ok(Self::clamped(value))
    }
}
