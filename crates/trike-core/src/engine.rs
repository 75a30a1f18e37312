//! Duration queries and driving-limit rules over a [`Ledger`].
//!
//! # Windows
//!
//! [`duration_in_window`] sums, for each closed interval of the requested
//! type, its overlap with `[window_start, now]`. An open interval of that type
//! accrues up to `now`, but only when it started inside the window.
//!
//! The "today" helpers use the local calendar day of `now` in the caller's
//! time zone. The boundary is recomputed on every call because `now` moves.
//!
//! # Continuity
//!
//! [`continuous_drive`] walks the ledger backwards from the newest interval,
//! summing driving until the first activity whose [`Continuity`] is
//! [`Continuity::Breaks`].

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};

use crate::activity::{ActivityType, Continuity};
use crate::allowance::ExtensionAllowance;
use crate::ledger::Ledger;

/// Thresholds for driving advisories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriveLimits {
    /// Continuous driving after which a break is advised.
    /// Default: 4h 30m.
    pub continuous_drive: Duration,

    /// Daily driving above which an extended day may be used.
    /// Default: 9h.
    pub daily_drive: Duration,

    /// Break length quoted in the break advisory.
    /// Default: 45m.
    pub required_break: Duration,
}

impl Default for DriveLimits {
    fn default() -> Self {
        Self {
            continuous_drive: Duration::minutes(270),
            daily_drive: Duration::hours(9),
            required_break: Duration::minutes(45),
        }
    }
}

/// A non-blocking recommendation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    /// Continuous driving reached the limit.
    BreakNeeded {
        continuous_drive: Duration,
        required_break: Duration,
    },
    /// Daily driving exceeded the limit and an extension is still available.
    ExtendedHoursAvailable {
        driven_today: Duration,
        daily_limit: Duration,
        remaining_this_week: u8,
    },
}

impl Advisory {
    /// Stable identifier for machine-readable output.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::BreakNeeded { .. } => "break_needed",
            Self::ExtendedHoursAvailable { .. } => "extended_hours_available",
        }
    }

    /// Message handed to the notification collaborator.
    pub fn message(&self) -> String {
        match self {
            Self::BreakNeeded {
                continuous_drive,
                required_break,
            } => format!(
                "Break needed: {} of continuous driving, take {}",
                format_duration(*continuous_drive),
                format_duration(*required_break)
            ),
            Self::ExtendedHoursAvailable {
                driven_today,
                daily_limit,
                remaining_this_week,
            } => format!(
                "Driven {} today, over the {} limit: an extended driving day is available ({} left this week)",
                format_duration(*driven_today),
                format_duration(*daily_limit),
                remaining_this_week
            ),
        }
    }
}

/// Aggregates shown for the current day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySummary {
    pub drive: Duration,
    pub other_work: Duration,
    /// Driving plus other work.
    pub work: Duration,
    pub continuous_drive: Duration,
}

/// Engine state handed to the suggestion classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    /// Time spent in the open activity; zero when idle.
    pub elapsed_in_current: Duration,
    pub continuous_drive: Duration,
    /// Local hour of day, 0..=23.
    pub hour: u8,
    /// The open activity, or the most recently closed one when idle.
    pub last_type: Option<ActivityType>,
    /// Whether `last_type` is still running.
    pub running: bool,
}

/// Time spent in `activity` between `window_start` and `now`.
pub fn duration_in_window(
    ledger: &Ledger,
    activity: ActivityType,
    window_start: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Duration {
    let closed = ledger
        .events()
        .iter()
        .filter(|event| event.activity() == activity)
        .fold(Duration::zero(), |sum, event| {
            sum + event.overlap(window_start, now)
        });

    let open = ledger
        .current()
        .filter(|current| current.activity == activity && current.started_at >= window_start)
        .map_or_else(Duration::zero, |current| current.elapsed(now));

    closed + open
}

/// Local midnight of `now`'s calendar day in `tz`, as a UTC instant.
pub fn day_start<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> DateTime<Utc> {
    local_midnight(now.with_timezone(tz).date_naive(), tz)
}

/// Converts a local date at midnight to UTC.
/// Handles DST ambiguity by picking the earlier time.
fn local_midnight<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => {
            // Midnight skipped by a DST jump; 1am local exists.
            let one_am = midnight + Duration::hours(1);
            tz.from_local_datetime(&one_am)
                .earliest()
                .map_or_else(|| one_am.and_utc(), |dt| dt.with_timezone(&Utc))
        }
    }
}

/// Time spent in `activity` since local midnight.
pub fn duration_today<Tz: TimeZone>(
    ledger: &Ledger,
    activity: ActivityType,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Duration {
    duration_in_window(ledger, activity, day_start(now, tz), now)
}

/// Uninterrupted driving since the last break, rest, or other work.
pub fn continuous_drive(ledger: &Ledger, now: DateTime<Utc>) -> Duration {
    let mut total = Duration::zero();

    if let Some(current) = ledger.current() {
        match current.activity.continuity() {
            Continuity::Extends => total += current.elapsed(now),
            Continuity::Breaks => return Duration::zero(),
            Continuity::Neutral => {}
        }
    }

    for event in ledger.events().iter().rev() {
        match event.activity().continuity() {
            Continuity::Extends => total += event.duration(),
            Continuity::Breaks => break,
            Continuity::Neutral => {}
        }
    }

    total
}

/// Driving, other work, total work, and continuous driving for today.
pub fn summarize<Tz: TimeZone>(ledger: &Ledger, now: DateTime<Utc>, tz: &Tz) -> DaySummary {
    let since = day_start(now, tz);
    let drive = duration_in_window(ledger, ActivityType::Drive, since, now);
    let other_work = duration_in_window(ledger, ActivityType::OtherWork, since, now);
    DaySummary {
        drive,
        other_work,
        work: drive + other_work,
        continuous_drive: continuous_drive(ledger, now),
    }
}

/// Checks the driving limits and returns the advisories that apply at `now`.
pub fn evaluate_thresholds<Tz: TimeZone>(
    ledger: &Ledger,
    limits: &DriveLimits,
    allowance: &ExtensionAllowance,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Vec<Advisory> {
    let mut advisories = Vec::new();

    let continuous = continuous_drive(ledger, now);
    if continuous >= limits.continuous_drive {
        advisories.push(Advisory::BreakNeeded {
            continuous_drive: continuous,
            required_break: limits.required_break,
        });
    }

    let today = now.with_timezone(tz).date_naive();
    let driven_today = duration_today(ledger, ActivityType::Drive, now, tz);
    if driven_today > limits.daily_drive && allowance.is_available(today) {
        advisories.push(Advisory::ExtendedHoursAvailable {
            driven_today,
            daily_limit: limits.daily_drive,
            remaining_this_week: allowance.remaining_in_week(today),
        });
    }

    advisories
}

/// Captures the features the suggestion classifier looks at.
pub fn snapshot<Tz: TimeZone>(ledger: &Ledger, now: DateTime<Utc>, tz: &Tz) -> Snapshot {
    let hour = u8::try_from(now.with_timezone(tz).hour()).unwrap_or_default();
    let (last_type, elapsed_in_current, running) = match ledger.current() {
        Some(current) => (Some(current.activity), current.elapsed(now), true),
        None => (
            ledger.events().last().map(|event| event.activity()),
            Duration::zero(),
            false,
        ),
    };
    Snapshot {
        elapsed_in_current,
        continuous_drive: continuous_drive(ledger, now),
        hour,
        last_type,
        running,
    }
}

/// Formats a duration as "Xh Ym", or "Ym" under an hour.
/// Negative durations are shown as 0m.
pub fn format_duration(duration: Duration) -> String {
    let total_minutes = duration.num_minutes();
    if total_minutes < 0 {
        return "0m".to_string();
    }
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}
