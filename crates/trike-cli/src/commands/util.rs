//! Shared utilities for CLI commands.

use std::fmt;
use std::sync::LazyLock;

use anyhow::Context;
use chrono::{DateTime, Duration, TimeZone, Utc};
use regex::Regex;

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s+(minute|hour|day|week)s?\s+ago$").expect("relative time regex is valid")
});

/// Conservative bounds for relative time parsing (~1000 years in minutes).
const MAX_RELATIVE_MINUTES: i64 = 1000 * 365 * 24 * 60;

/// Parse a datetime string as either ISO 8601 or relative time.
///
/// Relative values are measured back from `now`.
///
/// Supports:
/// - ISO 8601: "2026-01-15T10:30:00Z"
/// - Relative: "2 hours ago", "30 minutes ago", "1 day ago", "1 week ago"
pub fn parse_datetime(s: &str, now: DateTime<Utc>) -> anyhow::Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let Some(caps) = RELATIVE_TIME_RE.captures(s) else {
        anyhow::bail!(
            "Invalid datetime: {s}. Use ISO 8601 (e.g., 2026-01-15T10:30:00Z) or relative (e.g., '10 minutes ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let (max_for_unit, minutes_per_unit) = match &caps[2] {
        "minute" => (MAX_RELATIVE_MINUTES, 1),
        "hour" => (MAX_RELATIVE_MINUTES / 60, 60),
        "day" => (MAX_RELATIVE_MINUTES / (60 * 24), 60 * 24),
        "week" => (MAX_RELATIVE_MINUTES / (60 * 24 * 7), 60 * 24 * 7),
        unit => anyhow::bail!("Unknown time unit: {unit}"),
    };

    if n > max_for_unit {
        anyhow::bail!("Relative time value too large: {n} {}", &caps[2]);
    }

    Ok(now - Duration::minutes(n * minutes_per_unit))
}

/// Resolves an optional `--at` value, defaulting to `now`.
pub fn resolve_at(at: Option<&str>, now: DateTime<Utc>) -> anyhow::Result<DateTime<Utc>> {
    at.map_or(Ok(now), |value| parse_datetime(value, now))
}

/// Formats an instant as local wall-clock time.
pub fn format_local<Tz>(instant: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    instant.with_timezone(tz).format("%Y-%m-%d %H:%M").to_string()
}
