//! Start command: switches the driver to a new activity.

use std::fmt;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use trike_core::{ActivityType, LedgerStore, Notifier, Tracker, format_duration};

use super::util::format_local;

pub fn run<W, S, N, Tz>(
    writer: &mut W,
    tracker: &mut Tracker<S, N, Tz>,
    activity: ActivityType,
    at: DateTime<Utc>,
) -> Result<()>
where
    W: Write,
    S: LedgerStore,
    N: Notifier,
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let closed = tracker
        .start(activity, at)
        .context("failed to save ledger")?;

    if let Some(event) = closed {
        writeln!(
            writer,
            "Stopped {} after {}",
            event.activity().label(),
            format_duration(event.duration())
        )?;
    }
    let started_at = tracker.ledger().current().map_or(at, |c| c.started_at);
    writeln!(
        writer,
        "Started {} at {}",
        activity.label(),
        format_local(started_at, tracker.tz())
    )?;
    Ok(())
}
