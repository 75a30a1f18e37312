//! Extend command: uses an extended driving day for today.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use trike_core::{Notifier, Tracker};
use trike_db::Database;

pub fn run<W, N, Tz>(
    writer: &mut W,
    tracker: &mut Tracker<Database, N, Tz>,
    now: DateTime<Utc>,
) -> Result<()>
where
    W: Write,
    N: Notifier,
    Tz: TimeZone,
{
    let day = tracker.extend_today(now)?;
    tracker
        .store_mut()
        .record_extension_day(day, now)
        .context("failed to record extension day")?;

    writeln!(
        writer,
        "Extended driving day used for {day} ({} left this week)",
        tracker.allowance().remaining_in_week(day)
    )?;
    Ok(())
}
