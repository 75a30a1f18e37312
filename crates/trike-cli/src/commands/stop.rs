//! Stop command: ends the activity in progress.

use std::fmt;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use trike_core::{LedgerStore, Notifier, Tracker, format_duration};

use super::util::format_local;

pub fn run<W, S, N, Tz>(
    writer: &mut W,
    tracker: &mut Tracker<S, N, Tz>,
    at: DateTime<Utc>,
) -> Result<()>
where
    W: Write,
    S: LedgerStore,
    N: Notifier,
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let Some(event) = tracker.stop(at).context("failed to save ledger")? else {
        writeln!(writer, "No activity in progress.")?;
        return Ok(());
    };

    writeln!(
        writer,
        "Stopped {} after {} ({} to {})",
        event.activity().label(),
        format_duration(event.duration()),
        format_local(event.start(), tracker.tz()),
        format_local(event.end(), tracker.tz())
    )?;
    Ok(())
}
