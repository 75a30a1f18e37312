//! Clear command: deletes all recorded activity.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::TimeZone;
use trike_core::{LedgerStore, Notifier, Tracker};

pub fn run<W, S, N, Tz>(writer: &mut W, tracker: &mut Tracker<S, N, Tz>) -> Result<()>
where
    W: Write,
    S: LedgerStore,
    N: Notifier,
    Tz: TimeZone,
{
    let removed = tracker.ledger().events().len();
    let was_running = tracker.ledger().current().is_some();
    tracker.clear().context("failed to save ledger")?;

    if was_running {
        writeln!(
            writer,
            "Cleared {removed} intervals and the activity in progress."
        )?;
    } else {
        writeln!(writer, "Cleared {removed} intervals.")?;
    }
    Ok(())
}
