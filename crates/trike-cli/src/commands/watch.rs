//! Watch command: periodic re-evaluation of the driving limits.
//!
//! Each tick reloads the ledger and the used extension days (other `trike`
//! invocations may have changed them), sends any advisories to the notifier
//! and prints a one-line status.
//! The loop ends when the shutdown future resolves.

use std::fmt;
use std::future::Future;
use std::io::Write;
use std::time::Duration as StdDuration;

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use tokio::time::MissedTickBehavior;
use trike_core::{
    Confidence, LedgerStore, Notifier, SuggestionGate, Tracker, format_duration, predict,
};

use super::util::format_local;

/// Runs the watch loop on a current-thread runtime until `shutdown` resolves.
///
/// Returns the number of ticks that ran.
pub fn run<W, S, N, Tz, F>(
    writer: &mut W,
    tracker: &mut Tracker<S, N, Tz>,
    period: StdDuration,
    threshold: Confidence,
    shutdown: F,
) -> Result<usize>
where
    W: Write,
    S: LedgerStore,
    N: Notifier,
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
    F: Future<Output = ()>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;
    runtime.block_on(watch_loop(writer, tracker, period, threshold, shutdown))
}

async fn watch_loop<W, S, N, Tz, F>(
    writer: &mut W,
    tracker: &mut Tracker<S, N, Tz>,
    period: StdDuration,
    threshold: Confidence,
    shutdown: F,
) -> Result<usize>
where
    W: Write,
    S: LedgerStore,
    N: Notifier,
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
    F: Future<Output = ()>,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut gate = SuggestionGate::new(threshold);
    let mut ticks = 0;
    tokio::pin!(shutdown);

    tracing::info!(period_secs = period.as_secs(), "watching driving limits");
    loop {
        tokio::select! {
            biased;
            () = &mut shutdown => break,
            _ = interval.tick() => {
                ticks += 1;
                if let Err(err) = tracker.reload() {
                    tracing::warn!(error = %err, "failed to reload ledger, skipping tick");
                    continue;
                }
                let now = Utc::now();
                tracker.tick(now);

                let summary = tracker.summary(now);
                let state = tracker
                    .ledger()
                    .current()
                    .map_or("idle", |c| c.activity.label());
                writeln!(
                    writer,
                    "{}  {state}, driven {} today, continuous {}",
                    format_local(now, tracker.tz()),
                    format_duration(summary.drive),
                    format_duration(summary.continuous_drive)
                )?;

                let prediction = predict(&tracker.snapshot(now));
                let current = tracker.ledger().current().map(|c| c.activity);
                if let Some(suggestion) = gate.consider(&prediction, current, now) {
                    writeln!(writer, "{}", suggestion.message())?;
                }
                writer.flush()?;
            }
        }
    }

    writeln!(writer, "Stopped watching after {ticks} checks.")?;
    Ok(ticks)
}
