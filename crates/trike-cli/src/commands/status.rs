//! Status command: current activity, today's totals and advisories.

use std::fmt;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use trike_core::{ActivityType, Advisory, LedgerStore, Notifier, Tracker, format_duration};

use super::util::format_local;

/// Status for JSON output. Durations are in milliseconds.
#[derive(Debug, Serialize)]
struct StatusJson {
    generated_at: DateTime<Utc>,
    current: Option<CurrentJson>,
    drive_today_ms: i64,
    other_work_today_ms: i64,
    work_today_ms: i64,
    continuous_drive_ms: i64,
    extensions_remaining: u8,
    extended_today: bool,
    advisories: Vec<AdvisoryJson>,
}

#[derive(Debug, Serialize)]
struct CurrentJson {
    activity: ActivityType,
    started_at: DateTime<Utc>,
    elapsed_ms: i64,
}

#[derive(Debug, Serialize)]
struct AdvisoryJson {
    kind: &'static str,
    message: String,
}

impl From<&Advisory> for AdvisoryJson {
    fn from(advisory: &Advisory) -> Self {
        Self {
            kind: advisory.kind(),
            message: advisory.message(),
        }
    }
}

pub fn run<W, S, N, Tz>(
    writer: &mut W,
    tracker: &Tracker<S, N, Tz>,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()>
where
    W: Write,
    S: LedgerStore,
    N: Notifier,
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let summary = tracker.summary(now);
    let advisories = tracker.advisories(now);
    let today = tracker.local_day(now);
    let extensions_remaining = tracker.allowance().remaining_in_week(today);
    let extended_today = tracker.allowance().is_used_on(today);
    let current = tracker.ledger().current();

    if json {
        let status = StatusJson {
            generated_at: now,
            current: current.map(|c| CurrentJson {
                activity: c.activity,
                started_at: c.started_at,
                elapsed_ms: c.elapsed(now).num_milliseconds(),
            }),
            drive_today_ms: summary.drive.num_milliseconds(),
            other_work_today_ms: summary.other_work.num_milliseconds(),
            work_today_ms: summary.work.num_milliseconds(),
            continuous_drive_ms: summary.continuous_drive.num_milliseconds(),
            extensions_remaining,
            extended_today,
            advisories: advisories.iter().map(AdvisoryJson::from).collect(),
        };
        serde_json::to_writer_pretty(&mut *writer, &status)?;
        writeln!(writer)?;
        return Ok(());
    }

    match current {
        Some(c) => writeln!(
            writer,
            "Current: {} since {} ({})",
            c.activity.label(),
            format_local(c.started_at, tracker.tz()),
            format_duration(c.elapsed(now))
        )?,
        None => writeln!(writer, "Current: idle")?,
    }
    writeln!(
        writer,
        "Today: driving {}, other work {}, total work {}",
        format_duration(summary.drive),
        format_duration(summary.other_work),
        format_duration(summary.work)
    )?;
    writeln!(
        writer,
        "Continuous driving: {}",
        format_duration(summary.continuous_drive)
    )?;
    if extended_today {
        writeln!(
            writer,
            "Extended driving day in use ({extensions_remaining} left this week)"
        )?;
    } else {
        writeln!(
            writer,
            "Extended days left this week: {extensions_remaining}"
        )?;
    }

    if !advisories.is_empty() {
        writeln!(writer, "Advisories:")?;
        for advisory in &advisories {
            writeln!(writer, "- {}", advisory.message())?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    use crate::commands::testing::{TestTracker, at, tracker};

    fn render(tracker: &TestTracker, now: DateTime<Utc>, json: bool) -> String {
        let mut output = Vec::new();
        run(&mut output, tracker, now, json).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn status_when_idle() {
        let tracker = tracker();
        assert_snapshot!(render(&tracker, at(8, 0), false), @r"
        Current: idle
        Today: driving 0m, other work 0m, total work 0m
        Continuous driving: 0m
        Extended days left this week: 2
        ");
    }

    #[test]
    fn status_shows_day_totals() {
        let mut tracker = tracker();
        tracker.start(ActivityType::OtherWork, at(6, 0)).unwrap();
        tracker.start(ActivityType::Drive, at(6, 30)).unwrap();
        tracker.start(ActivityType::Break, at(8, 0)).unwrap();
        tracker.start(ActivityType::Drive, at(8, 45)).unwrap();

        assert_snapshot!(render(&tracker, at(9, 45), false), @r"
        Current: Driving since 2025-03-10 08:45 (1h 0m)
        Today: driving 2h 30m, other work 30m, total work 3h 0m
        Continuous driving: 1h 0m
        Extended days left this week: 2
        ");
    }

    #[test]
    fn status_lists_extension_advisory() {
        let mut tracker = tracker();
        tracker.start(ActivityType::Drive, at(0, 0)).unwrap();
        tracker.start(ActivityType::Break, at(4, 0)).unwrap();
        tracker.start(ActivityType::Drive, at(4, 45)).unwrap();
        tracker.start(ActivityType::Break, at(8, 45)).unwrap();
        tracker.start(ActivityType::Drive, at(9, 30)).unwrap();

        assert_snapshot!(render(&tracker, at(10, 45), false), @r"
        Current: Driving since 2025-03-10 09:30 (1h 15m)
        Today: driving 9h 15m, other work 0m, total work 9h 15m
        Continuous driving: 1h 15m
        Extended days left this week: 2
        Advisories:
        - Driven 9h 15m today, over the 9h 0m limit: an extended driving day is available (2 left this week)
        ");
    }

    #[test]
    fn status_json_reports_break_needed() {
        let mut tracker = tracker();
        tracker.start(ActivityType::Drive, at(6, 0)).unwrap();

        assert_snapshot!(render(&tracker, at(11, 0), true), @r#"
        {
          "generated_at": "2025-03-10T11:00:00Z",
          "current": {
            "activity": "DRIVE",
            "started_at": "2025-03-10T06:00:00Z",
            "elapsed_ms": 18000000
          },
          "drive_today_ms": 18000000,
          "other_work_today_ms": 0,
          "work_today_ms": 18000000,
          "continuous_drive_ms": 18000000,
          "extensions_remaining": 2,
          "extended_today": false,
          "advisories": [
            {
              "kind": "break_needed",
              "message": "Break needed: 5h 0m of continuous driving, take 45m"
            }
          ]
        }
        "#);
    }

    #[test]
    fn status_after_extension() {
        let mut tracker = tracker();
        tracker.extend_today(at(6, 0)).unwrap();

        let output = render(&tracker, at(7, 0), false);
        assert!(output.contains("Extended driving day in use (1 left this week)"));
    }
}
