//! History command: recorded intervals, newest first.
//!
//! `--csv` produces `type,start,end,duration_minutes` with UTC RFC 3339
//! timestamps, matching the web app's history download.

use std::fmt;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use trike_core::{ActivityEvent, Ledger, format_duration};

use super::util::format_local;

pub fn run<W, Tz>(
    writer: &mut W,
    ledger: &Ledger,
    tz: &Tz,
    csv: bool,
    limit: Option<usize>,
) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let events: Vec<&ActivityEvent> = ledger
        .events()
        .iter()
        .rev()
        .take(limit.unwrap_or(usize::MAX))
        .collect();

    if csv {
        return write_csv(writer, &events);
    }

    if events.is_empty() {
        writeln!(writer, "No activity recorded.")?;
        return Ok(());
    }

    for event in events {
        writeln!(
            writer,
            "{}  {}  {:<12} {}",
            format_local(event.start(), tz),
            format_local(event.end(), tz),
            event.activity().label(),
            format_duration(event.duration())
        )?;
    }
    Ok(())
}

fn write_csv<W: Write>(writer: &mut W, events: &[&ActivityEvent]) -> Result<()> {
    writeln!(writer, "type,start,end,duration_minutes")?;
    for event in events {
        let row = [
            event.activity().as_str().to_string(),
            csv_timestamp(event.start()),
            csv_timestamp(event.end()),
            event.duration().num_minutes().to_string(),
        ];
        let cells: Vec<String> = row.iter().map(|cell| escape_csv(cell)).collect();
        writeln!(writer, "{}", cells.join(","))?;
    }
    Ok(())
}

fn csv_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Quotes a cell if it contains a comma, quote, or newline.
fn escape_csv(cell: &str) -> String {
    if cell.contains([',', '"', '\n']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;
    use trike_core::ActivityType;

    use crate::commands::testing::at;

    fn shift() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.start(ActivityType::Drive, at(6, 0));
        ledger.start(ActivityType::Break, at(10, 30));
        ledger.start(ActivityType::RestDaily, at(11, 15));
        ledger
    }

    fn render(ledger: &Ledger, csv: bool, limit: Option<usize>) -> String {
        let mut output = Vec::new();
        run(&mut output, ledger, &Utc, csv, limit).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn history_lists_newest_first() {
        assert_snapshot!(render(&shift(), false, None), @r"
        2025-03-10 10:30  2025-03-10 11:15  Break        45m
        2025-03-10 06:00  2025-03-10 10:30  Driving      4h 30m
        ");
    }

    #[test]
    fn history_respects_limit() {
        assert_snapshot!(render(&shift(), false, Some(1)), @"2025-03-10 10:30  2025-03-10 11:15  Break        45m");
    }

    #[test]
    fn history_when_empty() {
        assert_snapshot!(render(&Ledger::new(), false, None), @"No activity recorded.");
    }

    #[test]
    fn history_csv() {
        assert_snapshot!(render(&shift(), true, None), @r"
        type,start,end,duration_minutes
        BREAK,2025-03-10T10:30:00.000Z,2025-03-10T11:15:00.000Z,45
        DRIVE,2025-03-10T06:00:00.000Z,2025-03-10T10:30:00.000Z,270
        ");
    }

    #[test]
    fn escape_csv_quotes_special_cells() {
        assert_eq!(escape_csv("DRIVE"), "DRIVE");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
