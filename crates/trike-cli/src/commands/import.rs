//! Import command: replaces the ledger from a `trike export` file.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::TimeZone;
use trike_core::{LedgerStore, Notifier, StoredLedger, Tracker};

pub fn run<W, S, N, Tz>(writer: &mut W, tracker: &mut Tracker<S, N, Tz>, path: &Path) -> Result<()>
where
    W: Write,
    S: LedgerStore,
    N: Notifier,
    Tz: TimeZone,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let stored = parse_stored(&content)
        .with_context(|| format!("invalid ledger JSON in {}", path.display()))?;

    let discarded = tracker.replace(stored).context("failed to save ledger")?;
    let imported = tracker.ledger().events().len();

    writeln!(writer, "Imported {imported} intervals.")?;
    if let Some(current) = tracker.ledger().current() {
        writeln!(writer, "{} is in progress.", current.activity.label())?;
    }
    if discarded > 0 {
        writeln!(writer, "Skipped {discarded} corrupt records.")?;
    }
    Ok(())
}

fn parse_stored(content: &str) -> Result<StoredLedger> {
    if content.trim().is_empty() {
        return Ok(StoredLedger::default());
    }
    Ok(serde_json::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;
    use trike_core::ActivityType;

    use crate::commands::testing::tracker;

    fn import(content: &str) -> (String, crate::commands::testing::TestTracker) {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("ledger.json");
        std::fs::write(&path, content).unwrap();

        let mut tracker = tracker();
        let mut output = Vec::new();
        run(&mut output, &mut tracker, &path).unwrap();
        (String::from_utf8(output).unwrap(), tracker)
    }

    #[test]
    fn import_skips_corrupt_records() {
        let (output, tracker) = import(
            r#"{
                "events": [
                    {"type": "DRIVE", "start": 1741586400000, "end": 1741588200000},
                    {"type": "DRIVE", "start": 1741588200000, "end": 1741586400000},
                    {"type": "NAP", "start": 1741588200000, "end": 1741590000000},
                    {"type": "BREAK", "start": 1741588200000, "end": 1741590900000}
                ],
                "current": {"type": "DRIVE", "startedAt": 1741590900000}
            }"#,
        );

        assert_snapshot!(output, @r"
        Imported 2 intervals.
        Driving is in progress.
        Skipped 2 corrupt records.
        ");
        assert_eq!(
            tracker.ledger().current().map(|c| c.activity),
            Some(ActivityType::Drive)
        );
        assert_eq!(tracker.store().load().unwrap(), *tracker.ledger());
    }

    #[test]
    fn import_empty_file_clears_ledger() {
        let (output, tracker) = import("");
        assert_snapshot!(output, @"Imported 0 intervals.");
        assert!(tracker.ledger().is_empty());
    }

    #[test]
    fn import_rejects_malformed_json() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("ledger.json");
        std::fs::write(&path, "[1, 2").unwrap();

        let mut tracker = tracker();
        let err = run(&mut Vec::new(), &mut tracker, &path).unwrap_err();
        assert!(err.to_string().starts_with("invalid ledger JSON"));
    }
}
