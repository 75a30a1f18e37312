//! Suggest command: runs the activity classifier once.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use trike_core::{
    Confidence, LedgerStore, Notifier, Prediction, SuggestionGate, Tracker, predict,
};

pub fn run<W, S, N, Tz>(
    writer: &mut W,
    tracker: &mut Tracker<S, N, Tz>,
    threshold: Confidence,
    accept: bool,
    now: DateTime<Utc>,
) -> Result<()>
where
    W: Write,
    S: LedgerStore,
    N: Notifier,
    Tz: TimeZone,
{
    let prediction = predict(&tracker.snapshot(now));
    let current = tracker.ledger().current().map(|c| c.activity);
    tracing::debug!(?prediction, "classifier output");

    let Some(suggestion) = SuggestionGate::new(threshold).consider(&prediction, current, now)
    else {
        writeln!(writer, "No suggestion ({}).", describe(&prediction))?;
        return Ok(());
    };

    writeln!(writer, "{}", suggestion.message())?;
    if accept {
        suggestion
            .accept(tracker, now)
            .context("failed to save ledger")?;
        writeln!(writer, "Switched to {}.", suggestion.activity.label())?;
    }
    Ok(())
}

fn describe(prediction: &Prediction) -> String {
    prediction
        .scores
        .iter()
        .map(|(activity, confidence)| format!("{} {}%", activity.label(), confidence.percent()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Duration;
    use trike_core::{ActivityType, DEFAULT_SUGGESTION_THRESHOLD};

    use crate::commands::testing::{at, tracker};

    fn threshold() -> Confidence {
        Confidence::clamped(DEFAULT_SUGGESTION_THRESHOLD)
    }

    #[test]
    fn suggest_proposes_break_after_idle_work() {
        let mut tracker = tracker();
        tracker.start(ActivityType::OtherWork, at(12, 0)).unwrap();

        let mut output = Vec::new();
        run(&mut output, &mut tracker, threshold(), false, at(12, 5)).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("Looks like Break right now ("), "{output}");
        assert_eq!(
            tracker.ledger().current().map(|c| c.activity),
            Some(ActivityType::OtherWork)
        );
    }

    #[test]
    fn suggest_accept_switches_activity() {
        let mut tracker = tracker();
        tracker.start(ActivityType::OtherWork, at(12, 0)).unwrap();

        let mut output = Vec::new();
        run(&mut output, &mut tracker, threshold(), true, at(12, 5)).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.ends_with("Switched to Break.\n"), "{output}");
        let current = tracker.ledger().current().unwrap();
        assert_eq!(current.activity, ActivityType::Break);
        assert_eq!(current.started_at, at(12, 5));
        assert_eq!(tracker.ledger().events()[0].duration(), Duration::minutes(5));
    }

    #[test]
    fn suggest_stays_quiet_when_unsure() {
        let mut tracker = tracker();
        let mut output = Vec::new();
        run(&mut output, &mut tracker, threshold(), true, at(12, 0)).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("No suggestion (Driving "), "{output}");
        assert!(tracker.ledger().is_empty());
    }
}
