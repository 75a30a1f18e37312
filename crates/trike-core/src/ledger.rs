//! The activity ledger: closed intervals plus the single open one.
//!
//! # Storage Format
//!
//! [`StoredLedger`] is the boundary representation shared by every persistence
//! collaborator. Timestamps are epoch milliseconds and activity types are free
//! strings, matching what the browser client kept in local storage:
//!
//! ```json
//! {"events": [{"type": "DRIVE", "start": 1700000000000, "end": 1700003600000}],
//!  "current": {"type": "BREAK", "startedAt": 1700003600000}}
//! ```
//!
//! Rehydration validates each record on its own. A corrupt record is dropped
//! and logged; the rest of the history still loads.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::activity::ActivityType;
use crate::types::{ActivityEvent, CurrentActivity};

/// Append-only history of closed intervals and at most one open interval.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    events: Vec<ActivityEvent>,
    current: Option<CurrentActivity>,
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Closed intervals in the order they were closed.
    pub fn events(&self) -> &[ActivityEvent] {
        &self.events
    }

    /// The open interval, if any.
    pub const fn current(&self) -> Option<&CurrentActivity> {
        self.current.as_ref()
    }

    /// True when there is neither history nor an open interval.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.current.is_none()
    }

    /// Starts `activity` at `now`, closing any open interval first.
    ///
    /// Starting the activity that is already running closes and reopens it.
    /// Returns the interval that was closed, if there was one.
    pub fn start(&mut self, activity: ActivityType, now: DateTime<Utc>) -> Option<ActivityEvent> {
        let mut at = now.trunc_subsecs(3);
        let closed = self.close(at);
        if let Some(event) = closed {
            at = event.end();
        }
        self.current = Some(CurrentActivity {
            activity,
            started_at: at,
        });
        tracing::debug!(%activity, started_at = %at, "activity started");
        closed
    }

    /// Closes the open interval at `now`. No-op when idle.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Option<ActivityEvent> {
        let closed = self.close(now.trunc_subsecs(3));
        if closed.is_none() {
            tracing::debug!("stop requested with no open activity");
        }
        closed
    }

    /// Drops all history and the open interval.
    pub fn clear(&mut self) {
        tracing::debug!(events = self.events.len(), "ledger cleared");
        self.events.clear();
        self.current = None;
    }

    fn close(&mut self, now: DateTime<Utc>) -> Option<ActivityEvent> {
        let open = self.current.take()?;
        let event = ActivityEvent::closing(open, now);
        tracing::debug!(
            activity = %event.activity(),
            duration_ms = event.duration().num_milliseconds(),
            "activity closed"
        );
        self.events.push(event);
        Some(event)
    }

    /// Converts to the storage representation.
    pub fn to_stored(&self) -> StoredLedger {
        StoredLedger {
            events: self
                .events
                .iter()
                .map(|event| StoredEvent {
                    kind: event.activity().as_str().to_string(),
                    start: event.start().timestamp_millis(),
                    end: event.end().timestamp_millis(),
                })
                .collect(),
            current: self.current.map(|current| StoredCurrent {
                kind: current.activity.as_str().to_string(),
                started_at: current.started_at.timestamp_millis(),
            }),
        }
    }

    /// Rebuilds a ledger from storage, discarding corrupt records.
    ///
    /// Returns the ledger and the number of records that were discarded.
    pub fn rehydrate(stored: StoredLedger) -> (Self, usize) {
        let mut discarded = 0;
        let mut events = Vec::with_capacity(stored.events.len());

        for (index, record) in stored.events.into_iter().enumerate() {
            match record.validate() {
                Ok(event) => events.push(event),
                Err(reason) => {
                    discarded += 1;
                    tracing::warn!(index, %reason, "discarding stored activity event");
                }
            }
        }

        let current = stored.current.and_then(|record| match record.validate() {
            Ok(current) => Some(current),
            Err(reason) => {
                discarded += 1;
                tracing::warn!(%reason, "discarding stored current activity");
                None
            }
        });

        (Self { events, current }, discarded)
    }
}

/// Serialized ledger, as exchanged with persistence collaborators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredLedger {
    #[serde(default)]
    pub events: Vec<StoredEvent>,
    #[serde(default)]
    pub current: Option<StoredCurrent>,
}

/// Serialized closed interval (epoch milliseconds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub start: i64,
    pub end: i64,
}

/// Serialized open interval (epoch milliseconds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCurrent {
    #[serde(rename = "type")]
    pub kind: String,
    pub started_at: i64,
}

impl StoredEvent {
    fn validate(self) -> Result<ActivityEvent, String> {
        let activity = self.kind.parse::<ActivityType>().map_err(|e| e.to_string())?;
        let start = from_millis(self.start)?;
        let end = from_millis(self.end)?;
        ActivityEvent::new(activity, start, end).map_err(|e| e.to_string())
    }
}

impl StoredCurrent {
    fn validate(self) -> Result<CurrentActivity, String> {
        let activity = self.kind.parse::<ActivityType>().map_err(|e| e.to_string())?;
        let started_at = from_millis(self.started_at)?;
        Ok(CurrentActivity {
            activity,
            started_at,
        })
    }
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>, String> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| format!("timestamp out of range: {ms}"))
}
