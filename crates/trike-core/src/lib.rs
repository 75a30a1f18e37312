//! Core domain logic for the shift tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Ledger: the append-only history of activity intervals
//! - Engine: duration queries and driving-limit advisories
//! - Suggestions: a fixed-weight classifier proposing activity switches
//! - Tracker: a session tying the ledger to storage and notifications

pub mod activity;
pub mod allowance;
pub mod engine;
pub mod ledger;
pub mod suggest;
pub mod tracker;
pub mod types;

pub use activity::{ActivityType, Continuity, UnknownActivityType};
pub use allowance::{AllowanceError, DEFAULT_WEEKLY_EXTENSIONS, ExtensionAllowance};
pub use engine::{
    Advisory, DaySummary, DriveLimits, Snapshot, continuous_drive, day_start, duration_in_window,
    duration_today, evaluate_thresholds, format_duration, snapshot, summarize,
};
pub use ledger::{Ledger, StoredCurrent, StoredEvent, StoredLedger};
pub use suggest::{
    DEFAULT_SUGGESTION_THRESHOLD, Prediction, Suggestion, SuggestionGate, predict,
};
pub use tracker::{ActivitySwitch, LedgerStore, MemoryStore, Notifier, Tracker};
pub use types::{ActivityEvent, Confidence, CurrentActivity, ValidationError};
