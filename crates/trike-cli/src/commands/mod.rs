//! CLI subcommand implementations.
//!
//! Every command writes its output to a caller-supplied writer and takes the
//! current time as an argument, so tests can pin both.

pub mod clear;
pub mod export;
pub mod extend;
pub mod history;
pub mod import;
pub mod start;
pub mod status;
pub mod stop;
pub mod suggest;
pub mod util;
pub mod watch;

use anyhow::{Context, Result};
use chrono::TimeZone;
use trike_core::{ExtensionAllowance, Notifier, Tracker};
use trike_db::Database;

use crate::Config;

/// Opens the configured database, creating its directory if needed.
pub fn open_database(config: &Config) -> Result<Database> {
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }
    Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))
}

/// Opens a tracking session on the configured database.
pub fn open_tracker<N: Notifier, Tz: TimeZone>(
    config: &Config,
    notifier: N,
    tz: Tz,
) -> Result<Tracker<Database, N, Tz>> {
    let db = open_database(config)?;
    session(db, config, notifier, tz)
}

/// Wraps an open database in a session using the configured limits.
pub fn session<N: Notifier, Tz: TimeZone>(
    db: Database,
    config: &Config,
    notifier: N,
    tz: Tz,
) -> Result<Tracker<Database, N, Tz>> {
    let used_days = db
        .list_extension_days()
        .context("failed to read extension days")?;
    let allowance = ExtensionAllowance::new(config.weekly_extensions).with_used_days(used_days);
    let tracker = Tracker::open(db, notifier, tz)
        .context("failed to load ledger")?
        .with_limits(config.limits())
        .with_allowance(allowance);
    Ok(tracker)
}

/// Prints advisories to stderr so they stay out of command output.
pub fn stderr_notifier(message: &str) {
    eprintln!("! {message}");
}
