//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use trike_core::ActivityType;

/// Driver shift tracker.
///
/// Records driving, breaks, work and rest as a ledger of intervals and warns
/// when driving limits are reached.
#[derive(Debug, Parser)]
#[command(name = "trike", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start an activity, closing the one in progress.
    Start {
        /// Activity type (drive, break, other-work, availability, rest-daily, rest-weekly).
        activity: ActivityType,

        /// When the switch happened (ISO 8601 or relative like "10 minutes ago").
        #[arg(long)]
        at: Option<String>,
    },

    /// Stop the activity in progress.
    Stop {
        /// When the activity ended (ISO 8601 or relative like "10 minutes ago").
        #[arg(long)]
        at: Option<String>,
    },

    /// Show the current activity, today's totals and advisories.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List recorded intervals, newest first.
    History {
        /// Output as CSV.
        #[arg(long)]
        csv: bool,

        /// Show at most this many intervals.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Delete all recorded activity.
    Clear,

    /// Use an extended driving day for today.
    Extend,

    /// Suggest an activity from the current state.
    Suggest {
        /// Switch to the suggested activity.
        #[arg(long)]
        accept: bool,
    },

    /// Re-check driving limits periodically until interrupted.
    Watch {
        /// Seconds between checks (defaults to `tick_seconds` from config).
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Print the ledger as JSON.
    Export,

    /// Replace the ledger with one previously exported.
    Import {
        /// Path to a JSON file produced by `trike export`.
        file: PathBuf,
    },
}
