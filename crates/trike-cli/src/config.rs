//! Configuration loading and management.

use std::path::{Path, PathBuf};

use chrono::Duration;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use trike_core::{
    Confidence, DEFAULT_SUGGESTION_THRESHOLD, DEFAULT_WEEKLY_EXTENSIONS, DriveLimits,
};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Continuous driving before a break is advised.
    pub break_after_minutes: u32,

    /// Daily driving above which an extended day is offered.
    pub daily_drive_minutes: u32,

    /// Extended driving days allowed per week.
    pub weekly_extensions: u8,

    /// Seconds between checks in `trike watch`.
    pub tick_seconds: u64,

    /// Minimum classifier confidence for a suggestion.
    pub suggestion_threshold: f32,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        let limits = DriveLimits::default();
        Self {
            database_path: data_dir.join("trike.db"),
            break_after_minutes: whole_minutes(limits.continuous_drive),
            daily_drive_minutes: whole_minutes(limits.daily_drive),
            weekly_extensions: DEFAULT_WEEKLY_EXTENSIONS,
            tick_seconds: 60,
            suggestion_threshold: DEFAULT_SUGGESTION_THRESHOLD,
        }
    }
}

fn whole_minutes(duration: Duration) -> u32 {
    u32::try_from(duration.num_minutes()).unwrap_or(u32::MAX)
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (TRIKE_*)
        figment = figment.merge(Env::prefixed("TRIKE_"));

        figment.extract()
    }

    /// Driving limits built from the configured minutes.
    ///
    /// The required break length is not configurable.
    pub fn limits(&self) -> DriveLimits {
        DriveLimits {
            continuous_drive: Duration::minutes(i64::from(self.break_after_minutes)),
            daily_drive: Duration::minutes(i64::from(self.daily_drive_minutes)),
            ..DriveLimits::default()
        }
    }

    pub const fn suggestion_threshold(&self) -> Confidence {
        Confidence::clamped(self.suggestion_threshold)
    }

    /// Tick period for `trike watch`, at least one second.
    pub fn tick_period(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.tick_seconds.max(1))
    }
}

/// Returns the platform-specific config directory for trike.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("trike"))
}

/// Returns the platform-specific data directory for trike.
///
/// On Linux: `~/.local/share/trike`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("trike"))
}
