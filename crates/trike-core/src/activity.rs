//! Activity type enum as the single source of truth for activity tags.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Driver states that can be tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActivityType {
    Drive,
    Break,
    OtherWork,
    Availability,
    RestDaily,
    RestWeekly,
}

/// How an activity affects a continuous-driving chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuity {
    /// Counts towards continuous driving.
    Extends,
    /// Ends the chain.
    Breaks,
    /// Neither counts nor ends the chain.
    Neutral,
}

impl ActivityType {
    /// Every variant, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Drive,
        Self::Break,
        Self::OtherWork,
        Self::Availability,
        Self::RestDaily,
        Self::RestWeekly,
    ];

    /// Canonical tag used in storage and exports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Drive => "DRIVE",
            Self::Break => "BREAK",
            Self::OtherWork => "OTHER_WORK",
            Self::Availability => "AVAILABILITY",
            Self::RestDaily => "REST_DAILY",
            Self::RestWeekly => "REST_WEEKLY",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Drive => "Driving",
            Self::Break => "Break",
            Self::OtherWork => "Other work",
            Self::Availability => "Availability",
            Self::RestDaily => "Daily rest",
            Self::RestWeekly => "Weekly rest",
        }
    }

    /// Effect on the continuous-driving chain.
    ///
    /// Deliberately exhaustive: a new variant must pick a side here.
    #[must_use]
    pub const fn continuity(self) -> Continuity {
        match self {
            Self::Drive => Continuity::Extends,
            Self::Break | Self::RestDaily | Self::RestWeekly | Self::OtherWork => {
                Continuity::Breaks
            }
            Self::Availability => Continuity::Neutral,
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = UnknownActivityType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|activity| activity.as_str() == normalized)
            .ok_or_else(|| UnknownActivityType(s.to_string()))
    }
}

impl Serialize for ActivityType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ActivityType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown activity strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownActivityType(String);

impl fmt::Display for UnknownActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown activity type: {}", self.0)
    }
}

impl std::error::Error for UnknownActivityType {}
