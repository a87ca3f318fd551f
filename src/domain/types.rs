/// Core types used throughout the domain layer
///
/// This module defines the habit identifier and the recurrence period that
/// decides how completed days are grouped when streaks are calculated.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a habit
///
/// Freshly created habits get a random UUID, but identifiers loaded from
/// storage are kept verbatim so records written by older versions (which
/// used short random tokens) stay addressable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitId(String);

impl HabitId {
    /// Generate a new random habit ID
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an existing identifier (useful for database loading)
    pub fn from_string(s: &str) -> Self {
        Self(s.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First characters of the id, for compact display
    pub fn short(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(8)
            .map(|(idx, _)| idx)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl Default for HabitId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How often a habit's target has to be reached
///
/// Streaks count consecutive periods: days, ISO weeks (Monday start) or
/// calendar months.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Day,
    Week,
    Month,
}

impl Period {
    /// Parse a period name leniently; anything unknown falls back to `Day`
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "week" | "weekly" | "w" => Period::Week,
            "month" | "monthly" | "m" => Period::Month,
            "day" | "daily" | "d" => Period::Day,
            other => {
                tracing::debug!("Unknown period '{}', defaulting to day", other);
                Period::Day
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
        }
    }

    /// Unit label for streak counts ("3 weeks")
    pub fn unit_label(&self, count: u32) -> String {
        let unit = match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
        };
        if count == 1 {
            format!("{} {}", count, unit)
        } else {
            format!("{} {}s", count, unit)
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coerce a raw target count into the valid range (at least 1)
pub fn coerce_target(raw: i64) -> u32 {
    raw.clamp(1, u32::MAX as i64) as u32
}
