/// MCP tools for habit management
///
/// This module contains all the MCP tools that external clients can call to
/// interact with the habit tracker. Each tool takes a parameter struct (its
/// JSON schema is generated with `schemars`) and works through the habit
/// state store, never through storage directly.

pub mod checkin;
pub mod create;
pub mod delete;
pub mod list;
pub mod notifications;
pub mod reset;
pub mod status;
pub mod timeline;

// Re-export tool functions for easy access
pub use checkin::*;
pub use create::*;
pub use delete::*;
pub use list::*;
pub use notifications::*;
pub use reset::*;
pub use status::*;
pub use timeline::*;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::domain::{HabitId, Reminder};

/// Parameters of tools that address a single habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct HabitIdParams {
    /// ID of the habit
    pub habit_id: String,
}

impl HabitIdParams {
    pub fn id(&self) -> HabitId {
        HabitId::from_string(&self.habit_id)
    }
}

/// A reminder as sent by clients
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ReminderParams {
    /// Hour of day, 0-23 (clamped)
    #[serde(default, deserialize_with = "lenient_int")]
    #[schemars(with = "Option<i64>")]
    pub hour: Option<i64>,
    /// Minute, 0-59 (clamped)
    #[serde(default, deserialize_with = "lenient_int")]
    #[schemars(with = "Option<i64>")]
    pub minute: Option<i64>,
    /// Weekdays, 0 = Monday .. 6 = Sunday; empty means every day
    #[serde(default)]
    pub days: Vec<i64>,
}

impl From<ReminderParams> for Reminder {
    fn from(params: ReminderParams) -> Self {
        Reminder::new(
            params.hour.unwrap_or(9),
            params.minute.unwrap_or(0),
            params.days,
        )
    }
}

/// Accept integers given as numbers or numeric strings; anything else is `None`
pub(crate) fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.floor() as i64)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f.floor() as i64),
        _ => None,
    }))
}
