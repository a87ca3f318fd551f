/// Tool for creating new habits
///
/// This module implements the habit_create MCP tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{Period, ReminderPlan};
use crate::state::{HabitStore, StoreError};
use crate::storage::HabitStorage;
use crate::tools::{lenient_int, ReminderParams};

/// Parameters for creating a new habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateHabitParams {
    /// Name of the habit
    pub name: String,
    /// Completions required per period (defaults to 1)
    #[serde(default, deserialize_with = "lenient_int")]
    #[schemars(with = "Option<i64>")]
    pub target: Option<i64>,
    /// Period of the target: day, week or month (defaults to day)
    pub period: Option<String>,
    /// Optional reminders
    #[serde(default)]
    pub notifications: Vec<ReminderParams>,
}

/// Response from creating a habit
#[derive(Debug, Serialize)]
pub struct CreateHabitResponse {
    pub success: bool,
    pub habit_id: String,
    pub message: String,
    /// Reminders to hand to the scheduler
    #[serde(skip)]
    pub reminder_plan: ReminderPlan,
}

/// Create a new habit in the store
pub fn create_habit<S: HabitStorage>(
    store: &mut HabitStore<S>,
    params: CreateHabitParams,
) -> Result<CreateHabitResponse, StoreError> {
    let period = params
        .period
        .as_deref()
        .map_or(Period::Day, Period::parse_lenient);

    let habit = store.create(
        &params.name,
        params.target.unwrap_or(1),
        period,
        params.notifications.into_iter().map(Into::into).collect(),
    )?;

    let goal = match habit.period {
        Period::Day => format!("{}x per day", habit.target),
        Period::Week => format!("{} days per week", habit.target),
        Period::Month => format!("{} days per month", habit.target),
    };

    Ok(CreateHabitResponse {
        success: true,
        habit_id: habit.id.to_string(),
        message: format!(
            "✅ Created habit '{}' ({})! Ready to start your streak!\nHabit ID: {}",
            habit.name, goal, habit.id
        ),
        reminder_plan: habit.reminder_plan(),
    })
}
