/// Tool for checking habit status, streaks and momentum
///
/// This module implements the habit_status MCP tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{format_day_key, HabitId};
use crate::state::{HabitStatus, HabitStore, StoreError};
use crate::storage::HabitStorage;

/// Parameters for checking habit status
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct StatusParams {
    /// ID of a specific habit (optional - shows all if omitted)
    pub habit_id: Option<String>,
}

/// Response from checking habit status
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub habits: Vec<HabitStatus>,
    pub message: String,
}

/// Get status for one or all habits
pub fn get_habit_status<S: HabitStorage>(
    store: &HabitStore<S>,
    params: StatusParams,
) -> Result<StatusResponse, StoreError> {
    let habits = match params.habit_id {
        Some(raw) => {
            let id = HabitId::from_string(&raw);
            let status = store
                .status(&id)
                .ok_or(StoreError::HabitNotFound(id))?;
            vec![status]
        }
        None => store
            .habits()
            .iter()
            .filter_map(|habit| store.status(&habit.id))
            .collect(),
    };

    let message = if habits.is_empty() {
        "No habits found. Create your first habit to get started!".to_string()
    } else {
        habits.iter().map(describe).collect::<Vec<_>>().join("\n\n")
    };

    Ok(StatusResponse { habits, message })
}

fn describe(status: &HabitStatus) -> String {
    let habit = &status.habit;
    let period = habit.period;
    let mut text = format!(
        "🎯 {} ({})\n   Progress: {}/{} this {} ({:.0}%)\n   Current streak: {} | Best: {}\n   Momentum: {} days (best {} days){}",
        habit.name,
        habit.id.short(),
        status.progress.count,
        status.progress.target,
        period,
        status.progress.percent * 100.0,
        period.unit_label(status.current_streak),
        period.unit_label(status.longest_streak),
        status.current_momentum_days,
        status.longest_momentum_days,
        status
            .momentum_color
            .map_or(String::new(), |c| format!(" {} {}", c.name(), c.hex())),
    );
    if let Some(last) = habit.completed_days.iter().next_back() {
        text.push_str(&format!("\n   Last completed: {}", format_day_key(*last)));
    }
    if status.can_mark_yesterday {
        text.push_str("\n   Yesterday can still be marked as done");
    }
    text.push_str(&format!("\n   {}", status.message));
    text
}
