/// Tool for editing a habit's reminders
///
/// This module implements the habit_notifications MCP tool. It replaces the
/// reminder list and returns the plan the scheduler should apply.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{HabitId, Reminder, ReminderPlan};
use crate::state::{HabitStore, StoreError};
use crate::storage::HabitStorage;
use crate::tools::ReminderParams;

/// Parameters for replacing the reminders of a habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateNotificationsParams {
    /// ID of the habit
    pub habit_id: String,
    /// New reminder list; an empty list removes all reminders
    #[serde(default)]
    pub notifications: Vec<ReminderParams>,
}

#[derive(Debug, Serialize)]
pub struct UpdateNotificationsResponse {
    pub success: bool,
    pub message: String,
    pub reminder_plan: ReminderPlan,
}

pub fn update_notifications<S: HabitStorage>(
    store: &mut HabitStore<S>,
    params: UpdateNotificationsParams,
) -> Result<UpdateNotificationsResponse, StoreError> {
    let id = HabitId::from_string(&params.habit_id);
    let reminders: Vec<Reminder> = params.notifications.into_iter().map(Into::into).collect();
    let outcome = store.update_notifications(&id, reminders)?;
    let plan = outcome.habit.reminder_plan();

    let message = if plan.notifications.is_empty() {
        format!("🔕 Removed all reminders of '{}'", plan.habit_name)
    } else {
        let lines = plan
            .notifications
            .iter()
            .map(|r| format!("   ⏰ {} on {}", r.time_label(), r.days_label()))
            .collect::<Vec<_>>()
            .join("\n");
        format!("🔔 Reminders of '{}':\n{}", plan.habit_name, lines)
    };

    Ok(UpdateNotificationsResponse {
        success: true,
        message,
        reminder_plan: plan,
    })
}
