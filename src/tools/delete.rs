/// Tool for deleting habits
///
/// This module implements the habit_delete MCP tool. The removed record's
/// reminder plan is returned so the caller can cancel its schedule.

use serde::Serialize;

use crate::domain::ReminderPlan;
use crate::state::{HabitStore, StoreError};
use crate::storage::HabitStorage;
use crate::tools::HabitIdParams;

#[derive(Debug, Serialize)]
pub struct DeleteHabitResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip)]
    pub cancelled_plan: ReminderPlan,
}

pub fn delete_habit<S: HabitStorage>(
    store: &mut HabitStore<S>,
    params: HabitIdParams,
) -> Result<DeleteHabitResponse, StoreError> {
    let removed = store.delete(&params.id())?;
    Ok(DeleteHabitResponse {
        success: true,
        message: format!("🗑️ Deleted habit '{}'", removed.name),
        cancelled_plan: removed.reminder_plan(),
    })
}
