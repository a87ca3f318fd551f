/// Tool for the explicit reset operations
///
/// This module implements the habit_reset MCP tool. Every mode is an
/// intentional action; only `longest`, `timeline` (without
/// `preserve_longest`) and `complete` ever lower the longest streak.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::HabitId;
use crate::state::{HabitStore, StoreError};
use crate::storage::HabitStorage;

/// What to reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResetMode {
    /// End the current run; history and longest streak stay
    Current,
    /// Lower the longest streak to the current one
    Longest,
    /// Wipe the completion history
    Timeline,
    /// Start over as a fresh habit with the same name and target
    Complete,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ResetParams {
    /// ID of the habit
    pub habit_id: String,
    pub mode: ResetMode,
    /// Keep the longest streak when wiping the timeline (default: true)
    pub preserve_longest: Option<bool>,
    /// Move the creation date to now when wiping the timeline (default: false)
    pub reset_start: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub success: bool,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub message: String,
}

pub fn reset_habit<S: HabitStorage>(
    store: &mut HabitStore<S>,
    params: ResetParams,
) -> Result<ResetResponse, StoreError> {
    let id = HabitId::from_string(&params.habit_id);
    let outcome = match params.mode {
        ResetMode::Current => store.reset_current_streak(&id)?,
        ResetMode::Longest => store.reset_longest_streak(&id)?,
        ResetMode::Timeline => store.reset_timeline_data(
            &id,
            params.preserve_longest.unwrap_or(true),
            params.reset_start.unwrap_or(false),
        )?,
        ResetMode::Complete => store.reset_completely(&id)?,
    };

    let habit = outcome.habit;
    let what = match params.mode {
        ResetMode::Current => "current streak",
        ResetMode::Longest => "longest streak",
        ResetMode::Timeline => "timeline",
        ResetMode::Complete => "habit",
    };

    Ok(ResetResponse {
        success: true,
        current_streak: habit.current_streak,
        longest_streak: habit.longest_streak,
        message: format!(
            "🔄 Reset {} of '{}'. Current: {} | Best: {}",
            what,
            habit.name,
            habit.period.unit_label(habit.current_streak),
            habit.period.unit_label(habit.longest_streak)
        ),
    })
}
