/// Tools for counting and taking back completions
///
/// This module implements habit_check_in, habit_undo and
/// habit_mark_yesterday. A call whose precondition does not hold (target
/// already reached, nothing to undo, ...) succeeds without changing anything.

use serde::Serialize;

use crate::domain::{add_days, format_day_key, Habit, Period};
use crate::state::{HabitStore, Outcome, StoreError};
use crate::storage::HabitStorage;
use crate::tools::HabitIdParams;

/// Response of the completion tools
#[derive(Debug, Serialize)]
pub struct CheckInResponse {
    pub applied: bool,
    pub today_count: u32,
    pub target: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub message: String,
}

/// Count one completion for today
pub fn check_in<S: HabitStorage>(
    store: &mut HabitStore<S>,
    params: HabitIdParams,
) -> Result<CheckInResponse, StoreError> {
    let outcome = store.check_in(&params.id())?;
    let message = if outcome.applied {
        if outcome.habit.is_period_complete() {
            format!(
                "🎉 '{}' complete for this {}! Streak: {}",
                outcome.habit.name,
                outcome.habit.period,
                outcome.habit.period.unit_label(outcome.habit.current_streak)
            )
        } else {
            format!("👍 '{}' {}", outcome.habit.name, progress_label(&outcome.habit))
        }
    } else if outcome.habit.is_period_complete() {
        format!("'{}' already reached its target this {}", outcome.habit.name, outcome.habit.period)
    } else {
        format!("'{}' already has a check-in for today", outcome.habit.name)
    };
    Ok(respond(outcome, message))
}

/// Take back the latest completion of the current period
pub fn undo<S: HabitStorage>(
    store: &mut HabitStore<S>,
    params: HabitIdParams,
) -> Result<CheckInResponse, StoreError> {
    let outcome = store.undo(&params.id())?;
    let message = if outcome.applied {
        format!("↩️ Undid one completion of '{}' ({})", outcome.habit.name, progress_label(&outcome.habit))
    } else {
        format!("Nothing to undo for '{}'", outcome.habit.name)
    };
    Ok(respond(outcome, message))
}

/// Record yesterday as completed
pub fn mark_yesterday<S: HabitStorage>(
    store: &mut HabitStore<S>,
    params: HabitIdParams,
) -> Result<CheckInResponse, StoreError> {
    let outcome = store.mark_yesterday(&params.id())?;
    let yesterday = add_days(store.today(), -1);
    let message = if outcome.applied {
        format!(
            "📅 Marked '{}' as done on {}. Streak: {}",
            outcome.habit.name,
            format_day_key(yesterday),
            outcome.habit.period.unit_label(outcome.habit.current_streak)
        )
    } else if outcome.habit.period == Period::Month {
        format!("'{}' is a monthly habit; yesterday cannot be marked", outcome.habit.name)
    } else {
        format!("Yesterday cannot be marked for '{}'", outcome.habit.name)
    };
    Ok(respond(outcome, message))
}

fn progress_label(habit: &Habit) -> String {
    format!("{}/{} this {}", habit.today_count, habit.target, habit.period)
}

fn respond(outcome: Outcome, message: String) -> CheckInResponse {
    let habit = outcome.habit;
    CheckInResponse {
        applied: outcome.applied,
        today_count: habit.today_count,
        target: habit.target,
        current_streak: habit.current_streak,
        longest_streak: habit.longest_streak,
        message,
    }
}
