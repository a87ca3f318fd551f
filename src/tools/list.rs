/// Tool for listing all habits
///
/// This module implements the habit_list MCP tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analytics::MomentumColor;
use crate::domain::Period;
use crate::state::{HabitStore, StoreError};
use crate::storage::HabitStorage;

/// Parameters for listing habits
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListHabitsParams {
    /// Only habits with this period: day, week or month
    pub period: Option<String>,
    /// Sort by: 'name', 'streak', 'momentum' or 'created' (default: created)
    pub sort_by: Option<String>,
}

/// Information about a habit in the list
#[derive(Debug, Serialize)]
pub struct HabitSummary {
    pub habit_id: String,
    pub name: String,
    pub period: Period,
    pub today_count: u32,
    pub target: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub momentum_days: u32,
    pub momentum_color: Option<MomentumColor>,
}

/// Summary statistics for all listed habits
#[derive(Debug, Serialize)]
pub struct HabitListSummary {
    pub total_habits: u32,
    /// Habits with a running streak
    pub active_streaks: u32,
    /// Habits whose current period target is reached
    pub completed_now: u32,
}

/// Response from listing habits
#[derive(Debug, Serialize)]
pub struct ListHabitsResponse {
    pub habits: Vec<HabitSummary>,
    pub summary: HabitListSummary,
    pub message: String,
}

/// List habits from the store
pub fn list_habits<S: HabitStorage>(
    store: &HabitStore<S>,
    params: ListHabitsParams,
) -> Result<ListHabitsResponse, StoreError> {
    let period_filter = params.period.as_deref().map(Period::parse_lenient);

    let mut summaries: Vec<HabitSummary> = store
        .habits()
        .iter()
        .filter(|habit| period_filter.map_or(true, |p| habit.period == p))
        .filter_map(|habit| store.status(&habit.id))
        .map(|status| HabitSummary {
            habit_id: status.habit.id.to_string(),
            name: status.habit.name.clone(),
            period: status.habit.period,
            today_count: status.progress.count,
            target: status.progress.target,
            current_streak: status.current_streak,
            longest_streak: status.longest_streak,
            momentum_days: status.current_momentum_days,
            momentum_color: status.momentum_color,
        })
        .collect();

    match params.sort_by.as_deref().map(str::trim) {
        Some("name") => summaries.sort_by_key(|h| h.name.to_lowercase()),
        Some("streak") => summaries.sort_by(|a, b| b.current_streak.cmp(&a.current_streak)),
        Some("momentum") => summaries.sort_by(|a, b| b.momentum_days.cmp(&a.momentum_days)),
        _ => {} // creation order
    }

    let summary = HabitListSummary {
        total_habits: summaries.len() as u32,
        active_streaks: summaries.iter().filter(|h| h.current_streak > 0).count() as u32,
        completed_now: summaries.iter().filter(|h| h.today_count >= h.target).count() as u32,
    };

    let message = if summaries.is_empty() {
        "No habits found. Create your first habit to get started!".to_string()
    } else {
        let lines = summaries
            .iter()
            .map(|h| {
                format!(
                    "🎯 **{}** ({})\n   {}/{} this {} | 🔥 Streak: {} | Best: {} | Momentum: {} days{}",
                    h.name,
                    h.habit_id,
                    h.today_count,
                    h.target,
                    h.period,
                    h.period.unit_label(h.current_streak),
                    h.period.unit_label(h.longest_streak),
                    h.momentum_days,
                    h.momentum_color.map_or(String::new(), |c| format!(" ({})", c.name()))
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");
        format!(
            "📋 **Habit Summary** ({} habits, {} streaks running, {} done for now)\n\n{}",
            summary.total_habits, summary.active_streaks, summary.completed_now, lines
        )
    };

    Ok(ListHabitsResponse {
        habits: summaries,
        summary,
        message,
    })
}
