/// Tool for rendering a habit's check-in timeline
///
/// This module implements the habit_timeline MCP tool. The text form shows
/// one glyph per day (`.` for a missed day, otherwise the first letter of
/// the run's color); the full geometry is part of the response.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analytics::{MomentumColor, TimelineOptions, TimelineView};
use crate::domain::{format_day_key, HabitId};
use crate::state::{HabitStore, StoreError};
use crate::storage::HabitStorage;
use crate::tools::lenient_int;

const MAX_HEIGHT_PX: u32 = 1_000;
const MAX_STEP_PX: u32 = 100;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TimelineParams {
    /// ID of the habit
    pub habit_id: String,
    /// Trailing days to show; 0 or less shows the whole history
    #[serde(default, deserialize_with = "lenient_int")]
    #[schemars(with = "Option<i64>")]
    pub window_days: Option<i64>,
    /// Height of the strip in pixels (at most 1000)
    pub height_px: Option<u32>,
    /// Distance between two day ticks in pixels (at most 100)
    pub step_px: Option<u32>,
    /// Label the first day of each month
    pub show_month_labels: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct TimelineResponse {
    pub view: TimelineView,
    pub message: String,
}

/// Render the timeline, falling back to `defaults` for omitted options
pub fn get_timeline<S: HabitStorage>(
    store: &HabitStore<S>,
    params: TimelineParams,
    defaults: TimelineOptions,
) -> Result<TimelineResponse, StoreError> {
    let id = HabitId::from_string(&params.habit_id);
    let options = TimelineOptions {
        window_days: params.window_days.unwrap_or(defaults.window_days),
        height_px: params
            .height_px
            .unwrap_or(defaults.height_px)
            .clamp(1, MAX_HEIGHT_PX),
        step_px: params
            .step_px
            .unwrap_or(defaults.step_px)
            .clamp(1, MAX_STEP_PX),
        show_month_labels: params.show_month_labels.unwrap_or(defaults.show_month_labels),
    };

    let habit = store
        .habit_by_id(&id)
        .ok_or(StoreError::HabitNotFound(id))?;
    let view = store.timeline_of(&habit, options);

    let mut legend: Vec<MomentumColor> = view.colored_ticks.iter().map(|t| t.color).collect();
    legend.sort();
    legend.dedup();
    let legend = legend
        .iter()
        .map(|c| format!("{}={} {}", c.glyph(), c.name(), c.hex()))
        .collect::<Vec<_>>()
        .join(", ");

    let message = format!(
        "📈 Timeline of '{}' ({} .. {}, {} days)\n{}\n{}",
        habit.name,
        format_day_key(view.visible_start),
        format_day_key(store.today()),
        view.ticks.len(),
        view.strip(),
        if legend.is_empty() {
            "No completions in this window".to_string()
        } else {
            legend
        }
    );

    Ok(TimelineResponse { view, message })
}
