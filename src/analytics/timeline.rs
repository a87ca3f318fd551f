/// Timeline model for the check-in history
///
/// Colors are assigned over the whole history first and only then is the
/// visible window cut out, so a day keeps its color no matter how much of
/// the past is scrolled into view.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::analytics::{full_blocks, MomentumColor};
use crate::domain::{add_days, Period, PeriodBuckets, PeriodKey, StreakCuts};

/// Layout options of a timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineOptions {
    /// Trailing days to show; zero or negative shows the whole history
    pub window_days: i64,
    pub height_px: u32,
    /// Horizontal distance between two ticks
    pub step_px: u32,
    pub show_month_labels: bool,
}

impl Default for TimelineOptions {
    fn default() -> Self {
        Self {
            window_days: 90,
            height_px: 20,
            step_px: 6,
            show_month_labels: true,
        }
    }
}

/// Everything the timeline needs to know about one habit
#[derive(Debug, Clone, Copy)]
pub struct TimelineInput<'a> {
    pub days: &'a [NaiveDate],
    pub period: Period,
    pub target: u32,
    pub cuts: &'a StreakCuts,
    /// Local creation day of the habit, if known
    pub created: Option<NaiveDate>,
    pub today: NaiveDate,
}

/// One day slot on the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tick {
    pub day: NaiveDate,
    pub x: u32,
    pub completed: bool,
}

/// A completed day with its block color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColoredTick {
    pub day: NaiveDate,
    pub x: u32,
    pub color: MomentumColor,
}

/// Month name placed under the first day of a month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthLabel {
    pub x: u32,
    pub text: String,
}

/// Geometry and colors of a rendered timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineView {
    pub width_px: u32,
    pub height_px: u32,
    pub baseline_y: i32,
    pub tick_top: i32,
    pub tick_bottom: i32,
    /// First day of the colored history
    pub global_start: NaiveDate,
    /// First day shown
    pub visible_start: NaiveDate,
    pub ticks: Vec<Tick>,
    pub colored_ticks: Vec<ColoredTick>,
    pub month_labels: Vec<MonthLabel>,
}

impl TimelineView {
    /// Color of a visible completed day
    pub fn color_of(&self, day: NaiveDate) -> Option<MomentumColor> {
        self.colored_ticks
            .iter()
            .find(|tick| tick.day == day)
            .map(|tick| tick.color)
    }

    /// One character per visible day: a color glyph or `.` for a missed day
    pub fn strip(&self) -> String {
        let colors: HashMap<NaiveDate, MomentumColor> = self
            .colored_ticks
            .iter()
            .map(|tick| (tick.day, tick.color))
            .collect();
        self.ticks
            .iter()
            .map(|tick| colors.get(&tick.day).map_or('.', MomentumColor::glyph))
            .collect()
    }
}

/// Build the timeline model
pub fn render_timeline(input: TimelineInput<'_>, options: TimelineOptions) -> TimelineView {
    let today = input.today;
    let earliest_done = input.days.iter().min().copied();

    let earliest = match (input.created, earliest_done) {
        (Some(created), Some(done)) => created.min(done),
        (Some(created), None) => created,
        (None, Some(done)) => done,
        (None, None) => today,
    }
    .min(today);

    // Clamp to the history span before any date arithmetic
    let span = (today - earliest).num_days() + 1;
    let visible_start = if options.window_days > 0 && options.window_days < span {
        add_days(today, -(options.window_days - 1))
    } else {
        earliest
    };

    let colors = color_history(input);

    let step = options.step_px;
    let mut ticks = Vec::new();
    let mut colored_ticks = Vec::new();
    let mut month_labels = Vec::new();

    let mut cursor = visible_start;
    let mut index: u32 = 0;
    while cursor <= today {
        let x = index.saturating_mul(step).saturating_add(step / 2);
        let completed = colors.contains_key(&cursor);
        ticks.push(Tick {
            day: cursor,
            x,
            completed,
        });
        if let Some(color) = colors.get(&cursor) {
            colored_ticks.push(ColoredTick {
                day: cursor,
                x,
                color: *color,
            });
        }
        if options.show_month_labels && cursor.day() == 1 {
            month_labels.push(MonthLabel {
                x,
                text: cursor.format("%b").to_string(),
            });
        }
        cursor = add_days(cursor, 1);
        index = index.saturating_add(1);
    }

    let height_px = options.height_px;
    let baseline_y = (height_px / 2) as i32;
    let tick_half = ((height_px as f64 * 0.35).round() as i32).max(6);

    TimelineView {
        width_px: index.saturating_mul(step).max(1),
        height_px,
        baseline_y,
        tick_top: baseline_y.saturating_sub(tick_half),
        tick_bottom: baseline_y.saturating_add(tick_half),
        global_start: earliest,
        visible_start,
        ticks,
        colored_ticks,
        month_labels,
    }
}

/// Color every completed day in the history by the block it belongs to
///
/// Week and month blocks absorb the current period when it is partially
/// filled and directly follows the last block. Completed days outside any
/// block (an unfinished period) fall back to the lowest color.
fn color_history(input: TimelineInput<'_>) -> HashMap<NaiveDate, MomentumColor> {
    let buckets = PeriodBuckets::new(input.days, input.period, input.target);
    let mut blocks = full_blocks(&buckets, input.cuts);

    let current = input.period.key_of(input.today);
    if buckets.count(current) > 0 && !buckets.is_full(current) {
        if let Some(block) = blocks.last_mut() {
            let follows = block
                .last()
                .map_or(false, |last| last.next() == current && !input.cuts.separates(last, current));
            if follows {
                block.periods.push(current);
                block.total_days += buckets.count(current);
            }
        }
    }

    let mut color_by_period: HashMap<PeriodKey, MomentumColor> = HashMap::new();
    for block in &blocks {
        let color = MomentumColor::for_days(block.total_days);
        for key in &block.periods {
            color_by_period.insert(*key, color);
        }
    }

    input
        .days
        .iter()
        .filter(|day| **day <= input.today)
        .map(|day| {
            let color = color_by_period
                .get(&input.period.key_of(*day))
                .copied()
                .unwrap_or(MomentumColor::Yellow);
            (*day, color)
        })
        .collect()
}
