/// Lazy normalization and re-derivation of habit records
///
/// Nothing runs on a timer. Every access first rolls the per-period counter
/// over if the period changed since the record was last touched, then
/// recomputes the cached streak fields from the completed-day history.

use chrono::NaiveDate;
use tracing::warn;

use crate::analytics::{calculate_momentum, MomentumSummary};
use crate::domain::{add_days, calculate_streak, Habit, Period, StreakInput, StreakSummary};

/// Roll `today_count` over to the period containing `today`
///
/// Returns whether the record changed. Completed days after `today` are
/// dropped first. For week and month habits the counter always mirrors the
/// current period's bucket size.
pub fn normalize(habit: &mut Habit, today: NaiveDate) -> bool {
    let future = habit.completed_days.split_off(&add_days(today, 1));
    if !future.is_empty() {
        warn!(
            "Dropping {} future completed day(s) of habit {} (first {})",
            future.len(),
            habit.id,
            future.iter().next().map_or_else(String::new, |d| d.to_string())
        );
    }

    let current = habit.period.key_of(today);
    let rolled_over = habit
        .last_count_date
        .map_or(true, |last| !current.contains(last));

    let count = match habit.period {
        Period::Day if rolled_over => {
            if habit.is_completed_on(today) {
                habit.target
            } else {
                0
            }
        }
        Period::Day => habit.today_count.min(habit.target),
        Period::Week | Period::Month => habit.bucket_count(current).min(habit.target),
    };

    let changed = !future.is_empty() || rolled_over || count != habit.today_count;
    habit.today_count = count;
    if rolled_over {
        habit.last_count_date = Some(today);
    }
    changed
}

/// Recompute the cached streak fields
///
/// The longest streak only ever grows here; lowering it is left to the
/// explicit reset operations.
pub fn rederive(habit: &mut Habit, today: NaiveDate) -> StreakSummary {
    let days = habit.sorted_days();
    let cuts = habit.cuts();
    let summary = calculate_streak(StreakInput {
        days: &days,
        period: habit.period,
        target: habit.target,
        today,
        cuts: &cuts,
    });

    habit.current_streak = summary.current;
    habit.last_full_period = summary.last_full_period;
    habit.longest_streak = habit.longest_streak.max(summary.current);
    summary
}

/// Momentum of a (normalized) habit
pub fn momentum(habit: &Habit, today: NaiveDate) -> MomentumSummary {
    let days = habit.sorted_days();
    let cuts = habit.cuts();
    calculate_momentum(StreakInput {
        days: &days,
        period: habit.period,
        target: habit.target,
        today,
        cuts: &cuts,
    })
}

/// Normalized and re-derived copy of a record, for reads
pub fn refreshed(habit: &Habit, today: NaiveDate) -> (Habit, StreakSummary) {
    let mut copy = habit.clone();
    normalize(&mut copy, today);
    let summary = rederive(&mut copy, today);
    (copy, summary)
}
