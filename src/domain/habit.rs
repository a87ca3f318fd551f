/// Habit entity and related functionality
///
/// This module defines the Habit record, the only persisted entity. Its
/// completed-day set is the ground truth; the streak fields are caches that
/// the state store re-derives after every load and mutation.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    coerce_target, DomainError, HabitId, Period, PeriodKey, Reminder, ReminderPlan, StreakCuts,
};

/// A habit the user wants to repeat `target` times per period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// Display name (e.g., "Morning Run", "Read for 30min")
    pub name: String,
    /// Completions required per period, at least 1
    pub target: u32,
    /// Recurrence unit of the target
    pub period: Period,
    /// Completions in the current period instance, within `0..=target`
    pub today_count: u32,
    /// Day on which `today_count` was last touched; detects period rollover
    pub last_count_date: Option<NaiveDate>,
    /// Local days on which the habit was completed
    pub completed_days: BTreeSet<NaiveDate>,
    /// Cached: consecutive qualifying periods ending now
    pub current_streak: u32,
    /// Best current streak ever observed; only explicit resets lower it
    pub longest_streak: u32,
    /// Cached: most recent full period at or before the current one
    pub last_full_period: Option<PeriodKey>,
    /// Days a streak scan may not reach back across
    pub streak_barriers: BTreeSet<NaiveDate>,
    /// Inclusive start of the currently active run
    pub streak_epoch: Option<NaiveDate>,
    /// Reminder descriptors, carried for the notification scheduler
    pub notifications: Vec<Reminder>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Habit {
    /// Create a new habit with an empty history
    ///
    /// The name must be non-empty after trimming; the target is coerced to
    /// at least 1.
    pub fn new(
        name: &str,
        target: i64,
        period: Period,
        notifications: Vec<Reminder>,
        now: DateTime<Utc>,
        today: NaiveDate,
    ) -> Result<Self, DomainError> {
        let name = Self::validate_name(name)?;

        Ok(Self {
            id: HabitId::new(),
            name,
            target: coerce_target(target),
            period,
            today_count: 0,
            last_count_date: Some(today),
            completed_days: BTreeSet::new(),
            current_streak: 0,
            longest_streak: 0,
            last_full_period: None,
            streak_barriers: BTreeSet::new(),
            streak_epoch: None,
            notifications,
            created_at: now,
            updated_at: now,
        })
    }

    /// Completed days in ascending order
    pub fn sorted_days(&self) -> Vec<NaiveDate> {
        self.completed_days.iter().copied().collect()
    }

    pub fn is_completed_on(&self, day: NaiveDate) -> bool {
        self.completed_days.contains(&day)
    }

    /// Number of completed days inside a period instance
    pub fn bucket_count(&self, key: PeriodKey) -> u32 {
        self.completed_days
            .range(key.first_day()..=key.last_day())
            .count() as u32
    }

    /// Latest completed day inside a period instance that is not after `until`
    pub fn latest_day_in(&self, key: PeriodKey, until: NaiveDate) -> Option<NaiveDate> {
        let end = key.last_day().min(until);
        if end < key.first_day() {
            return None;
        }
        self.completed_days
            .range(key.first_day()..=end)
            .next_back()
            .copied()
    }

    /// Barrier and epoch markers that truncate the current run
    pub fn cuts(&self) -> StreakCuts {
        StreakCuts::new(self.streak_barriers.iter().copied(), self.streak_epoch)
    }

    /// Progress through the current period as a fraction in `[0, 1]`
    pub fn progress_fraction(&self) -> f64 {
        let count = self.today_count.min(self.target) as f64;
        (count / self.target.max(1) as f64).clamp(0.0, 1.0)
    }

    pub fn is_period_complete(&self) -> bool {
        self.today_count >= self.target
    }

    /// Reminder hand-off for the notification scheduler
    pub fn reminder_plan(&self) -> ReminderPlan {
        ReminderPlan {
            habit_id: self.id.clone(),
            habit_name: self.name.clone(),
            notifications: self.notifications.clone(),
        }
    }

    /// Validate habit name according to business rules
    fn validate_name(name: &str) -> Result<String, DomainError> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be empty".to_string()
            ));
        }

        if trimmed.chars().count() > 100 {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be longer than 100 characters".to_string()
            ));
        }

        Ok(trimmed.to_string())
    }
}
