/// Habit state store
///
/// The store owns the in-memory habit collection, which is the authoritative
/// state for the session. Every operation normalizes the records for the
/// current day, applies its change, re-derives the streak caches and hands a
/// full snapshot to the storage backend. Saving is best effort: a failed save
/// is logged and the in-memory state is kept.

pub mod derive;

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::analytics::{render_timeline, MomentumColor, TimelineInput, TimelineOptions, TimelineView};
use crate::domain::{
    add_days, motivational_message, Clock, DomainError, Habit, HabitId, Period, Reminder,
    ReminderPlan,
};
use crate::storage::{HabitStorage, StorageError};

/// Errors returned by store operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Habit not found: {0}")]
    HabitNotFound(HabitId),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result of a mutation: the refreshed record and whether anything changed
#[derive(Debug, Clone)]
pub struct Outcome {
    pub habit: Habit,
    /// False when the operation's precondition did not hold and it was a no-op
    pub applied: bool,
}

/// Progress through the current period
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    pub count: u32,
    pub target: u32,
    /// Fraction in `[0, 1]`
    pub percent: f64,
}

/// Everything the presentation layer shows for one habit
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitStatus {
    pub habit: Habit,
    pub progress: Progress,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub historical_longest_block: u32,
    pub current_momentum_days: u32,
    pub longest_momentum_days: u32,
    /// `None` while there is no earned run
    pub momentum_color: Option<MomentumColor>,
    pub can_mark_yesterday: bool,
    pub message: String,
}

/// Owning store of all habits
pub struct HabitStore<S: HabitStorage> {
    storage: S,
    clock: Arc<dyn Clock>,
    habits: Vec<Habit>,
    snapshots: watch::Sender<Arc<[Habit]>>,
}

impl<S: HabitStorage> HabitStore<S> {
    /// Load all habits, normalize them for today and write them back
    pub fn open(storage: S, clock: Arc<dyn Clock>) -> Result<Self, StoreError> {
        let loaded = storage.load()?;
        let today = clock.today();

        let mut habits: Vec<Habit> = Vec::with_capacity(loaded.len());
        for mut habit in loaded {
            if habits.iter().any(|h| h.id == habit.id) {
                warn!("Dropping duplicate habit record {}", habit.id);
                continue;
            }
            derive::normalize(&mut habit, today);
            derive::rederive(&mut habit, today);
            habits.push(habit);
        }

        info!("Habit store opened with {} habits", habits.len());

        let initial: Arc<[Habit]> = Arc::from(habits.clone());
        let (snapshots, _) = watch::channel(initial);
        let mut store = Self {
            storage,
            clock,
            habits,
            snapshots,
        };
        store.commit();
        Ok(store)
    }

    /// Receive a fresh immutable snapshot after every commit
    pub fn subscribe(&self) -> watch::Receiver<Arc<[Habit]>> {
        self.snapshots.subscribe()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // ---- mutations ----

    /// Create a habit and return the new record
    pub fn create(
        &mut self,
        name: &str,
        target: i64,
        period: Period,
        notifications: Vec<Reminder>,
    ) -> Result<Habit, StoreError> {
        let today = self.today();
        let habit = Habit::new(name, target, period, notifications, self.clock.now(), today)?;
        info!("Created habit '{}' ({})", habit.name, habit.id);

        self.normalize_all(today);
        self.habits.push(habit.clone());
        self.commit();
        Ok(habit)
    }

    /// Count one completion for today
    pub fn check_in(&mut self, id: &HabitId) -> Result<Outcome, StoreError> {
        self.mutate(id, "check-in", |habit, today| {
            if habit.today_count >= habit.target {
                return false;
            }
            match habit.period {
                Period::Day => {
                    habit.today_count += 1;
                    if habit.today_count == habit.target {
                        habit.completed_days.insert(today);
                    }
                }
                Period::Week | Period::Month => {
                    // One contribution per calendar day
                    if !habit.completed_days.insert(today) {
                        return false;
                    }
                    let current = habit.period.key_of(today);
                    habit.today_count = habit.bucket_count(current).min(habit.target);
                }
            }
            true
        })
    }

    /// Record yesterday as completed after the fact
    pub fn mark_yesterday(&mut self, id: &HabitId) -> Result<Outcome, StoreError> {
        let clock = Arc::clone(&self.clock);
        self.mutate(id, "mark-yesterday", |habit, today| {
            if !may_mark_yesterday(habit, today, clock.as_ref()) {
                return false;
            }
            let yesterday = add_days(today, -1);
            habit.completed_days.insert(yesterday);
            if habit.period != Period::Day {
                let current = habit.period.key_of(today);
                habit.today_count = habit.bucket_count(current).min(habit.target);
            }
            true
        })
    }

    /// Take back the latest completion of the current period
    pub fn undo(&mut self, id: &HabitId) -> Result<Outcome, StoreError> {
        self.mutate(id, "undo", |habit, today| {
            if habit.today_count == 0 {
                return false;
            }
            match habit.period {
                Period::Day => {
                    if habit.today_count == habit.target {
                        habit.completed_days.remove(&today);
                    }
                    habit.today_count -= 1;
                }
                Period::Week | Period::Month => {
                    let current = habit.period.key_of(today);
                    if let Some(latest) = habit.latest_day_in(current, today) {
                        habit.completed_days.remove(&latest);
                    }
                    habit.today_count = habit.bucket_count(current).min(habit.target);
                }
            }
            true
        })
    }

    /// End the current run without touching the longest streak
    ///
    /// Older history stays in place for the timeline; a barrier and the
    /// epoch keep it from bridging into the next run.
    pub fn reset_current_streak(&mut self, id: &HabitId) -> Result<Outcome, StoreError> {
        self.mutate(id, "reset-current-streak", |habit, today| {
            match habit.period {
                Period::Day => {
                    habit.completed_days.remove(&today);
                    habit.today_count = 0;
                    habit.streak_barriers.insert(add_days(today, -1));
                    habit.streak_epoch = Some(today);
                }
                Period::Week | Period::Month => {
                    let current = habit.period.key_of(today);
                    let keep = habit.target.saturating_sub(1);
                    while habit.bucket_count(current) > keep {
                        match habit.latest_day_in(current, current.last_day()) {
                            Some(latest) => habit.completed_days.remove(&latest),
                            None => break,
                        };
                    }
                    habit.today_count = habit.bucket_count(current).min(habit.target);
                    habit.streak_barriers.insert(current.prev().last_day());
                    habit.streak_epoch = Some(current.first_day());
                }
            }
            true
        })
    }

    /// Lower the longest streak to the current one
    pub fn reset_longest_streak(&mut self, id: &HabitId) -> Result<Outcome, StoreError> {
        self.mutate(id, "reset-longest-streak", |habit, _| {
            habit.longest_streak = habit.current_streak;
            true
        })
    }

    /// Wipe the completion history
    ///
    /// The longest streak survives when `preserve_longest` is set;
    /// `reset_start` moves the creation anchor to now.
    pub fn reset_timeline_data(
        &mut self,
        id: &HabitId,
        preserve_longest: bool,
        reset_start: bool,
    ) -> Result<Outcome, StoreError> {
        let now = self.clock.now();
        self.mutate(id, "reset-timeline", |habit, _| {
            habit.completed_days.clear();
            habit.streak_barriers.clear();
            habit.streak_epoch = None;
            habit.today_count = 0;
            habit.current_streak = 0;
            if !preserve_longest {
                habit.longest_streak = 0;
            }
            if reset_start {
                habit.created_at = now;
            }
            true
        })
    }

    /// Turn the habit into a fresh one with the same id, name and target
    pub fn reset_completely(&mut self, id: &HabitId) -> Result<Outcome, StoreError> {
        let now = self.clock.now();
        self.mutate(id, "reset-completely", |habit, today| {
            habit.completed_days.clear();
            habit.streak_barriers.clear();
            habit.streak_epoch = None;
            habit.today_count = 0;
            habit.last_count_date = Some(today);
            habit.current_streak = 0;
            habit.longest_streak = 0;
            habit.created_at = now;
            true
        })
    }

    /// Replace the reminder list
    pub fn update_notifications(
        &mut self,
        id: &HabitId,
        notifications: Vec<Reminder>,
    ) -> Result<Outcome, StoreError> {
        self.mutate(id, "update-notifications", move |habit, _| {
            habit.notifications = notifications;
            true
        })
    }

    /// Remove a habit and return the removed record
    ///
    /// Cancelling its reminder schedule is left to the caller.
    pub fn delete(&mut self, id: &HabitId) -> Result<Habit, StoreError> {
        let index = self.position(id)?;
        let removed = self.habits.remove(index);
        info!("Deleted habit '{}' ({})", removed.name, removed.id);

        let today = self.today();
        self.normalize_all(today);
        self.commit();
        Ok(removed)
    }

    // ---- reads ----

    /// Normalized copy of one habit
    pub fn habit_by_id(&self, id: &HabitId) -> Option<Habit> {
        let today = self.today();
        self.find(id).map(|habit| derive::refreshed(habit, today).0)
    }

    /// Normalized copies of all habits, in creation order
    pub fn habits(&self) -> Vec<Habit> {
        let today = self.today();
        self.habits
            .iter()
            .map(|habit| derive::refreshed(habit, today).0)
            .collect()
    }

    pub fn progress(&self, id: &HabitId) -> Option<Progress> {
        self.habit_by_id(id).map(|habit| progress_of(&habit))
    }

    pub fn current_streak(&self, id: &HabitId) -> Option<u32> {
        self.habit_by_id(id).map(|habit| habit.current_streak)
    }

    pub fn longest_streak(&self, id: &HabitId) -> Option<u32> {
        self.habit_by_id(id).map(|habit| habit.longest_streak)
    }

    pub fn current_momentum_days(&self, id: &HabitId) -> Option<u32> {
        let today = self.today();
        self.habit_by_id(id)
            .map(|habit| derive::momentum(&habit, today).current_days)
    }

    pub fn longest_momentum_days(&self, id: &HabitId) -> Option<u32> {
        let today = self.today();
        self.habit_by_id(id)
            .map(|habit| derive::momentum(&habit, today).longest_days)
    }

    /// Whether `mark_yesterday` would apply right now
    pub fn can_mark_yesterday(&self, id: &HabitId) -> bool {
        let today = self.today();
        self.habit_by_id(id)
            .map_or(false, |habit| may_mark_yesterday(&habit, today, self.clock.as_ref()))
    }

    /// Full status of one habit
    pub fn status(&self, id: &HabitId) -> Option<HabitStatus> {
        let today = self.today();
        let (habit, summary) = derive::refreshed(self.find(id)?, today);
        let momentum = derive::momentum(&habit, today);

        Some(HabitStatus {
            progress: progress_of(&habit),
            current_streak: habit.current_streak,
            longest_streak: habit.longest_streak,
            historical_longest_block: summary.historical_longest_block,
            current_momentum_days: momentum.current_days,
            longest_momentum_days: momentum.longest_days,
            momentum_color: (momentum.current_days > 0)
                .then(|| MomentumColor::for_days(momentum.current_days)),
            can_mark_yesterday: may_mark_yesterday(&habit, today, self.clock.as_ref()),
            message: motivational_message(habit.current_streak, habit.period),
            habit,
        })
    }

    /// Colored timeline of one habit
    pub fn timeline(&self, id: &HabitId, options: TimelineOptions) -> Option<TimelineView> {
        self.habit_by_id(id)
            .map(|habit| self.timeline_of(&habit, options))
    }

    /// Colored timeline of a record already read from this store
    pub fn timeline_of(&self, habit: &Habit, options: TimelineOptions) -> TimelineView {
        let days = habit.sorted_days();
        let cuts = habit.cuts();
        render_timeline(
            TimelineInput {
                days: &days,
                period: habit.period,
                target: habit.target,
                cuts: &cuts,
                created: Some(self.clock.day_of(habit.created_at)),
                today: self.today(),
            },
            options,
        )
    }

    pub fn reminder_plan(&self, id: &HabitId) -> Option<ReminderPlan> {
        self.find(id).map(Habit::reminder_plan)
    }

    /// Reminder plans of every habit
    pub fn reminder_plans(&self) -> Vec<ReminderPlan> {
        self.habits.iter().map(Habit::reminder_plan).collect()
    }

    // ---- internals ----

    fn find(&self, id: &HabitId) -> Option<&Habit> {
        self.habits.iter().find(|habit| &habit.id == id)
    }

    fn position(&self, id: &HabitId) -> Result<usize, StoreError> {
        self.habits
            .iter()
            .position(|habit| &habit.id == id)
            .ok_or_else(|| StoreError::HabitNotFound(id.clone()))
    }

    fn normalize_all(&mut self, today: NaiveDate) {
        for habit in &mut self.habits {
            derive::normalize(habit, today);
            derive::rederive(habit, today);
        }
    }

    /// Normalize, apply `change` to one habit, re-derive and commit
    fn mutate<F>(&mut self, id: &HabitId, operation: &str, change: F) -> Result<Outcome, StoreError>
    where
        F: FnOnce(&mut Habit, NaiveDate) -> bool,
    {
        let index = self.position(id)?;
        let today = self.today();
        let now = self.clock.now();
        self.normalize_all(today);

        let habit = &mut self.habits[index];
        let applied = change(habit, today);
        if applied {
            habit.updated_at = now;
        }
        derive::rederive(habit, today);
        debug!(
            "{} on {}: applied={} current={} longest={}",
            operation, habit.id, applied, habit.current_streak, habit.longest_streak
        );

        let outcome = Outcome {
            habit: habit.clone(),
            applied,
        };
        self.commit();
        Ok(outcome)
    }

    /// Persist and publish the current state
    fn commit(&mut self) {
        if let Err(e) = self.storage.save(&self.habits) {
            warn!("Failed to save habits, keeping in-memory state: {}", e);
        }
        self.snapshots.send_replace(Arc::from(self.habits.clone()));
    }
}

fn progress_of(habit: &Habit) -> Progress {
    let count = habit.today_count.min(habit.target);
    Progress {
        count,
        target: habit.target,
        percent: habit.progress_fraction(),
    }
}

/// Yesterday can be marked for day and week habits that already existed
/// yesterday and are not yet completed for it
fn may_mark_yesterday(habit: &Habit, today: NaiveDate, clock: &dyn Clock) -> bool {
    let yesterday = add_days(today, -1);
    habit.period != Period::Month
        && !habit.is_completed_on(yesterday)
        && clock.day_of(habit.created_at) <= yesterday
}
