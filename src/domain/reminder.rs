/// Reminder descriptors carried on each habit
///
/// The tracker never schedules anything itself. It stores the reminder list
/// and hands it, together with the habit's id and name, to whoever owns the
/// platform notification schedule.

use serde::{Deserialize, Serialize};

use crate::domain::HabitId;

/// Weekday indices used by reminders: 0 = Monday .. 6 = Sunday
pub const ALL_WEEKDAYS: [u8; 7] = [0, 1, 2, 3, 4, 5, 6];

/// A recurring reminder at a wall-clock time on selected weekdays
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub hour: u8,
    pub minute: u8,
    /// Weekdays (0 = Monday). Empty means every day.
    #[serde(default)]
    pub days: Vec<u8>,
}

impl Reminder {
    /// Build a reminder, clamping the time and dropping invalid weekdays
    pub fn new(hour: i64, minute: i64, days: impl IntoIterator<Item = i64>) -> Self {
        let mut days: Vec<u8> = days
            .into_iter()
            .filter(|d| (0..=6).contains(d))
            .map(|d| d as u8)
            .collect();
        days.sort_unstable();
        days.dedup();
        Self {
            hour: hour.clamp(0, 23) as u8,
            minute: minute.clamp(0, 59) as u8,
            days,
        }
    }

    /// Weekdays this reminder fires on, with the "empty means daily" fallback applied
    pub fn effective_days(&self) -> Vec<u8> {
        if self.days.is_empty() {
            ALL_WEEKDAYS.to_vec()
        } else {
            self.days.clone()
        }
    }

    /// `HH:MM` display form
    pub fn time_label(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }

    /// Short weekday list ("Mo, We, Fr")
    pub fn days_label(&self) -> String {
        const LABELS: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];
        self.effective_days()
            .iter()
            .filter_map(|d| LABELS.get(*d as usize))
            .copied()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Everything the notification collaborator needs for one habit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderPlan {
    pub habit_id: HabitId,
    pub habit_name: String,
    pub notifications: Vec<Reminder>,
}

impl ReminderPlan {
    /// Stable numeric ids of every (reminder, weekday) slot in this plan
    pub fn slot_ids(&self) -> Vec<u32> {
        self.notifications
            .iter()
            .enumerate()
            .flat_map(|(idx, reminder)| {
                reminder
                    .effective_days()
                    .into_iter()
                    .map(move |day| reminder_slot_id(&self.habit_id, idx, day))
            })
            .collect()
    }
}

/// Stable numeric id for one scheduled reminder slot
///
/// Derived from a 31-based string hash of the habit id, so cancelling a
/// schedule never needs the scheduler's own bookkeeping.
pub fn reminder_slot_id(habit_id: &HabitId, index: usize, day: u8) -> u32 {
    let hash = habit_id
        .as_str()
        .encode_utf16()
        .fold(0i32, |acc, unit| acc.wrapping_mul(31).wrapping_add(unit as i32));
    let base = hash.unsigned_abs() % 0x7f_ffff;
    base + (index as u32 + 1) * 100 + (day as u32 + 1)
}
