/// Reminder scheduling collaborator
///
/// The tracker only decides *what* should be reminded; delivering reminders
/// is the job of a platform scheduler behind the `ReminderScheduler` trait.
/// Slot ids are stable, so cancelling a plan needs no bookkeeping on the
/// tracker's side.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::ReminderPlan;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Scheduler unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to schedule reminders for {habit_id}: {reason}")]
    Rejected { habit_id: String, reason: String },
}

/// Platform notification schedule
#[async_trait]
pub trait ReminderScheduler: Send + Sync {
    /// Replace every scheduled slot of the plan's habit with the plan
    async fn schedule(&self, plan: &ReminderPlan) -> Result<(), SchedulerError>;

    /// Remove every scheduled slot of the plan's habit
    async fn cancel(&self, plan: &ReminderPlan) -> Result<(), SchedulerError>;
}

/// Scheduler that only logs what it would do
#[derive(Debug, Default, Clone, Copy)]
pub struct LogScheduler;

#[async_trait]
impl ReminderScheduler for LogScheduler {
    async fn schedule(&self, plan: &ReminderPlan) -> Result<(), SchedulerError> {
        for reminder in &plan.notifications {
            debug!(
                "Reminder for '{}' at {} on {}",
                plan.habit_name,
                reminder.time_label(),
                reminder.days_label()
            );
        }
        info!(
            "Scheduled {} reminder slots for '{}'",
            plan.slot_ids().len(),
            plan.habit_name
        );
        Ok(())
    }

    async fn cancel(&self, plan: &ReminderPlan) -> Result<(), SchedulerError> {
        info!(
            "Cancelled {} reminder slots for '{}'",
            plan.slot_ids().len(),
            plan.habit_name
        );
        Ok(())
    }
}

/// Schedule every plan concurrently; returns how many failed
///
/// Failures are logged and never abort the others.
pub async fn schedule_all(scheduler: Arc<dyn ReminderScheduler>, plans: &[ReminderPlan]) -> usize {
    let results = join_all(plans.iter().map(|plan| scheduler.schedule(plan))).await;

    let mut failed = 0;
    for (plan, result) in plans.iter().zip(results) {
        if let Err(e) = result {
            warn!("Could not schedule reminders for {}: {}", plan.habit_id, e);
            failed += 1;
        }
    }
    failed
}
