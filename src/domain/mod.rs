/// Domain module containing core business logic and data types
///
/// This module defines the Habit record, calendar keys, reminders and the
/// streak calculation. These types represent the fundamental concepts in our
/// habit tracking system and are free of any storage or protocol concerns.

pub mod calendar;
pub mod habit;
pub mod reminder;
pub mod streak;
pub mod types;

// Re-export public types for easy access
pub use calendar::*;
pub use habit::*;
pub use reminder::*;
pub use streak::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid habit name: {0}")]
    InvalidHabitName(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}
