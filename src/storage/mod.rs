/// Storage layer for persisting habit records
///
/// The tracker keeps its whole state in memory and hands complete snapshots
/// to a storage backend. Backends must accept partial or legacy-shaped
/// records on load by filling defaults, so that loading, normalizing and
/// saving back can be repeated safely.

pub mod memory;
pub mod migrations;
pub mod record;
pub mod sqlite;

// Re-export the main storage types
pub use memory::MemoryStorage;
pub use record::{decode_record, decode_records};
pub use sqlite::SqliteStorage;

use thiserror::Error;

use crate::domain::Habit;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Trait defining the persistence collaborator
///
/// This trait allows us to swap SQLite for another backend (tests use an
/// in-memory one) while keeping the same interface.
pub trait HabitStorage {
    /// Load every stored habit, filling defaults for missing fields
    fn load(&self) -> Result<Vec<Habit>, StorageError>;

    /// Replace the stored collection with `habits`
    fn save(&self, habits: &[Habit]) -> Result<(), StorageError>;
}

impl<S: HabitStorage + ?Sized> HabitStorage for Box<S> {
    fn load(&self) -> Result<Vec<Habit>, StorageError> {
        (**self).load()
    }

    fn save(&self, habits: &[Habit]) -> Result<(), StorageError> {
        (**self).save(habits)
    }
}
