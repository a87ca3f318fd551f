/// In-memory storage backend
///
/// Keeps the saved snapshot as JSON values so that loading goes through the
/// same tolerant decoder as the SQLite backend. Used by `--in-memory` runs
/// and by tests, which can also make it refuse writes.

use std::cell::{Cell, RefCell};

use chrono::Utc;
use serde_json::Value;

use crate::domain::Habit;
use crate::storage::{decode_record, HabitStorage, StorageError};

#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: RefCell<Vec<Value>>,
    read_only: Cell<bool>,
    saves: Cell<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-filled with raw records, e.g. exported by an older app
    pub fn from_json(raw: &str) -> Result<Self, StorageError> {
        let records = match serde_json::from_str::<Value>(raw)? {
            Value::Array(items) => items,
            other => vec![other],
        };
        Ok(Self {
            records: RefCell::new(records),
            ..Self::default()
        })
    }

    /// Make every following `save` fail
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.set(read_only);
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }

    /// The raw records of the last successful save
    pub fn snapshot(&self) -> Vec<Value> {
        self.records.borrow().clone()
    }
}

impl HabitStorage for MemoryStorage {
    fn load(&self) -> Result<Vec<Habit>, StorageError> {
        let now = Utc::now();
        Ok(self
            .records
            .borrow()
            .iter()
            .filter_map(|record| decode_record(record, now))
            .collect())
    }

    fn save(&self, habits: &[Habit]) -> Result<(), StorageError> {
        if self.read_only.get() {
            return Err(StorageError::Connection("storage is read-only".to_string()));
        }
        let records = habits
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        *self.records.borrow_mut() = records;
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
