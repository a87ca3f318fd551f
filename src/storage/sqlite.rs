/// SQLite implementation of the habit storage interface
///
/// Each habit is stored as one row holding its JSON record. `save` replaces
/// the whole collection inside a single transaction, so a crash mid-save
/// leaves the previous snapshot intact.

use std::path::PathBuf;

use chrono::Utc;
use rusqlite::{params, Connection};
use serde_json::Value;

use crate::domain::Habit;
use crate::storage::{decode_record, migrations, HabitStorage, StorageError};

/// SQLite-based storage implementation
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Open (or create) the database file and run pending migrations
    pub fn new(db_path: PathBuf) -> Result<Self, StorageError> {
        let conn = Connection::open(&db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        migrations::initialize_database(&conn)?;

        tracing::info!("SQLite storage initialized at: {:?}", db_path);

        Ok(Self { conn })
    }

    /// Database that lives only as long as this value
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open in-memory database: {}", e)))?;
        migrations::initialize_database(&conn)?;
        Ok(Self { conn })
    }

    /// Number of stored rows, valid or not
    pub fn record_count(&self) -> Result<usize, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM habit_records", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Store a raw JSON payload under `id`, bypassing the typed record
    ///
    /// Used to import records written by other versions of the app.
    pub fn insert_raw(&self, id: &str, payload: &str) -> Result<(), StorageError> {
        let position: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM habit_records",
            [],
            |row| row.get(0),
        )?;
        self.conn.execute(
            "INSERT OR REPLACE INTO habit_records (id, position, payload, updated_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![id, position, payload, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

impl HabitStorage for SqliteStorage {
    fn load(&self) -> Result<Vec<Habit>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, payload FROM habit_records ORDER BY position ASC")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let now = Utc::now();
        let mut habits = Vec::new();
        for row in rows {
            let (id, payload) = row?;
            let decoded = serde_json::from_str::<Value>(&payload)
                .ok()
                .and_then(|value| decode_record(&value, now));
            match decoded {
                Some(habit) => habits.push(habit),
                None => tracing::warn!("Skipping unreadable habit record {}", id),
            }
        }

        tracing::debug!("Loaded {} habits from SQLite", habits.len());
        Ok(habits)
    }

    fn save(&self, habits: &[Habit]) -> Result<(), StorageError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM habit_records", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO habit_records (id, position, payload, updated_at)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (position, habit) in habits.iter().enumerate() {
                let payload = serde_json::to_string(habit)?;
                stmt.execute(params![
                    habit.id.as_str(),
                    position as i64,
                    payload,
                    habit.updated_at.to_rfc3339()
                ])?;
            }
        }
        tx.commit()?;

        tracing::debug!("Saved {} habits to SQLite", habits.len());
        Ok(())
    }
}
