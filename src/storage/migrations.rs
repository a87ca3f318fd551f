/// SQLite schema management
///
/// Habit records are stored as one JSON payload per row, so changes to the
/// record shape never need a schema step; the tolerant decoder fills in
/// whatever an older payload lacks. Steps here only touch the table layout.

use rusqlite::{Connection, OptionalExtension};
use tracing::info;

use crate::storage::StorageError;

/// Ordered schema steps: (version reached, summary, SQL batch)
const MIGRATIONS: &[(i32, &str, &str)] = &[(
    1,
    "habit record table",
    "CREATE TABLE IF NOT EXISTS habit_records (
        id TEXT PRIMARY KEY,
        position INTEGER NOT NULL,
        payload TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_habit_records_position
        ON habit_records (position);",
)];

/// Newest schema version this build understands
fn latest_version() -> i32 {
    MIGRATIONS.last().map_or(0, |(version, _, _)| *version)
}

/// Bring the database schema up to date
///
/// A database written by a newer build is refused instead of being
/// silently downgraded.
pub fn initialize_database(conn: &Connection) -> Result<(), StorageError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY)",
        [],
    )?;

    let found = stored_version(conn)?;
    let latest = latest_version();
    if found > latest {
        return Err(StorageError::Migration(format!(
            "database schema version {} is newer than supported version {}",
            found, latest
        )));
    }

    for (version, summary, sql) in MIGRATIONS.iter().filter(|(v, _, _)| *v > found) {
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(sql)?;
        tx.execute("DELETE FROM schema_version", [])?;
        tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
        tx.commit()?;
        info!("Applied schema v{}: {}", version, summary);
    }

    Ok(())
}

/// Recorded schema version; 0 for a fresh database
fn stored_version(conn: &Connection) -> Result<i32, StorageError> {
    let version = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get::<_, Option<i32>>(0)
        })
        .optional()?
        .flatten();
    Ok(version.unwrap_or(0))
}
