/// Basic integration tests: server setup and persistence
use std::sync::Arc;

use habit_momentum_mcp::*;
use serde_json::json;
use tempfile::tempdir;

use super::{day, day_span, empty_store, seeded_store};

#[tokio::test]
async fn test_server_basic_workflow() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut server = HabitTrackerServer::new(dir.path().join("habits.db"))
        .expect("Failed to create server");

    let habit = server
        .store_mut()
        .create("Morning Run", 1, Period::Day, Vec::new())
        .expect("Failed to create habit");
    server.store_mut().check_in(&habit.id).expect("check-in");

    assert_eq!(server.store().habits().len(), 1);
    assert_eq!(server.store().current_streak(&habit.id), Some(1));
    assert_eq!(server.timeline_defaults(), TimelineOptions::default());
}

#[test]
fn test_database_persistence() {
    let dir = tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("habits.db");

    let id = {
        let mut server = HabitTrackerServer::new(db_path.clone()).expect("first server");
        let habit = server
            .store_mut()
            .create("Read", 2, Period::Week, vec![Reminder::new(20, 0, vec![0, 3])])
            .expect("create");
        server.store_mut().check_in(&habit.id).expect("check-in");
        habit.id
    };

    let server = HabitTrackerServer::new(db_path).expect("second server");
    let habit = server.store().habit_by_id(&id).expect("habit survives restart");
    assert_eq!(habit.name, "Read");
    assert_eq!(habit.period, Period::Week);
    assert_eq!(habit.completed_days.len(), 1);
    assert_eq!(habit.notifications.len(), 1);
}

#[test]
fn test_storage_interface() {
    let storage = SqliteStorage::in_memory().expect("Failed to create storage");
    let _: &dyn HabitStorage = &storage;
    assert!(storage.load().expect("load").is_empty());
}

#[test]
fn test_failed_saves_keep_in_memory_state() {
    let (mut store, _) = empty_store("2025-01-06");
    let id = store.create("Water", 1, Period::Day, Vec::new()).unwrap().id;
    let saves_before = store.storage().save_count();

    store.storage().set_read_only(true);
    let outcome = store.check_in(&id).expect("check-in still succeeds");
    assert!(outcome.applied);
    assert_eq!(store.current_streak(&id), Some(1));
    assert_eq!(store.storage().save_count(), saves_before);

    // The next successful commit writes the latest state
    store.storage().set_read_only(false);
    store.undo(&id).unwrap();
    store.check_in(&id).unwrap();
    let persisted = store.storage().load().unwrap();
    assert!(persisted[0].is_completed_on(day("2025-01-06")));
}

#[test]
fn test_load_normalize_save_is_idempotent() {
    let records = json!([{
        "id": "legacy-1",
        "name": "  Stretch  ",
        "repeats": "2",
        "todayCount": 5,
        "lastCountDate": "2025-01-03",
        "completedDays": day_span("2025-01-01", 3),
        "currentStreak": 99,
        "longestStreak": 4
    }]);
    let (store, _) = seeded_store("2025-01-04", records);
    let first = store.storage().snapshot();

    let habit = store.habit_by_id(&HabitId::from_string("legacy-1")).unwrap();
    assert_eq!(habit.name, "Stretch");
    assert_eq!(habit.target, 2);
    assert_eq!(habit.today_count, 0);
    assert_eq!(habit.current_streak, 3);
    assert_eq!(habit.longest_streak, 4);

    // Re-open over what was just written
    let storage = MemoryStorage::from_json(&serde_json::Value::Array(first.clone()).to_string()).unwrap();
    let clock = Arc::new(FixedClock::at(day("2025-01-04")));
    let reopened = HabitStore::open(storage, clock).unwrap();
    assert_eq!(reopened.storage().snapshot(), first);
}

#[test]
fn test_duplicate_ids_are_dropped_on_load() {
    let records = json!([
        {"id": "same", "name": "First"},
        {"id": "same", "name": "Second"}
    ]);
    let (store, _) = seeded_store("2025-01-04", records);
    let habits = store.habits();
    assert_eq!(habits.len(), 1);
    assert_eq!(habits[0].name, "First");
}
