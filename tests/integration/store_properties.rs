/// Behaviour of the habit store across days, periods and resets
use habit_momentum_mcp::*;
use serde_json::json;

use super::{day, day_span, empty_store, seeded_store};

fn id(raw: &str) -> HabitId {
    HabitId::from_string(raw)
}

#[test]
fn test_day_streak_survives_until_today_and_extends_on_check_in() {
    let records = json!([{
        "id": "a",
        "name": "A",
        "target": 1,
        "period": "day",
        "completedDays": day_span("2025-01-01", 5),
        "createdAt": "2024-12-31T08:00:00Z"
    }]);
    let (mut store, _) = seeded_store("2025-01-06", records);

    assert_eq!(store.current_streak(&id("a")), Some(5));
    let outcome = store.check_in(&id("a")).unwrap();
    assert_eq!(outcome.habit.current_streak, 6);
    assert_eq!(store.longest_streak(&id("a")), Some(6));
}

#[test]
fn test_day_streak_breaks_after_a_missed_day() {
    let records = json!([{
        "id": "a",
        "name": "A",
        "completedDays": day_span("2025-01-01", 5)
    }]);
    let (store, clock) = seeded_store("2025-01-06", records);
    clock.set_today(day("2025-01-07"));
    assert_eq!(store.current_streak(&id("a")), Some(0));
    // The record still remembers the best run
    assert_eq!(store.longest_streak(&id("a")), Some(5));
}

#[test]
fn test_check_in_is_idempotent_at_target() {
    let (mut store, _) = empty_store("2025-01-06");
    let habit = store.create("Push-ups", 3, Period::Day, Vec::new()).unwrap();
    for _ in 0..3 {
        assert!(store.check_in(&habit.id).unwrap().applied);
    }
    let full = store.habit_by_id(&habit.id).unwrap();

    for _ in 0..5 {
        let outcome = store.check_in(&habit.id).unwrap();
        assert!(!outcome.applied);
        assert_eq!(outcome.habit.completed_days, full.completed_days);
        assert_eq!(outcome.habit.current_streak, full.current_streak);
        assert_eq!(outcome.habit.longest_streak, full.longest_streak);
        assert_eq!(outcome.habit.today_count, 3);
    }
    let progress = store.progress(&habit.id).unwrap();
    assert_eq!(progress.count, 3);
    assert!((progress.percent - 1.0).abs() < f64::EPSILON);
}

#[test]
fn test_week_streak_over_iso_weeks() {
    let (mut store, clock) = empty_store("2025-03-03");
    let habit = store.create("Gym", 3, Period::Week, Vec::new()).unwrap();

    // 2025-W10: Monday to Wednesday
    for offset in 0..3 {
        clock.set_today(add_days(day("2025-03-03"), offset));
        store.check_in(&habit.id).unwrap();
    }
    assert_eq!(store.current_streak(&habit.id), Some(1));

    // 2025-W11: Monday to Wednesday
    for offset in 0..3 {
        clock.set_today(add_days(day("2025-03-10"), offset));
        store.check_in(&habit.id).unwrap();
    }
    assert_eq!(store.current_streak(&habit.id), Some(2));
    assert_eq!(store.current_momentum_days(&habit.id), Some(6));

    // 2025-W12 starts with zero completions
    clock.set_today(day("2025-03-17"));
    assert_eq!(store.current_streak(&habit.id), Some(0));
    assert_eq!(store.current_momentum_days(&habit.id), Some(0));
    assert_eq!(store.longest_streak(&habit.id), Some(2));
    assert_eq!(store.progress(&habit.id).unwrap().count, 0);
}

#[test]
fn test_completed_days_after_today_are_ignored_on_open() {
    let records = json!([{
        "id": "f",
        "name": "Climb",
        "target": 3,
        "period": "week",
        "completedDays": day_span("2025-03-18", 3),
        "currentStreak": 1,
        "todayCount": 3,
        "createdAt": "2025-03-01T08:00:00Z"
    }]);
    // Monday of 2025-W12; the stored days are Tuesday to Thursday
    let (store, _) = seeded_store("2025-03-17", records);

    assert_eq!(store.current_streak(&id("f")), Some(0));
    assert_eq!(store.progress(&id("f")).unwrap().count, 0);
    let habit = store.habit_by_id(&id("f")).unwrap();
    assert!(habit.completed_days.is_empty());
    assert_eq!(habit.today_count, 0);
    assert_eq!(habit.longest_streak, 0);
}

#[test]
fn test_week_check_in_counts_each_day_once() {
    let (mut store, _) = empty_store("2025-03-12");
    let habit = store.create("Swim", 2, Period::Week, Vec::new()).unwrap();

    assert!(store.check_in(&habit.id).unwrap().applied);
    let again = store.check_in(&habit.id).unwrap();
    assert!(!again.applied);
    assert_eq!(again.habit.today_count, 1);

    let undone = store.undo(&habit.id).unwrap();
    assert!(undone.applied);
    assert!(undone.habit.completed_days.is_empty());
}

#[test]
fn test_reset_current_streak_keeps_longest_and_blocks_bridging() {
    let records = json!([{
        "id": "r",
        "name": "Meditate",
        "completedDays": day_span("2025-01-01", 40),
        "createdAt": "2024-12-01T08:00:00Z"
    }]);
    let (mut store, clock) = seeded_store("2025-02-09", records);
    assert_eq!(store.current_streak(&id("r")), Some(40));
    assert_eq!(store.longest_streak(&id("r")), Some(40));

    let reset = store.reset_current_streak(&id("r")).unwrap();
    assert_eq!(reset.habit.current_streak, 0);
    assert_eq!(reset.habit.longest_streak, 40);
    // History before today stays for the timeline
    assert!(reset.habit.is_completed_on(day("2025-02-08")));

    let fresh = store.check_in(&id("r")).unwrap();
    assert_eq!(fresh.habit.current_streak, 1);
    assert_eq!(fresh.habit.longest_streak, 40);
    assert_eq!(store.current_momentum_days(&id("r")), Some(1));

    clock.advance_days(1);
    assert_eq!(store.check_in(&id("r")).unwrap().habit.current_streak, 2);
}

#[test]
fn test_week_reset_trims_current_week() {
    let mut days = day_span("2025-03-03", 3);
    days.extend(day_span("2025-03-10", 3));
    let records = json!([{
        "id": "w",
        "name": "Yoga",
        "target": 3,
        "period": "week",
        "completedDays": days,
        "createdAt": "2025-03-01T08:00:00Z"
    }]);
    let (mut store, _) = seeded_store("2025-03-12", records);
    assert_eq!(store.current_streak(&id("w")), Some(2));

    let reset = store.reset_current_streak(&id("w")).unwrap();
    assert_eq!(reset.habit.current_streak, 0);
    assert_eq!(reset.habit.longest_streak, 2);
    assert_eq!(reset.habit.today_count, 2);
    assert!(!reset.habit.is_completed_on(day("2025-03-12")));

    // Refilling the week starts a new run instead of resuming the old one
    let refilled = store.check_in(&id("w")).unwrap();
    assert!(refilled.applied);
    assert_eq!(refilled.habit.current_streak, 1);
}

#[test]
fn test_longest_streak_never_decreases_without_explicit_reset() {
    let (mut store, clock) = empty_store("2025-01-01");
    let habit = store.create("Journal", 1, Period::Day, Vec::new()).unwrap();
    let mut best = 0;

    let mut observe = |store: &HabitStore<MemoryStorage>| {
        let longest = store.longest_streak(&habit.id).unwrap();
        assert!(longest >= best, "longest dropped from {} to {}", best, longest);
        best = longest;
    };

    for step in 0..30 {
        clock.set_today(add_days(day("2025-01-01"), step));
        match step % 7 {
            0 | 1 | 2 | 4 => {
                store.check_in(&habit.id).unwrap();
            }
            3 => {
                store.check_in(&habit.id).unwrap();
                store.undo(&habit.id).unwrap();
            }
            5 => {
                store.mark_yesterday(&habit.id).unwrap();
                store.reset_current_streak(&habit.id).unwrap();
            }
            _ => {
                store.reset_timeline_data(&habit.id, true, false).unwrap();
            }
        }
        observe(&store);
    }
    assert!(best >= 3);
}

#[test]
fn test_explicit_resets() {
    let records = json!([{
        "id": "x",
        "name": "Walk",
        "completedDays": day_span("2025-01-01", 10),
        "longestStreak": 25,
        "streakBarriers": ["2024-12-01"],
        "createdAt": "2024-11-01T08:00:00Z"
    }]);
    let (mut store, _) = seeded_store("2025-01-10", records);

    let longest = store.reset_longest_streak(&id("x")).unwrap();
    assert_eq!(longest.habit.longest_streak, 10);

    let wiped = store.reset_timeline_data(&id("x"), true, true).unwrap();
    assert!(wiped.habit.completed_days.is_empty());
    assert!(wiped.habit.streak_barriers.is_empty());
    assert_eq!(wiped.habit.current_streak, 0);
    assert_eq!(wiped.habit.longest_streak, 10);
    assert_eq!(wiped.habit.created_at.date_naive(), day("2025-01-10"));

    let dropped = store.reset_timeline_data(&id("x"), false, false).unwrap();
    assert_eq!(dropped.habit.longest_streak, 0);

    store.check_in(&id("x")).unwrap();
    let fresh = store.reset_completely(&id("x")).unwrap();
    assert_eq!(fresh.habit.name, "Walk");
    assert_eq!(fresh.habit.target, 1);
    assert!(fresh.habit.completed_days.is_empty());
    assert_eq!(fresh.habit.current_streak, 0);
    assert_eq!(fresh.habit.longest_streak, 0);
    assert_eq!(fresh.habit.today_count, 0);
}

#[test]
fn test_timeline_colors_through_store() {
    let records = json!([{
        "id": "t",
        "name": "Floss",
        "completedDays": day_span("2025-01-01", 10),
        "createdAt": "2025-01-01T08:00:00Z"
    }]);
    let (store, _) = seeded_store("2025-01-10", records);

    for window in [5, 30, 90] {
        let options = TimelineOptions {
            window_days: window,
            ..TimelineOptions::default()
        };
        let view = store.timeline(&id("t"), options).unwrap();
        assert!(view
            .colored_ticks
            .iter()
            .all(|tick| tick.color == MomentumColor::Green));
    }
    let status = store.status(&id("t")).unwrap();
    assert_eq!(status.momentum_color, Some(MomentumColor::Green));
    assert_eq!(status.current_momentum_days, 10);
    assert_eq!(status.longest_momentum_days, 10);
}

#[test]
fn test_timeline_accepts_huge_window() {
    let records = json!([{
        "id": "t",
        "name": "Floss",
        "completedDays": day_span("2025-01-01", 10),
        "createdAt": "2025-01-01T08:00:00Z"
    }]);
    let (store, _) = seeded_store("2025-01-10", records);

    let options = TimelineOptions {
        window_days: 1_000_000_000,
        ..TimelineOptions::default()
    };
    let view = store.timeline(&id("t"), options).unwrap();
    assert_eq!(view.visible_start, day("2025-01-01"));
    assert_eq!(view.ticks.len(), 10);
}

#[test]
fn test_notifications_and_delete() {
    let (mut store, _) = empty_store("2025-01-10");
    let habit = store
        .create("Vitamins", 1, Period::Day, vec![Reminder::new(8, 0, Vec::new())])
        .unwrap();

    let plan = store.reminder_plan(&habit.id).unwrap();
    assert_eq!(plan.slot_ids().len(), 7);

    let updated = store
        .update_notifications(&habit.id, vec![Reminder::new(30, 75, vec![0, 4])])
        .unwrap();
    assert_eq!(updated.habit.notifications[0].hour, 23);
    assert_eq!(updated.habit.notifications[0].minute, 59);
    assert_eq!(store.reminder_plan(&habit.id).unwrap().slot_ids().len(), 2);

    let removed = store.delete(&habit.id).unwrap();
    assert_eq!(removed.notifications.len(), 1);
    assert_eq!(
        removed.reminder_plan().slot_ids(),
        vec![
            reminder_slot_id(&habit.id, 0, 0),
            reminder_slot_id(&habit.id, 0, 4)
        ]
    );
    assert!(store.habit_by_id(&habit.id).is_none());
    assert!(matches!(store.delete(&habit.id), Err(StoreError::HabitNotFound(_))));
}

#[test]
fn test_month_habit_cannot_mark_yesterday() {
    let (mut store, clock) = empty_store("2025-01-10");
    let habit = store.create("Budget review", 2, Period::Month, Vec::new()).unwrap();
    clock.advance_days(3);
    assert!(!store.can_mark_yesterday(&habit.id));
    assert!(!store.mark_yesterday(&habit.id).unwrap().applied);
}

#[test]
fn test_snapshots_follow_mutations() {
    let (mut store, _) = empty_store("2025-01-10");
    let mut rx = store.subscribe();
    let habit = store.create("Tea", 1, Period::Day, Vec::new()).unwrap();
    store.check_in(&habit.id).unwrap();

    let snapshot = rx.borrow_and_update().clone();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].current_streak, 1);

    store.delete(&habit.id).unwrap();
    assert!(rx.borrow_and_update().is_empty());
}
