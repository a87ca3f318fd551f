/// Basic unit tests to verify core functionality
use chrono::{Local, NaiveDate, TimeZone, Utc};
use habit_momentum_mcp::storage::decode_records;
use habit_momentum_mcp::analytics::calculate_momentum;
use habit_momentum_mcp::*;

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid test date")
}

#[cfg(test)]
mod calendar_tests {
    use super::*;

    #[test]
    fn test_iso_week_belongs_to_year_of_thursday() {
        // Monday 2024-12-30 opens 2025-W01
        let week = week_key_of(day("2024-12-30"));
        assert_eq!(week.to_string(), "2025-W01");
        assert_eq!(week.first_day(), day("2024-12-30"));
        assert_eq!(week.last_day(), day("2025-01-05"));

        // Sunday 2021-01-03 closes 2020-W53
        let week = week_key_of(day("2021-01-03"));
        assert_eq!(week.to_string(), "2020-W53");
        assert_eq!(week.next().to_string(), "2021-W01");
    }

    #[test]
    fn test_week_key_parses_back() {
        let week: WeekKey = "2025-W11".parse().unwrap();
        assert_eq!(week.first_day(), day("2025-03-10"));
        assert_eq!(week, week_key_of(day("2025-03-16")));
        assert!("2025-11".parse::<WeekKey>().is_err());
    }

    #[test]
    fn test_month_navigation() {
        let jan = month_key_of(day("2025-01-31"));
        assert_eq!(jan.next().to_string(), "2025-02");
        assert_eq!(jan.next().last_day(), day("2025-02-28"));
        assert_eq!(jan.prev().to_string(), "2024-12");
        assert_eq!(month_key_of(day("2024-02-10")).last_day(), day("2024-02-29"));
        assert_eq!(month_key_of(day("2024-12-31")).next().first_day(), day("2025-01-01"));
    }

    #[test]
    fn test_period_key_text_forms() {
        assert_eq!(Period::Day.key_of(day("2025-03-12")).to_string(), "2025-03-12");
        assert_eq!(Period::Week.key_of(day("2025-03-12")).to_string(), "2025-W11");
        assert_eq!(Period::Month.key_of(day("2025-03-12")).to_string(), "2025-03");
        assert!(Period::Month.key_of(day("2025-03-12")).contains(day("2025-03-31")));
    }

    #[test]
    fn test_day_keys() {
        assert_eq!(add_days(day("2024-02-28"), 1), day("2024-02-29"));
        assert_eq!(add_days(day("2025-01-01"), -1), day("2024-12-31"));
        assert_eq!(format_day_key(day("2025-03-09")), "2025-03-09");
        assert_eq!(parse_day_key(" 2025-03-09 "), Some(day("2025-03-09")));
        assert_eq!(parse_day_key("09/03/2025"), None);
        assert_eq!(parse_day_key("2025-02-30"), None);
    }

    #[test]
    fn test_local_day_of_timestamp() {
        let evening = Local.with_ymd_and_hms(2025, 3, 9, 23, 30, 0).unwrap();
        assert_eq!(date_key_local(evening), day("2025-03-09"));
    }

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock::at(day("2025-01-31"));
        assert_eq!(today_key(&clock), day("2025-01-31"));
        assert_eq!(yesterday_key(&clock), day("2025-01-30"));
        clock.advance_days(1);
        assert_eq!(clock.today(), day("2025-02-01"));
    }
}

#[cfg(test)]
mod streak_tests {
    use super::*;

    fn span(from: &str, count: i64) -> Vec<NaiveDate> {
        (0..count).map(|i| add_days(day(from), i)).collect()
    }

    fn input<'a>(
        days: &'a [NaiveDate],
        period: Period,
        target: u32,
        today: &str,
        cuts: &'a StreakCuts,
    ) -> StreakInput<'a> {
        StreakInput {
            days,
            period,
            target,
            today: day(today),
            cuts,
        }
    }

    #[test]
    fn test_month_streak_with_partial_current_month() {
        let mut days = span("2025-01-01", 4);
        days.extend(span("2025-02-10", 4));
        days.extend(span("2025-03-01", 2));
        let cuts = StreakCuts::none();

        let summary = calculate_streak(input(&days, Period::Month, 4, "2025-03-15", &cuts));
        assert_eq!(summary.current, 2);
        assert_eq!(summary.historical_longest_block, 2);

        let momentum = calculate_momentum(input(&days, Period::Month, 4, "2025-03-15", &cuts));
        assert_eq!(momentum.current_days, 10);
        assert_eq!(momentum.longest_days, 10);
    }

    #[test]
    fn test_barrier_splits_history() {
        let days = span("2025-01-01", 10);
        let cuts = StreakCuts::new(vec![day("2025-01-05")], Some(day("2025-01-06")));

        let summary = calculate_streak(input(&days, Period::Day, 1, "2025-01-10", &cuts));
        assert_eq!(summary.current, 5);
        // The informational block ignores markers
        assert_eq!(summary.historical_longest_block, 10);

        let momentum = calculate_momentum(input(&days, Period::Day, 1, "2025-01-10", &cuts));
        assert_eq!(momentum.current_days, 5);
        assert_eq!(momentum.longest_days, 5);
    }

    #[test]
    fn test_motivational_messages() {
        assert!(motivational_message(0, Period::Day).contains("Ready to start"));
        assert!(motivational_message(1, Period::Day).contains("Great start"));
        assert!(motivational_message(10, Period::Day).contains("10 days"));
        assert!(motivational_message(1, Period::Week).contains("1 week"));
        assert!(motivational_message(3, Period::Month).contains("3 months"));
    }

    #[test]
    fn test_color_scale() {
        assert_eq!(MomentumColor::for_days(1), MomentumColor::Yellow);
        assert_eq!(MomentumColor::for_days(10), MomentumColor::Green);
        assert_eq!(MomentumColor::for_days(40), MomentumColor::Cyan);
        assert_eq!(MomentumColor::for_days(100), MomentumColor::Blue);
        assert_eq!(MomentumColor::for_days(200), MomentumColor::Magenta);
        assert_eq!(MomentumColor::for_days(400), MomentumColor::Red);
        assert_eq!(MomentumColor::Cyan.name(), "cyan");
    }
}

#[cfg(test)]
mod record_tests {
    use super::*;

    #[test]
    fn test_habit_creation() {
        let now = Utc.with_ymd_and_hms(2025, 3, 12, 9, 0, 0).unwrap();
        let habit = Habit::new("  Test Habit ", -4, Period::Week, Vec::new(), now, day("2025-03-12"))
            .expect("valid habit");
        assert_eq!(habit.name, "Test Habit");
        assert_eq!(habit.target, 1);
        assert_eq!(habit.created_at, now);
        assert!(Habit::new("", 1, Period::Day, Vec::new(), now, day("2025-03-12")).is_err());
    }

    #[test]
    fn test_legacy_records_decode() {
        let now = Utc.with_ymd_and_hms(2025, 3, 12, 9, 0, 0).unwrap();
        let raw = r#"[
            {"id": 42, "name": "Drink water", "repeatsPerDay": "3",
             "logs": {"2025-03-10": 3, "2025-03-11": 1}},
            "not a record",
            {"name": "", "period": "Weekly", "target": 2.7, "completedDays": ["2025-03-10", "bogus"]}
        ]"#;
        let habits = decode_records(raw, now).expect("valid JSON");
        assert_eq!(habits.len(), 2);

        let water = &habits[0];
        assert_eq!(water.id.as_str(), "42");
        assert_eq!(water.target, 3);
        assert!(water.is_completed_on(day("2025-03-10")));
        assert!(!water.is_completed_on(day("2025-03-11")));
        assert_eq!(water.created_at, now);

        let untitled = &habits[1];
        assert_eq!(untitled.name, "Untitled habit");
        assert_eq!(untitled.period, Period::Week);
        assert_eq!(untitled.target, 2);
        assert_eq!(untitled.completed_days.len(), 1);
    }

    #[test]
    fn test_reminder_slot_ids_are_stable() {
        let id = HabitId::from_string("habit-1");
        let first = reminder_slot_id(&id, 0, 0);
        assert_eq!(first, reminder_slot_id(&id, 0, 0));
        assert_eq!(reminder_slot_id(&id, 0, 6) - first, 6);
        assert_eq!(reminder_slot_id(&id, 1, 0) - first, 100);
        assert_ne!(first, reminder_slot_id(&HabitId::from_string("habit-2"), 0, 0));
    }

    #[test]
    fn test_storage_creation() {
        let storage = SqliteStorage::in_memory().expect("Failed to create storage");
        let now = Utc.with_ymd_and_hms(2025, 3, 12, 9, 0, 0).unwrap();
        let habit = Habit::new("Stretch", 1, Period::Day, Vec::new(), now, day("2025-03-12")).unwrap();
        storage.save(std::slice::from_ref(&habit)).unwrap();
        assert_eq!(storage.load().unwrap(), vec![habit]);
    }
}
