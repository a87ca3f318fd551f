/// Integration tests: the habit store, storage backends and MCP server
/// exercised through the public library API
mod basic_integration;
mod mcp_roundtrip;
mod store_properties;

use std::sync::Arc;

use chrono::NaiveDate;
use habit_momentum_mcp::*;

pub fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid test date")
}

/// `count` consecutive day keys starting at `from`, as JSON strings
pub fn day_span(from: &str, count: i64) -> Vec<String> {
    (0..count)
        .map(|i| format_day_key(add_days(day(from), i)))
        .collect()
}

/// Store over in-memory storage pre-filled with raw records
pub fn seeded_store(
    today: &str,
    records: serde_json::Value,
) -> (HabitStore<MemoryStorage>, Arc<FixedClock>) {
    let storage = MemoryStorage::from_json(&records.to_string()).expect("valid records");
    let clock = Arc::new(FixedClock::at(day(today)));
    let store = HabitStore::open(storage, clock.clone()).expect("store opens");
    (store, clock)
}

pub fn empty_store(today: &str) -> (HabitStore<MemoryStorage>, Arc<FixedClock>) {
    seeded_store(today, serde_json::json!([]))
}
