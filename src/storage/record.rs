/// Tolerant decoding of stored habit records
///
/// Records written by older versions of the app may lack fields, use other
/// names (`repeats`, `repeatsPerDay`), carry a per-day `logs` map instead of
/// `completedDays`, or hold numbers as strings. Decoding never fails on such
/// shapes: missing values get defaults and numbers are clamped.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::domain::{coerce_target, parse_day_key, Habit, HabitId, Period, Reminder};

/// Decode a JSON array of records, skipping entries that are not objects
pub fn decode_records(raw: &str, now: DateTime<Utc>) -> Result<Vec<Habit>, serde_json::Error> {
    let value: Value = serde_json::from_str(raw)?;
    let records = match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        single => vec![single],
    };
    Ok(records
        .iter()
        .filter_map(|record| decode_record(record, now))
        .collect())
}

/// Decode one record, or `None` if it is not a JSON object
pub fn decode_record(record: &Value, now: DateTime<Utc>) -> Option<Habit> {
    let obj = record.as_object()?;

    let id = match obj.get("id") {
        Some(Value::String(s)) if !s.trim().is_empty() => HabitId::from_string(s),
        Some(Value::Number(n)) => HabitId::from_string(&n.to_string()),
        _ => HabitId::new(),
    };

    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("Untitled habit")
        .to_string();

    let target = ["target", "repeats", "repeatsPerDay"]
        .iter()
        .find_map(|key| obj.get(*key).and_then(as_integer))
        .map_or(1, coerce_target);

    let period = obj
        .get("period")
        .and_then(Value::as_str)
        .map_or(Period::Day, Period::parse_lenient);

    let mut completed_days = day_set(obj.get("completedDays"));
    if let Some(Value::Object(logs)) = obj.get("logs") {
        // Legacy per-day counters: a day counts once its counter reached the target
        for (key, count) in logs {
            let reached = as_integer(count).map_or(false, |c| c >= target as i64);
            if let (true, Some(day)) = (reached, parse_day_key(key)) {
                completed_days.insert(day);
            }
        }
    }

    let today_count = count_field(obj.get("todayCount")).min(target);

    let notifications = obj
        .get("notifications")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(decode_reminder).collect())
        .unwrap_or_default();

    let created_at = timestamp(obj.get("createdAt")).unwrap_or(now);
    let updated_at = timestamp(obj.get("updatedAt")).unwrap_or(created_at);

    Some(Habit {
        id,
        name,
        target,
        period,
        today_count,
        last_count_date: obj.get("lastCountDate").and_then(day_value),
        completed_days,
        current_streak: count_field(obj.get("currentStreak")),
        longest_streak: count_field(obj.get("longestStreak")),
        last_full_period: None,
        streak_barriers: day_set(obj.get("streakBarriers")),
        streak_epoch: obj.get("streakEpoch").and_then(day_value),
        notifications,
        created_at,
        updated_at,
    })
}

fn decode_reminder(value: &Value) -> Option<Reminder> {
    let obj = value.as_object()?;
    let hour = obj.get("hour").and_then(as_integer)?;
    let minute = obj.get("minute").and_then(as_integer).unwrap_or(0);
    let days: Vec<i64> = obj
        .get("days")
        .and_then(Value::as_array)
        .map(|days| days.iter().filter_map(as_integer).collect())
        .unwrap_or_default();
    Some(Reminder::new(hour, minute, days))
}

/// Integer from a JSON number or numeric string
fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.floor() as i64)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f.floor() as i64),
        _ => None,
    }
}

/// Non-negative counter; missing or malformed values become 0
fn count_field(value: Option<&Value>) -> u32 {
    value
        .and_then(as_integer)
        .map_or(0, |n| n.clamp(0, u32::MAX as i64) as u32)
}

fn day_value(value: &Value) -> Option<NaiveDate> {
    value.as_str().and_then(parse_day_key)
}

fn day_set(value: Option<&Value>) -> BTreeSet<NaiveDate> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(day_value).collect())
        .unwrap_or_default()
}

fn timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    value
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}
