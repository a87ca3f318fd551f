/// Calendar keys and local-date arithmetic
///
/// Completion history is keyed by local calendar days. This module defines
/// the day, ISO week and month keys the streak and momentum calculations
/// bucket those days into, plus the clock that decides what "today" is.

use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, Period};

/// Source of the current instant and of the user's local calendar day
pub trait Clock: Send + Sync {
    /// Current instant (used for audit timestamps)
    fn now(&self) -> DateTime<Utc>;

    /// Local calendar day that contains the given instant
    fn day_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&Local).date_naive()
    }

    /// Today's local calendar day
    fn today(&self) -> NaiveDate {
        self.day_of(self.now())
    }
}

/// Wall-clock time in the machine's local timezone
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to a chosen instant, interpreted in UTC
///
/// Used by tests and tooling that need "today" to be deterministic.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// Pin the clock to noon UTC of the given day
    pub fn at(day: NaiveDate) -> Self {
        Self {
            now: Mutex::new(noon_utc(day)),
        }
    }

    /// Move the clock to noon UTC of another day
    pub fn set_today(&self, day: NaiveDate) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now = noon_utc(day);
    }

    /// Move the clock forward (or backward) by whole days
    pub fn advance_days(&self, days: i64) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += Duration::days(days);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn day_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.date_naive()
    }
}

fn noon_utc(day: NaiveDate) -> DateTime<Utc> {
    (day.and_hms_opt(12, 0, 0).unwrap_or_default()).and_utc()
}

/// Today's local day key
pub fn today_key(clock: &dyn Clock) -> NaiveDate {
    clock.today()
}

/// Yesterday's local day key
pub fn yesterday_key(clock: &dyn Clock) -> NaiveDate {
    add_days(clock.today(), -1)
}

/// Local day key of a local timestamp
pub fn date_key_local(instant: DateTime<Local>) -> NaiveDate {
    instant.date_naive()
}

/// Shift a day key by `n` calendar days (negative moves backwards)
///
/// Operates on calendar dates, so DST transitions never skip or repeat a day.
pub fn add_days(day: NaiveDate, n: i64) -> NaiveDate {
    day + Duration::days(n)
}

/// Canonical `YYYY-MM-DD` text form of a day key
pub fn format_day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// Parse a day key
///
/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp, which is reduced to
/// the local calendar day it falls on. Anything else yields `None`.
pub fn parse_day_key(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(day) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(day);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.with_timezone(&Local).date_naive())
}

/// ISO-8601 week key of a day
pub fn week_key_of(day: NaiveDate) -> WeekKey {
    WeekKey::containing(day)
}

/// Calendar month key of a day
pub fn month_key_of(day: NaiveDate) -> MonthKey {
    MonthKey::containing(day)
}

/// ISO-8601 week (Monday start), displayed as `YYYY-Www`
///
/// The week belongs to the ISO year of its Thursday, so the last days of
/// December can sit in week 1 of the next year and the first days of
/// January in week 52 or 53 of the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekKey {
    monday: NaiveDate,
}

impl WeekKey {
    /// The week containing `day`
    pub fn containing(day: NaiveDate) -> Self {
        let offset = day.weekday().num_days_from_monday() as i64;
        Self {
            monday: day - Duration::days(offset),
        }
    }

    /// ISO week-numbering year (the calendar year of this week's Thursday)
    pub fn year(&self) -> i32 {
        self.thursday().year()
    }

    /// Week number within the ISO year, 1..=53
    pub fn week(&self) -> u32 {
        self.thursday().ordinal0() / 7 + 1
    }

    pub fn first_day(&self) -> NaiveDate {
        self.monday
    }

    pub fn last_day(&self) -> NaiveDate {
        self.monday + Duration::days(6)
    }

    pub fn next(&self) -> Self {
        Self {
            monday: self.monday + Duration::days(7),
        }
    }

    pub fn prev(&self) -> Self {
        Self {
            monday: self.monday - Duration::days(7),
        }
    }

    fn thursday(&self) -> NaiveDate {
        self.monday + Duration::days(3)
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-W{:02}", self.year(), self.week())
    }
}

impl FromStr for WeekKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidDate(format!("Invalid week key '{}'", s));
        let (year, week) = s.trim().split_once("-W").ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let week: u32 = week.parse().map_err(|_| invalid())?;
        let monday = NaiveDate::from_isoywd_opt(year, week, Weekday::Mon).ok_or_else(invalid)?;
        Ok(Self { monday })
    }
}

/// Calendar month, displayed as `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    first: NaiveDate,
}

impl MonthKey {
    /// The month containing `day`
    pub fn containing(day: NaiveDate) -> Self {
        Self {
            first: day - Duration::days(day.day0() as i64),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next().first - Duration::days(1)
    }

    pub fn next(&self) -> Self {
        // Day 32 of any month always lands in the following month
        Self::containing(self.first + Duration::days(32))
    }

    pub fn prev(&self) -> Self {
        Self::containing(self.first - Duration::days(1))
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for MonthKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidDate(format!("Invalid month key '{}'", s));
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        Ok(Self { first })
    }
}

/// One instance of a habit's period: a single day, an ISO week or a month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum PeriodKey {
    Day(NaiveDate),
    Week(WeekKey),
    Month(MonthKey),
}

impl PeriodKey {
    pub fn first_day(&self) -> NaiveDate {
        match self {
            PeriodKey::Day(day) => *day,
            PeriodKey::Week(week) => week.first_day(),
            PeriodKey::Month(month) => month.first_day(),
        }
    }

    pub fn last_day(&self) -> NaiveDate {
        match self {
            PeriodKey::Day(day) => *day,
            PeriodKey::Week(week) => week.last_day(),
            PeriodKey::Month(month) => month.last_day(),
        }
    }

    pub fn next(&self) -> Self {
        match self {
            PeriodKey::Day(day) => PeriodKey::Day(add_days(*day, 1)),
            PeriodKey::Week(week) => PeriodKey::Week(week.next()),
            PeriodKey::Month(month) => PeriodKey::Month(month.next()),
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            PeriodKey::Day(day) => PeriodKey::Day(add_days(*day, -1)),
            PeriodKey::Week(week) => PeriodKey::Week(week.prev()),
            PeriodKey::Month(month) => PeriodKey::Month(month.prev()),
        }
    }

    /// Whether `day` falls inside this period
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.first_day() <= day && day <= self.last_day()
    }
}

impl Period {
    /// The period instance that contains `day`
    pub fn key_of(&self, day: NaiveDate) -> PeriodKey {
        match self {
            Period::Day => PeriodKey::Day(day),
            Period::Week => PeriodKey::Week(week_key_of(day)),
            Period::Month => PeriodKey::Month(month_key_of(day)),
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodKey::Day(day) => write!(f, "{}", format_day_key(*day)),
            PeriodKey::Week(week) => write!(f, "{}", week),
            PeriodKey::Month(month) => write!(f, "{}", month),
        }
    }
}

impl FromStr for PeriodKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.contains("-W") {
            return trimmed.parse().map(PeriodKey::Week);
        }
        match trimmed.len() {
            10 => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .map(PeriodKey::Day)
                .map_err(|_| DomainError::InvalidDate(format!("Invalid day key '{}'", s))),
            7 => trimmed.parse().map(PeriodKey::Month),
            _ => Err(DomainError::InvalidDate(format!("Invalid period key '{}'", s))),
        }
    }
}

impl From<PeriodKey> for String {
    fn from(key: PeriodKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for PeriodKey {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
