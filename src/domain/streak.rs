/// Streak calculation
///
/// This module turns a habit's completed days into period counts: how many
/// consecutive days, ISO weeks or months in a row the target was reached,
/// ending at the present. Barrier and epoch markers truncate the current
/// run without touching the history itself.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Period, PeriodKey};

/// Completed days bucketed by period instance
#[derive(Debug, Clone)]
pub struct PeriodBuckets {
    period: Period,
    threshold: u32,
    counts: BTreeMap<PeriodKey, u32>,
}

impl PeriodBuckets {
    /// Bucket sorted (or unsorted) completed days for a cadence and target
    ///
    /// For the day cadence a day is full as soon as it is in the history;
    /// the per-day repetition target is tracked by the habit's counter.
    pub fn new(days: &[NaiveDate], period: Period, target: u32) -> Self {
        let mut counts = BTreeMap::new();
        for day in days {
            *counts.entry(period.key_of(*day)).or_insert(0) += 1;
        }
        let threshold = match period {
            Period::Day => 1,
            Period::Week | Period::Month => target.max(1),
        };
        Self {
            period,
            threshold,
            counts,
        }
    }

    pub fn period(&self) -> Period {
        self.period
    }

    /// Number of completed days inside a period instance
    pub fn count(&self, key: PeriodKey) -> u32 {
        self.counts.get(&key).copied().unwrap_or(0)
    }

    /// Whether a period instance reached the target
    pub fn is_full(&self, key: PeriodKey) -> bool {
        self.count(key) >= self.threshold
    }

    /// Full period instances in ascending order
    pub fn full_keys(&self) -> impl Iterator<Item = PeriodKey> + '_ {
        self.counts
            .iter()
            .filter(move |(_, count)| **count >= self.threshold)
            .map(|(key, _)| *key)
    }
}

/// Barrier and epoch markers of a habit
///
/// A run may not include a period that starts on or before the latest
/// barrier, nor one that ends before the epoch. Historical blocks are split
/// wherever a barrier or the epoch falls between two adjacent periods.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreakCuts {
    barriers: Vec<NaiveDate>,
    epoch: Option<NaiveDate>,
}

impl StreakCuts {
    pub fn new(barriers: impl IntoIterator<Item = NaiveDate>, epoch: Option<NaiveDate>) -> Self {
        let mut barriers: Vec<NaiveDate> = barriers.into_iter().collect();
        barriers.sort_unstable();
        barriers.dedup();
        Self { barriers, epoch }
    }

    /// No markers at all
    pub fn none() -> Self {
        Self::default()
    }

    pub fn latest_barrier(&self) -> Option<NaiveDate> {
        self.barriers.last().copied()
    }

    /// Whether a period may be counted in the run that is active now
    pub fn is_eligible(&self, key: PeriodKey) -> bool {
        let after_barrier = self
            .latest_barrier()
            .map_or(true, |barrier| key.first_day() > barrier);
        let within_epoch = self.epoch.map_or(true, |epoch| key.last_day() >= epoch);
        after_barrier && within_epoch
    }

    /// Whether a marker falls between two adjacent periods
    pub fn separates(&self, earlier: PeriodKey, later: PeriodKey) -> bool {
        let barrier_between = self
            .barriers
            .iter()
            .any(|b| earlier.first_day() <= *b && *b < later.first_day());
        let epoch_between = self
            .epoch
            .map_or(false, |e| earlier.last_day() < e && e <= later.last_day());
        barrier_between || epoch_between
    }
}

/// Where the backward walk for the active run begins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunAnchor {
    /// The current period is full and starts the walk
    Current(PeriodKey),
    /// The current period is still open; the walk starts at the previous
    /// period and the open period contributes `partial` completed days
    Previous { start: PeriodKey, partial: u32 },
    /// The current period of a week/month habit has no completions yet
    Empty,
}

impl RunAnchor {
    /// Decide where the active run is anchored for `today`
    pub fn locate(buckets: &PeriodBuckets, today: NaiveDate) -> Self {
        let current = buckets.period().key_of(today);
        if buckets.is_full(current) {
            return RunAnchor::Current(current);
        }
        match buckets.period() {
            // A day that is not done yet leaves yesterday's run intact
            Period::Day => RunAnchor::Previous {
                start: current.prev(),
                partial: 0,
            },
            Period::Week | Period::Month => match buckets.count(current) {
                0 => RunAnchor::Empty,
                partial => RunAnchor::Previous {
                    start: current.prev(),
                    partial,
                },
            },
        }
    }

    /// First period of the backward walk, if any
    pub fn start(&self) -> Option<PeriodKey> {
        match self {
            RunAnchor::Current(key) => Some(*key),
            RunAnchor::Previous { start, .. } => Some(*start),
            RunAnchor::Empty => None,
        }
    }
}

/// Consecutive full, eligible periods walking backwards from `start`
pub fn active_run(buckets: &PeriodBuckets, cuts: &StreakCuts, start: PeriodKey) -> Vec<PeriodKey> {
    let mut run = Vec::new();
    let mut cursor = start;
    while buckets.is_full(cursor) && cuts.is_eligible(cursor) {
        run.push(cursor);
        cursor = cursor.prev();
    }
    run
}

/// Input of a streak calculation
#[derive(Debug, Clone, Copy)]
pub struct StreakInput<'a> {
    /// Completed days, ascending and unique
    pub days: &'a [NaiveDate],
    pub period: Period,
    pub target: u32,
    pub today: NaiveDate,
    pub cuts: &'a StreakCuts,
}

/// Result of a streak calculation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakSummary {
    /// Consecutive qualifying periods ending now
    pub current: u32,
    /// Longest run of consecutive full periods anywhere in the history
    ///
    /// Informational only; the persisted longest streak is a record of
    /// observed current values and is never overwritten from this.
    pub historical_longest_block: u32,
    /// Most recent full period at or before the current one
    pub last_full_period: Option<PeriodKey>,
}

/// Calculate the current streak and the historical longest block
pub fn calculate_streak(input: StreakInput<'_>) -> StreakSummary {
    let buckets = PeriodBuckets::new(input.days, input.period, input.target);
    let current_key = input.period.key_of(input.today);

    let current = RunAnchor::locate(&buckets, input.today)
        .start()
        .map_or(0, |start| active_run(&buckets, input.cuts, start).len() as u32);

    let last_full_period = buckets
        .full_keys()
        .filter(|key| *key <= current_key)
        .last();

    StreakSummary {
        current,
        historical_longest_block: longest_block(&buckets),
        last_full_period,
    }
}

/// Longest run of consecutive full periods, ignoring barriers and epoch
fn longest_block(buckets: &PeriodBuckets) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<PeriodKey> = None;

    for key in buckets.full_keys() {
        run = match previous {
            Some(prev) if prev.next() == key => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(key);
    }

    longest
}

/// Get a motivational message based on the current streak
pub fn motivational_message(current: u32, period: Period) -> String {
    let run = period.unit_label(current);
    match period {
        Period::Day => match current {
            0 => "Ready to start your streak! Every journey begins with a single step.".to_string(),
            1 => "Great start! One day down, keep the momentum going.".to_string(),
            2..=6 => format!("Nice work! {} in a row. You're building a strong habit.", run),
            7..=29 => format!("Excellent! {} strong. You're in the groove now!", run),
            30..=99 => format!("Incredible! {} of consistency. You're a habit master!", run),
            _ => format!("Legendary! {} of unwavering commitment.", run),
        },
        Period::Week | Period::Month => match current {
            0 => "Ready to start your streak! Fill this period to get going.".to_string(),
            1 => format!("Great start! {} complete.", run),
            2..=11 => format!("Nice work! {} in a row.", run),
            _ => format!("Legendary! {} without a miss.", run),
        },
    }
}
