/// Momentum calculation
///
/// Momentum is the length of the active run measured in days rather than
/// periods, so week and month habits feed the same color scale as daily
/// ones. A run is a block of consecutive full periods; the still-open
/// current period adds its partial days when it directly follows a block.

use serde::Serialize;

use crate::domain::{active_run, PeriodBuckets, PeriodKey, RunAnchor, StreakCuts, StreakInput};

/// Day-granular momentum of a habit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MomentumSummary {
    /// Days in the active run (0 when there is no earned run)
    pub current_days: u32,
    /// Best run in the history, including a trailing partial period
    pub longest_days: u32,
}

/// A maximal block of consecutive full periods
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MomentumBlock {
    /// Periods in ascending order
    pub periods: Vec<PeriodKey>,
    /// Completed days across all periods of the block
    pub total_days: u32,
}

impl MomentumBlock {
    /// Last (most recent) period of the block
    pub fn last(&self) -> Option<PeriodKey> {
        self.periods.last().copied()
    }
}

/// Split the full periods of a history into blocks
///
/// Two full periods belong to the same block only if they are adjacent and
/// no barrier or epoch falls between them.
pub fn full_blocks(buckets: &PeriodBuckets, cuts: &StreakCuts) -> Vec<MomentumBlock> {
    let mut blocks: Vec<MomentumBlock> = Vec::new();

    for key in buckets.full_keys() {
        let extends = blocks
            .last()
            .and_then(MomentumBlock::last)
            .map_or(false, |last| last.next() == key && !cuts.separates(last, key));

        match blocks.last_mut() {
            Some(block) if extends => {
                block.periods.push(key);
                block.total_days += buckets.count(key);
            }
            _ => blocks.push(MomentumBlock {
                periods: vec![key],
                total_days: buckets.count(key),
            }),
        }
    }

    blocks
}

/// Calculate current and longest momentum in days
pub fn calculate_momentum(input: StreakInput<'_>) -> MomentumSummary {
    let buckets = PeriodBuckets::new(input.days, input.period, input.target);

    let current_days = match RunAnchor::locate(&buckets, input.today) {
        RunAnchor::Current(start) => run_days(&buckets, input.cuts, start),
        RunAnchor::Previous { start, partial } => match run_days(&buckets, input.cuts, start) {
            0 => 0,
            days => days + partial,
        },
        RunAnchor::Empty => 0,
    };

    let longest_days = full_blocks(&buckets, input.cuts)
        .iter()
        .map(|block| block_with_trailing_partial(&buckets, input.cuts, block))
        .max()
        .unwrap_or(0)
        .max(current_days);

    MomentumSummary {
        current_days,
        longest_days,
    }
}

fn run_days(buckets: &PeriodBuckets, cuts: &StreakCuts, start: PeriodKey) -> u32 {
    active_run(buckets, cuts, start)
        .into_iter()
        .map(|key| buckets.count(key))
        .sum()
}

/// Block total, plus the following period's days if that period is open
fn block_with_trailing_partial(
    buckets: &PeriodBuckets,
    cuts: &StreakCuts,
    block: &MomentumBlock,
) -> u32 {
    let trailing = block
        .last()
        .map(|last| (last, last.next()))
        .filter(|(last, next)| !buckets.is_full(*next) && !cuts.separates(*last, *next))
        .map_or(0, |(_, next)| buckets.count(next));
    block.total_days + trailing
}
