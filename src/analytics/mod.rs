/// Analytics over a habit's completion history
///
/// This module provides the momentum calculation (run length in days) and
/// the timeline model that colors every completed day by the run it belongs
/// to. Both share the block logic of the streak calculation.

pub mod momentum;
pub mod timeline;

pub use momentum::*;
pub use timeline::*;

use serde::{Deserialize, Serialize};

/// Six-step color scale keyed by run length in days
///
/// The scale starts at yellow; whether a zero-day run is shown at all is
/// up to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MomentumColor {
    /// 0-6 days
    Yellow,
    /// 7-30 days
    Green,
    /// 31-92 days
    Cyan,
    /// 93-185 days
    Blue,
    /// 186-364 days
    Magenta,
    /// 365 days and more
    Red,
}

impl MomentumColor {
    /// Pick the bucket for a run length in days
    pub fn for_days(days: u32) -> Self {
        match days {
            365.. => MomentumColor::Red,
            186..=364 => MomentumColor::Magenta,
            93..=185 => MomentumColor::Blue,
            31..=92 => MomentumColor::Cyan,
            7..=30 => MomentumColor::Green,
            _ => MomentumColor::Yellow,
        }
    }

    pub fn hex(&self) -> &'static str {
        match self {
            MomentumColor::Yellow => "#ffc400",
            MomentumColor::Green => "#22c55e",
            MomentumColor::Cyan => "#06b6d4",
            MomentumColor::Blue => "#3b82f6",
            MomentumColor::Magenta => "#d946ef",
            MomentumColor::Red => "#ef4444",
        }
    }

    /// Single-letter form used by the text timeline strip
    pub fn glyph(&self) -> char {
        match self {
            MomentumColor::Yellow => 'y',
            MomentumColor::Green => 'g',
            MomentumColor::Cyan => 'c',
            MomentumColor::Blue => 'b',
            MomentumColor::Magenta => 'm',
            MomentumColor::Red => 'r',
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MomentumColor::Yellow => "yellow",
            MomentumColor::Green => "green",
            MomentumColor::Cyan => "cyan",
            MomentumColor::Blue => "blue",
            MomentumColor::Magenta => "magenta",
            MomentumColor::Red => "red",
        }
    }
}
