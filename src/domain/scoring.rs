//! Performance scoring: a fixed-weight fantasy-style score for one stat line.

use crate::domain::asset::{AST, BLK, PTS, REB, STL, StatMap, TOV};

pub const POINTS_WEIGHT: f64 = 1.0;
pub const ASSISTS_WEIGHT: f64 = 1.5;
pub const REBOUNDS_WEIGHT: f64 = 1.2;
pub const STEALS_WEIGHT: f64 = 3.0;
pub const BLOCKS_WEIGHT: f64 = 3.0;
pub const TURNOVERS_WEIGHT: f64 = 1.0;

/// Score a stat line. Missing stats count as zero; unknown keys are ignored.
pub fn performance_score(stats: &StatMap) -> f64 {
    let stat = |key: &str| stats.get(key).copied().unwrap_or(0.0);

    stat(PTS) * POINTS_WEIGHT
        + stat(AST) * ASSISTS_WEIGHT
        + stat(REB) * REBOUNDS_WEIGHT
        + stat(STL) * STEALS_WEIGHT
        + stat(BLK) * BLOCKS_WEIGHT
        - stat(TOV) * TURNOVERS_WEIGHT
}
