//! Records returned by the upstream statistics source.

use crate::domain::asset::{AST, BLK, PTS, REB, STL, StatMap, TOV, stat_map};
use crate::domain::error::SportstockError;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Upstream date formats, most common first. `%b` matches month names
/// case-insensitively, so both `Jan 5, 2025` and `JAN 05, 2025` parse.
const GAME_DATE_FORMATS: [&str; 2] = ["%b %d, %Y", "%Y-%m-%d"];
const GAME_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// One player's line from a single game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameLog {
    /// Date as published upstream, e.g. `Jan 5, 2025`.
    pub game_date: String,
    pub matchup: String,
    pub pts: i64,
    pub reb: i64,
    pub ast: i64,
    pub stl: i64,
    pub blk: i64,
    pub tov: i64,
    /// `W` or `L` when the source reports it.
    pub win_loss: Option<String>,
}

impl GameLog {
    pub fn stat_map(&self) -> StatMap {
        stat_map([
            (PTS, self.pts as f64),
            (REB, self.reb as f64),
            (AST, self.ast as f64),
            (STL, self.stl as f64),
            (BLK, self.blk as f64),
            (TOV, self.tov as f64),
        ])
    }

    pub fn calendar_date(&self) -> Result<NaiveDate, SportstockError> {
        parse_game_date(&self.game_date)
    }
}

/// Parse an upstream game date into a calendar date.
///
/// Timestamps are truncated to their date part with no timezone conversion:
/// the date is whatever day the source says the game was played.
pub fn parse_game_date(value: &str) -> Result<NaiveDate, SportstockError> {
    let trimmed = value.trim();
    for format in GAME_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date);
        }
    }
    for format in GAME_DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(datetime.date());
        }
    }
    Err(SportstockError::InvalidGameDate {
        value: value.to_string(),
        reason: "expected a date like \"Jan 5, 2025\" or \"2025-01-05\"".into(),
    })
}

/// Season per-game averages for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProjection {
    pub player_id: String,
    pub name: String,
    pub pts: f64,
    pub ast: f64,
    pub reb: f64,
    pub stl: f64,
    pub blk: f64,
    pub tov: f64,
}

impl PlayerProjection {
    pub fn stat_map(&self) -> StatMap {
        stat_map([
            (PTS, self.pts),
            (AST, self.ast),
            (REB, self.reb),
            (STL, self.stl),
            (BLK, self.blk),
            (TOV, self.tov),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopPerformer {
    #[serde(rename = "id")]
    pub player_id: String,
    pub name: String,
    pub stats: StatMap,
}
