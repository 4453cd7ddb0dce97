//! Assets, match logs and price history.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stat name (`PTS`, `AST`, ...) to per-game value.
pub type StatMap = BTreeMap<String, f64>;

pub const PTS: &str = "PTS";
pub const AST: &str = "AST";
pub const REB: &str = "REB";
pub const STL: &str = "STL";
pub const BLK: &str = "BLK";
pub const TOV: &str = "TOV";

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Build a [`StatMap`] from `(name, value)` pairs.
pub fn stat_map<'a>(pairs: impl IntoIterator<Item = (&'a str, f64)>) -> StatMap {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Player,
    Team,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Player => "player",
            AssetKind::Team => "team",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "player" => Some(AssetKind::Player),
            "team" => Some(AssetKind::Team),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub name: String,
    pub ticker: String,
    pub kind: AssetKind,
    /// Identifier of the player at the upstream stats source.
    pub player_id: Option<String>,
    pub current_price: f64,
    pub projected_stats: StatMap,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// An asset that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAsset {
    pub name: String,
    pub ticker: String,
    pub kind: AssetKind,
    pub player_id: Option<String>,
    pub current_price: f64,
    pub projected_stats: StatMap,
}

impl NewAsset {
    pub fn into_asset(self, created_at: DateTime<Utc>) -> Asset {
        Asset {
            id: new_id(),
            name: self.name,
            ticker: self.ticker,
            kind: self.kind,
            player_id: self.player_id,
            current_price: self.current_price,
            projected_stats: self.projected_stats,
            created_at,
            updated_at: None,
        }
    }
}

/// Where a match log came from. Only `Live` logs take part in duplicate-game
/// detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSource {
    Live,
    Simulated,
}

impl LogSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogSource::Live => "live",
            LogSource::Simulated => "simulated",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "live" => Some(LogSource::Live),
            "simulated" => Some(LogSource::Simulated),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchLog {
    pub id: String,
    pub asset_id: String,
    /// Calendar date of the game, no time-of-day or timezone.
    pub game_date: NaiveDate,
    pub opponent: String,
    pub stats: StatMap,
    pub performance_score: f64,
    pub source: LogSource,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistoryEntry {
    pub id: String,
    pub asset_id: String,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
}

/// One price-changing event: the new log plus the history row carrying the
/// asset's new price. Stores apply it atomically.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceUpdate {
    pub log: MatchLog,
    pub history: PriceHistoryEntry,
}

impl PriceUpdate {
    pub fn asset_id(&self) -> &str {
        &self.history.asset_id
    }

    pub fn new_price(&self) -> f64 {
        self.history.price
    }
}
