//! Building the asset universe from upstream player data.

use crate::domain::asset::{AST, AssetKind, NewAsset, PTS, REB, stat_map};
use crate::domain::error::SportstockError;
use crate::domain::game_log::{PlayerProjection, TopPerformer};
use crate::domain::pricing::round_cents;
use crate::ports::stats_port::{StatsSource, Upstream};
use crate::ports::store_port::AssetStore;
use serde::Serialize;
use tracing::{info, warn};

pub const DEFAULT_ROSTER_SIZE: usize = 50;
pub const MAX_TICKER_LEN: usize = 6;

/// Initial price per projected point.
const PRICE_PER_POINT: f64 = 2.0;

/// Ticker from a player name: first initial, a dot, and the last name
/// (`L.JAMES`), capped at six characters. Single names use their first four
/// letters.
pub fn generate_ticker(name: &str) -> String {
    let parts: Vec<&str> = name.split_whitespace().collect();
    match parts.as_slice() {
        [first, .., last] => {
            let initial: String = first.chars().take(1).collect();
            format!("{initial}.{last}")
                .to_uppercase()
                .chars()
                .take(MAX_TICKER_LEN)
                .collect()
        }
        _ => name.trim().chars().take(4).collect::<String>().to_uppercase(),
    }
}

impl PlayerProjection {
    pub fn to_new_asset(&self) -> NewAsset {
        NewAsset {
            name: self.name.clone(),
            ticker: generate_ticker(&self.name),
            kind: AssetKind::Player,
            player_id: Some(self.player_id.clone()),
            current_price: round_cents(self.pts * PRICE_PER_POINT),
            projected_stats: self.stat_map(),
        }
    }
}

/// Roster used when the stats source cannot provide one.
pub fn fallback_roster() -> Vec<NewAsset> {
    let player = |id: &str, name: &str, ticker: &str, price: f64, pts: f64, ast: f64, reb: f64| {
        NewAsset {
            name: name.to_string(),
            ticker: ticker.to_string(),
            kind: AssetKind::Player,
            player_id: Some(id.to_string()),
            current_price: price,
            projected_stats: stat_map([(PTS, pts), (AST, ast), (REB, reb)]),
        }
    };
    vec![
        player("2544", "LeBron James", "LBJ", 50.0, 25.0, 7.0, 7.0),
        player("201939", "Stephen Curry", "SC30", 45.0, 28.0, 5.0, 4.0),
        player("1629029", "Luka Doncic", "LUKA", 55.0, 32.0, 9.0, 8.0),
    ]
}

/// Shown when the stats source has no last-night leader.
pub fn fallback_top_performer() -> TopPerformer {
    TopPerformer {
        player_id: "2544".into(),
        name: "LeBron James".into(),
        stats: stat_map([(PTS, 35.0), (AST, 9.0), (REB, 8.0)]),
    }
}

pub async fn top_performer(stats: &dyn StatsSource) -> TopPerformer {
    match stats.top_performer().await {
        Upstream::Data(performer) => performer,
        Upstream::Empty => fallback_top_performer(),
        Upstream::Unavailable { reason } => {
            warn!(%reason, "top performer unavailable, using fallback");
            fallback_top_performer()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InitOutcome {
    AlreadyInitialized {
        existing: usize,
    },
    Initialized {
        inserted: usize,
        skipped: usize,
        used_fallback: bool,
    },
}

impl InitOutcome {
    pub fn message(&self) -> String {
        match self {
            InitOutcome::AlreadyInitialized { .. } => "Assets already exist".to_string(),
            InitOutcome::Initialized { inserted, .. } => {
                format!("Initialized {inserted} assets")
            }
        }
    }
}

/// Roster from the stats source, or the fallback roster when it has none.
pub async fn fetch_roster(stats: &dyn StatsSource, limit: usize) -> (Vec<NewAsset>, bool) {
    match stats.top_players(limit).await {
        Upstream::Data(players) if !players.is_empty() => (
            players
                .iter()
                .take(limit)
                .map(PlayerProjection::to_new_asset)
                .collect(),
            false,
        ),
        Upstream::Data(_) | Upstream::Empty => {
            warn!("stats source returned no players, using fallback roster");
            (fallback_roster(), true)
        }
        Upstream::Unavailable { reason } => {
            warn!(%reason, "stats source unavailable, using fallback roster");
            (fallback_roster(), true)
        }
    }
}

/// Insert each asset, skipping tickers that are already taken. Returns
/// `(inserted, skipped)`.
pub fn insert_roster(
    store: &dyn AssetStore,
    roster: &[NewAsset],
) -> Result<(usize, usize), SportstockError> {
    let mut inserted = 0;
    let mut skipped = 0;
    for new_asset in roster {
        match store.insert_asset(new_asset)? {
            Some(_) => inserted += 1,
            None => {
                warn!(ticker = %new_asset.ticker, name = %new_asset.name, "duplicate ticker, skipping");
                skipped += 1;
            }
        }
    }
    Ok((inserted, skipped))
}

/// Populate an empty store. Does nothing once any asset exists.
pub async fn initialize_assets(
    store: &dyn AssetStore,
    stats: &dyn StatsSource,
    limit: usize,
) -> Result<InitOutcome, SportstockError> {
    let existing = store.count_assets()?;
    if existing > 0 {
        return Ok(InitOutcome::AlreadyInitialized { existing });
    }

    let (roster, used_fallback) = fetch_roster(stats, limit).await;
    let (inserted, skipped) = insert_roster(store, &roster)?;
    info!(inserted, skipped, used_fallback, "initialized assets");

    Ok(InitOutcome::Initialized {
        inserted,
        skipped,
        used_fallback,
    })
}

/// Administrative seeding. With `reset`, every asset, log and history row is
/// removed first; otherwise new players are added alongside existing ones.
pub async fn seed_assets(
    store: &dyn AssetStore,
    stats: &dyn StatsSource,
    limit: usize,
    reset: bool,
) -> Result<InitOutcome, SportstockError> {
    if reset {
        let existing = store.count_assets()?;
        warn!(existing, "clearing all assets before seeding");
        store.clear_all()?;
    }

    let (roster, used_fallback) = fetch_roster(stats, limit).await;
    let (inserted, skipped) = insert_roster(store, &roster)?;
    info!(inserted, skipped, used_fallback, "seeded assets");

    Ok(InitOutcome::Initialized {
        inserted,
        skipped,
        used_fallback,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticker_uses_initial_and_last_name() {
        assert_eq!(generate_ticker("Jalen Brunson"), "J.BRUN");
        assert_eq!(generate_ticker("LeBron James"), "L.JAME");
        assert_eq!(generate_ticker("Joel Embiid"), "J.EMBI");
    }

    #[test]
    fn short_last_names_are_not_padded() {
        assert_eq!(generate_ticker("Jae Ly"), "J.LY");
    }

    #[test]
    fn middle_names_are_skipped() {
        assert_eq!(generate_ticker("Karl-Anthony Towns"), "K.TOWN");
        assert_eq!(generate_ticker("Gary Trent Jr."), "G.JR.");
    }

    #[test]
    fn single_name_uses_first_four_letters() {
        assert_eq!(generate_ticker("Nene"), "NENE");
        assert_eq!(generate_ticker("Giannis"), "GIAN");
    }

    #[test]
    fn ticker_handles_non_ascii_names() {
        assert_eq!(generate_ticker("Luka Dončić"), "L.DONČ");
    }

    #[test]
    fn projection_becomes_priced_player_asset() {
        let projection = PlayerProjection {
            player_id: "1628983".into(),
            name: "Shai Gilgeous-Alexander".into(),
            pts: 32.715,
            ast: 6.4,
            reb: 5.5,
            stl: 2.0,
            blk: 1.0,
            tov: 2.4,
        };
        let asset = projection.to_new_asset();
        assert_eq!(asset.ticker, "S.GILG");
        assert_eq!(asset.current_price, 65.43);
        assert_eq!(asset.player_id.as_deref(), Some("1628983"));
        assert_eq!(asset.projected_stats.len(), 6);
        assert_eq!(asset.kind, AssetKind::Player);
    }

    #[test]
    fn fallback_roster_has_unique_tickers() {
        let roster = fallback_roster();
        assert_eq!(roster.len(), 3);
        let mut tickers: Vec<_> = roster.iter().map(|a| a.ticker.as_str()).collect();
        tickers.sort();
        tickers.dedup();
        assert_eq!(tickers.len(), 3);
    }

    #[test]
    fn init_messages() {
        assert_eq!(
            InitOutcome::AlreadyInitialized { existing: 3 }.message(),
            "Assets already exist"
        );
        assert_eq!(
            InitOutcome::Initialized {
                inserted: 48,
                skipped: 2,
                used_fallback: false
            }
            .message(),
            "Initialized 48 assets"
        );
    }
}
