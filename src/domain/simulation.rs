//! Simulated games for demoing price moves outside of live game nights.

use crate::domain::asset::{
    AST, BLK, LogSource, MatchLog, PTS, PriceHistoryEntry, PriceUpdate, REB, STL, StatMap, TOV,
    new_id, stat_map,
};
use crate::domain::error::SportstockError;
use crate::domain::pricing::PricingEngine;
use crate::domain::scoring::performance_score;
use crate::ports::store_port::AssetStore;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::info;

pub const SIMULATION_OPPONENT: &str = "Simulation";

const DEFAULT_PTS: f64 = 20.0;
const DEFAULT_AST: f64 = 5.0;
const DEFAULT_REB: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub asset_id: String,
    pub asset: String,
    pub old_price: f64,
    pub new_price: f64,
    pub actual_score: f64,
    pub projected_score: f64,
    pub stats: StatMap,
}

/// Draw an "actual" stat line around a projection: the scoring stats vary
/// within ±20% of projection, the defensive stats and turnovers are drawn
/// from small fixed ranges.
pub fn random_stat_line<R: Rng>(projected: &StatMap, rng: &mut R) -> StatMap {
    let projection = |key: &str, default: f64| projected.get(key).copied().unwrap_or(default);

    stat_map([
        (PTS, projection(PTS, DEFAULT_PTS) * rng.gen_range(0.8..=1.2)),
        (AST, projection(AST, DEFAULT_AST) * rng.gen_range(0.8..=1.2)),
        (REB, projection(REB, DEFAULT_REB) * rng.gen_range(0.8..=1.2)),
        (STL, rng.gen_range(0..=3) as f64),
        (BLK, rng.gen_range(0..=2) as f64),
        (TOV, rng.gen_range(0..=5) as f64),
    ])
}

/// Play a simulated game for an asset and reprice it.
///
/// Simulated logs are tagged [`LogSource::Simulated`] and dated `now`; they
/// never count as the live game for that date.
pub fn simulate_game<R: Rng>(
    store: &dyn AssetStore,
    engine: &PricingEngine,
    asset_id: &str,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Result<SimulationResult, SportstockError> {
    let asset = store
        .get_asset(asset_id)?
        .ok_or_else(|| SportstockError::asset_not_found(asset_id))?;

    let actual_stats = random_stat_line(&asset.projected_stats, rng);
    let projected_score = performance_score(&asset.projected_stats);
    let actual_score = performance_score(&actual_stats);
    let new_price =
        engine.calculate_new_price(asset.current_price, projected_score, actual_score);

    let update = PriceUpdate {
        log: MatchLog {
            id: new_id(),
            asset_id: asset.id.clone(),
            game_date: now.date_naive(),
            opponent: SIMULATION_OPPONENT.to_string(),
            stats: actual_stats.clone(),
            performance_score: actual_score,
            source: LogSource::Simulated,
            created_at: now,
        },
        history: PriceHistoryEntry {
            id: new_id(),
            asset_id: asset.id.clone(),
            price: new_price,
            timestamp: now,
        },
    };
    store.record_price_update(&update)?;

    info!(
        asset = %asset.ticker,
        old_price = asset.current_price,
        new_price,
        "simulated game"
    );

    Ok(SimulationResult {
        asset_id: asset.id,
        asset: asset.name,
        old_price: asset.current_price,
        new_price,
        actual_score,
        projected_score,
        stats: actual_stats,
    })
}
