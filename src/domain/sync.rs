//! Reconciling the latest upstream game against stored state.
//!
//! For each asset the latest game is fetched from the [`StatsSource`]. A game
//! dated on or before the asset's latest live match log was already priced
//! (or is older than one that was) and nothing happens. Otherwise the game is scored against the asset's
//! projection, the asset is repriced, and the price, log and history row are
//! written together.

use crate::domain::asset::{Asset, LogSource, MatchLog, PriceHistoryEntry, PriceUpdate, new_id};
use crate::domain::error::SportstockError;
use crate::domain::pricing::PricingEngine;
use crate::domain::scoring::performance_score;
use crate::ports::stats_port::{StatsSource, Upstream};
use crate::ports::store_port::AssetStore;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncOutcome {
    Updated {
        asset_id: String,
        game_date: NaiveDate,
        opponent: String,
        old_price: f64,
        new_price: f64,
        projected_score: f64,
        actual_score: f64,
    },
    AlreadyRecorded {
        asset_id: String,
        game_date: NaiveDate,
    },
    NoGame {
        asset_id: String,
    },
    NoPlayerLink {
        asset_id: String,
    },
    SourceUnavailable {
        asset_id: String,
        reason: String,
    },
}

impl SyncOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, SyncOutcome::Updated { .. })
    }
}

/// Bring one asset up to date with its latest upstream game.
///
/// Upstream failures are logged and reported as
/// [`SyncOutcome::SourceUnavailable`]; only store failures are returned as
/// errors.
pub async fn sync_asset(
    store: &dyn AssetStore,
    stats: &dyn StatsSource,
    engine: &PricingEngine,
    asset: &Asset,
) -> Result<SyncOutcome, SportstockError> {
    let Some(player_id) = asset.player_id.as_deref() else {
        debug!(asset = %asset.ticker, "asset has no upstream player id, skipping sync");
        return Ok(SyncOutcome::NoPlayerLink {
            asset_id: asset.id.clone(),
        });
    };

    let game = match stats.last_game_log(player_id).await {
        Upstream::Data(game) => game,
        Upstream::Empty => {
            debug!(asset = %asset.ticker, "no games reported upstream");
            return Ok(SyncOutcome::NoGame {
                asset_id: asset.id.clone(),
            });
        }
        Upstream::Unavailable { reason } => {
            warn!(asset = %asset.ticker, %reason, "stats source unavailable");
            return Ok(SyncOutcome::SourceUnavailable {
                asset_id: asset.id.clone(),
                reason,
            });
        }
    };

    let game_date = match game.calendar_date() {
        Ok(date) => date,
        Err(e) => {
            warn!(asset = %asset.ticker, error = %e, "unparseable game date from stats source");
            return Ok(SyncOutcome::SourceUnavailable {
                asset_id: asset.id.clone(),
                reason: e.to_string(),
            });
        }
    };

    let latest = store.latest_live_game_date(&asset.id)?;
    if latest.is_some_and(|latest| game_date <= latest) {
        debug!(asset = %asset.ticker, %game_date, ?latest, "game already recorded");
        return Ok(SyncOutcome::AlreadyRecorded {
            asset_id: asset.id.clone(),
            game_date,
        });
    }

    let actual_stats = game.stat_map();
    let projected_score = performance_score(&asset.projected_stats);
    let actual_score = performance_score(&actual_stats);
    let new_price =
        engine.calculate_new_price(asset.current_price, projected_score, actual_score);

    let now = Utc::now();
    let update = PriceUpdate {
        log: MatchLog {
            id: new_id(),
            asset_id: asset.id.clone(),
            game_date,
            opponent: game.matchup.clone(),
            stats: actual_stats,
            performance_score: actual_score,
            source: LogSource::Live,
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
        %game_date,
        old_price = asset.current_price,
        new_price,
        projected_score,
        actual_score,
        "priced new game"
    );

    Ok(SyncOutcome::Updated {
        asset_id: asset.id.clone(),
        game_date,
        opponent: game.matchup,
        old_price: asset.current_price,
        new_price,
        projected_score,
        actual_score,
    })
}

/// Look up an asset by id and sync it.
pub async fn sync_asset_by_id(
    store: &dyn AssetStore,
    stats: &dyn StatsSource,
    engine: &PricingEngine,
    asset_id: &str,
) -> Result<SyncOutcome, SportstockError> {
    let asset = store
        .get_asset(asset_id)?
        .ok_or_else(|| SportstockError::asset_not_found(asset_id))?;
    sync_asset(store, stats, engine, &asset).await
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncReport {
    pub updated: usize,
    pub already_recorded: usize,
    pub no_game: usize,
    pub no_player_link: usize,
    pub unavailable: usize,
    /// Assets whose sync hit a store error.
    pub failed: usize,
    pub outcomes: Vec<SyncOutcome>,
}

impl SyncReport {
    fn record(&mut self, outcome: SyncOutcome) {
        match &outcome {
            SyncOutcome::Updated { .. } => self.updated += 1,
            SyncOutcome::AlreadyRecorded { .. } => self.already_recorded += 1,
            SyncOutcome::NoGame { .. } => self.no_game += 1,
            SyncOutcome::NoPlayerLink { .. } => self.no_player_link += 1,
            SyncOutcome::SourceUnavailable { .. } => self.unavailable += 1,
        }
        self.outcomes.push(outcome);
    }

    pub fn total(&self) -> usize {
        self.outcomes.len() + self.failed
    }
}

/// Sync every stored asset in turn. A failure on one asset never stops the
/// others.
pub async fn sync_all(
    store: &dyn AssetStore,
    stats: &dyn StatsSource,
    engine: &PricingEngine,
) -> Result<SyncReport, SportstockError> {
    let assets = store.list_assets()?;
    info!(count = assets.len(), "syncing assets against stats source");

    let mut report = SyncReport::default();
    for asset in &assets {
        match sync_asset(store, stats, engine, asset).await {
            Ok(outcome) => report.record(outcome),
            Err(e) => {
                warn!(asset = %asset.ticker, error = %e, "sync failed");
                report.failed += 1;
            }
        }
    }

    info!(
        updated = report.updated,
        already_recorded = report.already_recorded,
        unavailable = report.unavailable,
        failed = report.failed,
        "sync complete"
    );
    Ok(report)
}
