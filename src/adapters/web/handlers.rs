//! HTTP request handlers for the web adapter.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::warn;

use crate::domain::asset::{Asset, MatchLog, PriceHistoryEntry};
use crate::domain::error::SportstockError;
use crate::domain::game_log::TopPerformer;
use crate::domain::roster;
use crate::domain::simulation::{SimulationResult, simulate_game};
use crate::domain::sync::{SyncOutcome, SyncReport, sync_all, sync_asset, sync_asset_by_id};

use super::{AppState, WebError};

fn require_asset(state: &AppState, id: &str) -> Result<Asset, WebError> {
    state
        .store
        .get_asset(id)?
        .ok_or_else(|| SportstockError::asset_not_found(id).into())
}

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Sports Stock Exchange API is running" }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn list_assets(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Asset>>, WebError> {
    Ok(Json(state.store.list_assets()?))
}

pub async fn init_assets(State(state): State<Arc<AppState>>) -> Result<Json<Value>, WebError> {
    let outcome =
        roster::initialize_assets(state.store.as_ref(), state.stats.as_ref(), state.roster_size)
            .await?;
    Ok(Json(json!({
        "message": outcome.message(),
        "result": outcome,
    })))
}

pub async fn get_asset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Asset>, WebError> {
    Ok(Json(require_asset(&state, &id)?))
}

/// Sync the asset against its latest game, then list its logs newest first.
/// A failed sync is logged and the stored logs are still returned.
pub async fn asset_logs(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<MatchLog>>, WebError> {
    let asset = require_asset(&state, &id)?;

    if let Err(e) =
        sync_asset(state.store.as_ref(), state.stats.as_ref(), &state.pricing, &asset).await
    {
        warn!(asset = %asset.ticker, error = %e, "sync before listing logs failed");
    }

    Ok(Json(state.store.match_logs(&asset.id)?))
}

pub async fn asset_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<PriceHistoryEntry>>, WebError> {
    let asset = require_asset(&state, &id)?;
    Ok(Json(state.store.price_history(&asset.id)?))
}

pub async fn sync_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SyncOutcome>, WebError> {
    let outcome =
        sync_asset_by_id(state.store.as_ref(), state.stats.as_ref(), &state.pricing, &id).await?;
    Ok(Json(outcome))
}

pub async fn sync_everything(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SyncReport>, WebError> {
    let report = sync_all(state.store.as_ref(), state.stats.as_ref(), &state.pricing).await?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct SimulateParams {
    pub asset_id: Option<String>,
}

pub async fn simulate(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SimulateParams>,
) -> Result<Json<SimulationResult>, WebError> {
    let asset_id = params
        .asset_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| WebError::bad_request("asset_id query parameter is required"))?;

    let mut rng = StdRng::from_entropy();
    let result = simulate_game(
        state.store.as_ref(),
        &state.pricing,
        &asset_id,
        &mut rng,
        Utc::now(),
    )?;
    Ok(Json(result))
}

pub async fn top_performer(State(state): State<Arc<AppState>>) -> Json<TopPerformer> {
    Json(roster::top_performer(state.stats.as_ref()).await)
}

pub async fn not_found() -> WebError {
    WebError::not_found("Not Found")
}
