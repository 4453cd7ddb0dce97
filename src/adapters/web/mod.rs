//! Web server adapter.
//!
//! JSON API over the asset store, the statistics source and the pricing
//! engine. Handlers call the synchronous store directly; every request is
//! short and touches a handful of rows.

mod error;
mod handlers;

pub use error::{WebError, status_from_error};
pub use handlers::*;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::domain::pricing::PricingEngine;
use crate::ports::stats_port::StatsSource;
use crate::ports::store_port::AssetStore;

pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

pub struct AppState {
    pub store: Arc<dyn AssetStore>,
    pub stats: Arc<dyn StatsSource>,
    pub pricing: PricingEngine,
    /// Number of players fetched by `POST /assets/init`.
    pub roster_size: usize,
    pub cors_origins: Vec<String>,
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.cors_origins);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/assets", get(handlers::list_assets))
        .route("/assets/init", post(handlers::init_assets))
        .route("/assets/{id}", get(handlers::get_asset))
        .route("/assets/{id}/logs", get(handlers::asset_logs))
        .route("/assets/{id}/history", get(handlers::asset_history))
        .route("/assets/{id}/sync", post(handlers::sync_one))
        .route("/sync", post(handlers::sync_everything))
        .route("/simulate", post(handlers::simulate))
        .route("/top-performer", get(handlers::top_performer))
        .fallback(handlers::not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}
