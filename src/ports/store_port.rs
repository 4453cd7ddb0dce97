//! Persistence port trait for assets, match logs and price history.

use crate::domain::asset::{Asset, MatchLog, NewAsset, PriceHistoryEntry, PriceUpdate};
use crate::domain::error::SportstockError;
use chrono::NaiveDate;

pub trait AssetStore: Send + Sync {
    fn list_assets(&self) -> Result<Vec<Asset>, SportstockError>;

    fn count_assets(&self) -> Result<usize, SportstockError>;

    fn get_asset(&self, id: &str) -> Result<Option<Asset>, SportstockError>;

    /// Insert a new asset unless its ticker is already taken, in which case
    /// nothing is written and `None` is returned.
    fn insert_asset(&self, asset: &NewAsset) -> Result<Option<Asset>, SportstockError>;

    /// Match logs for an asset, newest game first.
    fn match_logs(&self, asset_id: &str) -> Result<Vec<MatchLog>, SportstockError>;

    /// Date of the asset's most recent live (non-simulated) game, if any.
    fn latest_live_game_date(&self, asset_id: &str) -> Result<Option<NaiveDate>, SportstockError>;

    /// Price history for an asset, oldest first.
    fn price_history(&self, asset_id: &str) -> Result<Vec<PriceHistoryEntry>, SportstockError>;

    /// Set the asset's price, append the match log and append the history row
    /// as one unit: either all three are written or none are.
    fn record_price_update(&self, update: &PriceUpdate) -> Result<(), SportstockError>;

    /// Remove every asset, log and history row.
    fn clear_all(&self) -> Result<(), SportstockError>;
}
