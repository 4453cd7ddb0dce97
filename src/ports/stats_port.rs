//! Upstream player statistics port.

use crate::domain::game_log::{GameLog, PlayerProjection, TopPerformer};
use async_trait::async_trait;

/// Result of a call to the statistics source.
///
/// `Empty` means the source answered but had nothing; `Unavailable` means the
/// call itself failed (network, status, or payload) and the caller should
/// degrade rather than treat it as a legitimate absence of data.
#[derive(Debug, Clone, PartialEq)]
pub enum Upstream<T> {
    Data(T),
    Empty,
    Unavailable { reason: String },
}

impl<T> Upstream<T> {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Upstream::Unavailable {
            reason: reason.into(),
        }
    }
}

#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Most recent game played by the player.
    async fn last_game_log(&self, player_id: &str) -> Upstream<GameLog>;

    /// Top `limit` players by points per game, best first.
    async fn top_players(&self, limit: usize) -> Upstream<Vec<PlayerProjection>>;

    /// Best single-game scorer from the most recent game night.
    async fn top_performer(&self) -> Upstream<TopPerformer>;
}
