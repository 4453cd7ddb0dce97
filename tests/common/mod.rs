#![allow(dead_code)]

use async_trait::async_trait;
use sportstock::adapters::sqlite_adapter::SqliteAdapter;
use sportstock::domain::asset::{AST, AssetKind, NewAsset, PTS, REB, stat_map};
use sportstock::domain::game_log::{GameLog, PlayerProjection, TopPerformer};
use sportstock::ports::stats_port::{StatsSource, Upstream};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Scripted statistics source. Players without a scripted game report
/// `Upstream::Empty`.
pub struct MockStatsSource {
    games: Mutex<HashMap<String, Upstream<GameLog>>>,
    players: Upstream<Vec<PlayerProjection>>,
    performer: Upstream<TopPerformer>,
    game_log_calls: AtomicUsize,
}

impl MockStatsSource {
    pub fn new() -> Self {
        Self {
            games: Mutex::new(HashMap::new()),
            players: Upstream::Empty,
            performer: Upstream::Empty,
            game_log_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_game(self, player_id: &str, game: GameLog) -> Self {
        self.set_game(player_id, Upstream::Data(game));
        self
    }

    pub fn with_unavailable(self, player_id: &str, reason: &str) -> Self {
        self.set_game(player_id, Upstream::unavailable(reason));
        self
    }

    pub fn with_players(mut self, players: Vec<PlayerProjection>) -> Self {
        self.players = Upstream::Data(players);
        self
    }

    pub fn with_players_unavailable(mut self, reason: &str) -> Self {
        self.players = Upstream::unavailable(reason);
        self
    }

    pub fn with_top_performer(mut self, performer: TopPerformer) -> Self {
        self.performer = Upstream::Data(performer);
        self
    }

    pub fn with_top_performer_unavailable(mut self, reason: &str) -> Self {
        self.performer = Upstream::unavailable(reason);
        self
    }

    /// Replace what the source reports for a player, e.g. a newer game.
    pub fn set_game(&self, player_id: &str, game: Upstream<GameLog>) {
        self.games
            .lock()
            .unwrap()
            .insert(player_id.to_string(), game);
    }

    pub fn game_log_calls(&self) -> usize {
        self.game_log_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatsSource for MockStatsSource {
    async fn last_game_log(&self, player_id: &str) -> Upstream<GameLog> {
        self.game_log_calls.fetch_add(1, Ordering::SeqCst);
        self.games
            .lock()
            .unwrap()
            .get(player_id)
            .cloned()
            .unwrap_or(Upstream::Empty)
    }

    async fn top_players(&self, limit: usize) -> Upstream<Vec<PlayerProjection>> {
        match self.players.clone() {
            Upstream::Data(mut players) => {
                players.truncate(limit);
                Upstream::Data(players)
            }
            Upstream::Empty => Upstream::Empty,
            Upstream::Unavailable { reason } => Upstream::Unavailable { reason },
        }
    }

    async fn top_performer(&self) -> Upstream<TopPerformer> {
        self.performer.clone()
    }
}

pub fn memory_store() -> SqliteAdapter {
    let store = SqliteAdapter::in_memory().unwrap();
    store.initialize_schema().unwrap();
    store
}

pub const LEBRON_ID: &str = "2544";
pub const CURRY_ID: &str = "201939";

/// Projected score 25 + 10.5 + 8.4 = 43.9.
pub fn lebron() -> NewAsset {
    NewAsset {
        name: "LeBron James".into(),
        ticker: "LBJ".into(),
        kind: AssetKind::Player,
        player_id: Some(LEBRON_ID.into()),
        current_price: 50.0,
        projected_stats: stat_map([(PTS, 25.0), (AST, 7.0), (REB, 7.0)]),
    }
}

pub fn curry() -> NewAsset {
    NewAsset {
        name: "Stephen Curry".into(),
        ticker: "SC30".into(),
        kind: AssetKind::Player,
        player_id: Some(CURRY_ID.into()),
        current_price: 45.0,
        projected_stats: stat_map([(PTS, 28.0), (AST, 5.0), (REB, 4.0)]),
    }
}

pub fn team_asset() -> NewAsset {
    NewAsset {
        name: "Los Angeles Lakers".into(),
        ticker: "LAL".into(),
        kind: AssetKind::Team,
        player_id: None,
        current_price: 100.0,
        projected_stats: stat_map([(PTS, 112.0)]),
    }
}

/// Actual score 30 + 12 + 12 + 3 + 3 - 2 = 58.
pub fn big_game(date: &str) -> GameLog {
    GameLog {
        game_date: date.into(),
        matchup: "LAL vs. BOS".into(),
        pts: 30,
        reb: 10,
        ast: 8,
        stl: 1,
        blk: 1,
        tov: 2,
        win_loss: Some("W".into()),
    }
}

pub fn quiet_game(date: &str) -> GameLog {
    GameLog {
        game_date: date.into(),
        matchup: "GSW @ PHX".into(),
        pts: 12,
        reb: 3,
        ast: 4,
        stl: 0,
        blk: 0,
        tov: 5,
        win_loss: Some("L".into()),
    }
}

pub fn projection(player_id: &str, name: &str, pts: f64) -> PlayerProjection {
    PlayerProjection {
        player_id: player_id.into(),
        name: name.into(),
        pts,
        ast: 5.0,
        reb: 5.0,
        stl: 1.0,
        blk: 0.5,
        tov: 2.0,
    }
}
