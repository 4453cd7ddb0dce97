//! `stats.nba.com` statistics source.
//!
//! Both endpoints used here answer with `resultSets`, each a table of
//! `headers` and `rowSet` rows. Columns are looked up by header name so a
//! reordered response still parses.

use crate::domain::asset::{AST, PTS, REB, stat_map};
use crate::domain::config_validation::{DEFAULT_SEASONS, DEFAULT_TIMEOUT_SECS, parse_seasons};
use crate::domain::error::SportstockError;
use crate::domain::game_log::{GameLog, PlayerProjection, TopPerformer};
use crate::ports::config_port::ConfigPort;
use crate::ports::stats_port::{StatsSource, Upstream};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue, ORIGIN, REFERER, USER_AGENT};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://stats.nba.com/stats";

const SEASON_TYPE: &str = "Regular Season";

#[derive(Debug, Deserialize)]
struct StatsResponse {
    #[serde(rename = "resultSets")]
    result_sets: Vec<ResultSet>,
}

#[derive(Debug, Deserialize)]
struct ResultSet {
    headers: Vec<String>,
    #[serde(rename = "rowSet")]
    row_set: Vec<Vec<Value>>,
}

/// A result set with its columns indexed by header name.
struct Table<'a> {
    columns: HashMap<&'a str, usize>,
    rows: &'a [Vec<Value>],
}

fn malformed(reason: impl Into<String>) -> SportstockError {
    SportstockError::Upstream {
        reason: reason.into(),
    }
}

impl StatsResponse {
    fn first_table(&self) -> Result<Table<'_>, SportstockError> {
        let set = self
            .result_sets
            .first()
            .ok_or_else(|| malformed("response has no result sets"))?;
        Ok(Table {
            columns: set
                .headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.as_str(), i))
                .collect(),
            rows: &set.row_set,
        })
    }
}

impl Table<'_> {
    fn cell<'r>(&self, row: &'r [Value], column: &str) -> Result<&'r Value, SportstockError> {
        let index = *self
            .columns
            .get(column)
            .ok_or_else(|| malformed(format!("missing column {column}")))?;
        row.get(index)
            .ok_or_else(|| malformed(format!("short row, no value for {column}")))
    }

    fn text(&self, row: &[Value], column: &str) -> Result<String, SportstockError> {
        match self.cell(row, column)? {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(malformed(format!("{column} is not text: {other}"))),
        }
    }

    /// Missing or null numbers read as zero; upstream leaves some stats
    /// blank for players who did not record them.
    fn number(&self, row: &[Value], column: &str) -> Result<f64, SportstockError> {
        match self.cell(row, column)? {
            Value::Null => Ok(0.0),
            value => value
                .as_f64()
                .ok_or_else(|| malformed(format!("{column} is not a number: {value}"))),
        }
    }

    fn count(&self, row: &[Value], column: &str) -> Result<i64, SportstockError> {
        Ok(self.number(row, column)?.trunc() as i64)
    }
}

fn parse_last_game(response: &StatsResponse) -> Result<Option<GameLog>, SportstockError> {
    let table = response.first_table()?;
    let Some(row) = table.rows.first() else {
        return Ok(None);
    };
    let win_loss = match table.cell(row, "WL") {
        Ok(Value::String(wl)) => Some(wl.clone()),
        _ => None,
    };
    Ok(Some(GameLog {
        game_date: table.text(row, "GAME_DATE")?,
        matchup: table.text(row, "MATCHUP")?,
        pts: table.count(row, "PTS")?,
        reb: table.count(row, "REB")?,
        ast: table.count(row, "AST")?,
        stl: table.count(row, "STL")?,
        blk: table.count(row, "BLK")?,
        tov: table.count(row, "TOV")?,
        win_loss,
    }))
}

/// Every player in the table, best scorer first.
fn parse_projections(response: &StatsResponse) -> Result<Vec<PlayerProjection>, SportstockError> {
    let table = response.first_table()?;
    let mut players = table
        .rows
        .iter()
        .map(|row| {
            Ok(PlayerProjection {
                player_id: table.text(row, "PLAYER_ID")?,
                name: table.text(row, "PLAYER_NAME")?,
                pts: table.number(row, "PTS")?,
                ast: table.number(row, "AST")?,
                reb: table.number(row, "REB")?,
                stl: table.number(row, "STL")?,
                blk: table.number(row, "BLK")?,
                tov: table.number(row, "TOV")?,
            })
        })
        .collect::<Result<Vec<_>, SportstockError>>()?;
    players.sort_by(|a, b| b.pts.total_cmp(&a.pts));
    Ok(players)
}

fn leading_performer(players: &[PlayerProjection]) -> Option<TopPerformer> {
    players.first().map(|p| TopPerformer {
        player_id: p.player_id.clone(),
        name: p.name.clone(),
        stats: stat_map([
            (PTS, p.pts.trunc()),
            (AST, p.ast.trunc()),
            (REB, p.reb.trunc()),
        ]),
    })
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
             Chrome/124.0 Safari/537.36",
        ),
    );
    headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
    headers.insert(REFERER, HeaderValue::from_static("https://www.nba.com/"));
    headers.insert(ORIGIN, HeaderValue::from_static("https://www.nba.com"));
    headers.insert(
        HeaderName::from_static("x-nba-stats-origin"),
        HeaderValue::from_static("stats"),
    );
    headers.insert(
        HeaderName::from_static("x-nba-stats-token"),
        HeaderValue::from_static("true"),
    );
    headers
}

pub struct NbaStatsAdapter {
    client: Client,
    base_url: String,
    seasons: Vec<String>,
}

impl NbaStatsAdapter {
    pub fn new(
        base_url: impl Into<String>,
        seasons: Vec<String>,
        timeout: Duration,
    ) -> Result<Self, SportstockError> {
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(default_headers())
            .build()
            .map_err(|e| SportstockError::Upstream {
                reason: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            seasons,
        })
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, SportstockError> {
        let base_url = config
            .get_string("stats", "base_url")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let seasons = parse_seasons(
            &config
                .get_string("stats", "seasons")
                .unwrap_or_else(|| DEFAULT_SEASONS.to_string()),
        )?;
        let timeout_secs = config
            .get_int("stats", "timeout_secs", DEFAULT_TIMEOUT_SECS)
            .max(1) as u64;

        Self::new(base_url, seasons, Duration::from_secs(timeout_secs))
    }

    async fn fetch(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<StatsResponse, SportstockError> {
        let url = format!("{}/{endpoint}", self.base_url);
        debug!(%url, ?query, "requesting stats");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| SportstockError::Upstream {
                reason: format!("request to {endpoint} failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(SportstockError::Upstream {
                reason: format!("{endpoint} returned status {}", response.status()),
            });
        }

        response
            .json::<StatsResponse>()
            .await
            .map_err(|e| SportstockError::Upstream {
                reason: format!("failed to decode {endpoint} response: {e}"),
            })
    }

    async fn league_dash(
        &self,
        season: &str,
        last_n_games: &str,
    ) -> Result<Vec<PlayerProjection>, SportstockError> {
        let response = self
            .fetch(
                "leaguedashplayerstats",
                &[
                    ("Season", season),
                    ("SeasonType", SEASON_TYPE),
                    ("PerMode", "PerGame"),
                    ("MeasureType", "Base"),
                    ("LastNGames", last_n_games),
                    ("LeagueID", "00"),
                    ("Month", "0"),
                    ("OpponentTeamID", "0"),
                    ("PaceAdjust", "N"),
                    ("Period", "0"),
                    ("PlusMinus", "N"),
                    ("Rank", "N"),
                ],
            )
            .await?;
        parse_projections(&response)
    }

    /// Run `attempt` for each season in order until one yields data. Only a
    /// season with no data moves on to the next; a failed request makes the
    /// whole call unavailable so an older season never stands in for it.
    async fn first_season_with<T, F, Fut>(&self, what: &str, attempt: F) -> Upstream<T>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<Option<T>, SportstockError>>,
    {
        for season in &self.seasons {
            match attempt(season.clone()).await {
                Ok(Some(value)) => return Upstream::Data(value),
                Ok(None) => debug!(%season, what, "no data for season"),
                Err(e) => {
                    warn!(%season, what, error = %e, "stats request failed");
                    return Upstream::unavailable(e.to_string());
                }
            }
        }
        Upstream::Empty
    }
}

#[async_trait]
impl StatsSource for NbaStatsAdapter {
    async fn last_game_log(&self, player_id: &str) -> Upstream<GameLog> {
        self.first_season_with("game log", |season| async move {
            let response = self
                .fetch(
                    "playergamelog",
                    &[
                        ("PlayerID", player_id),
                        ("Season", season.as_str()),
                        ("SeasonType", SEASON_TYPE),
                    ],
                )
                .await?;
            parse_last_game(&response)
        })
        .await
    }

    async fn top_players(&self, limit: usize) -> Upstream<Vec<PlayerProjection>> {
        self.first_season_with("top players", |season| async move {
            let mut players = self.league_dash(&season, "0").await?;
            players.truncate(limit);
            Ok((!players.is_empty()).then_some(players))
        })
        .await
    }

    async fn top_performer(&self) -> Upstream<TopPerformer> {
        self.first_season_with("top performer", |season| async move {
            let players = self.league_dash(&season, "1").await?;
            Ok(leading_performer(&players))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: Value) -> StatsResponse {
        serde_json::from_value(value).unwrap()
    }

    fn game_log_fixture() -> StatsResponse {
        response(json!({
            "resource": "playergamelog",
            "resultSets": [{
                "name": "PlayerGameLog",
                "headers": ["SEASON_ID", "Player_ID", "Game_ID", "GAME_DATE", "MATCHUP", "WL",
                            "MIN", "PTS", "REB", "AST", "STL", "BLK", "TOV"],
                "rowSet": [
                    ["22024", 2544, "0022400501", "JAN 05, 2025", "LAL vs. BOS", "W",
                     36, 30, 10, 8, 1, 1, 2],
                    ["22024", 2544, "0022400490", "JAN 03, 2025", "LAL @ ATL", "L",
                     34, 21, 6, 9, 0, 2, 4]
                ]
            }]
        }))
    }

    fn league_fixture() -> StatsResponse {
        response(json!({
            "resultSets": [{
                "name": "LeagueDashPlayerStats",
                "headers": ["PLAYER_ID", "PLAYER_NAME", "TEAM_ABBREVIATION", "GP",
                            "REB", "AST", "TOV", "STL", "BLK", "PTS"],
                "rowSet": [
                    [1628983, "Shai Gilgeous-Alexander", "OKC", 60, 5.0, 6.4, 2.4, 2.0, 1.0, 32.7],
                    [203999, "Nikola Jokic", "DEN", 58, 12.7, 10.2, 3.1, 1.8, 0.6, 29.6],
                    [1629029, "Luka Doncic", "LAL", 50, 8.2, 7.7, 3.6, 1.8, 0.4, 28.2],
                    [203507, "Giannis Antetokounmpo", "MIL", 62, 11.9, 6.5, 3.1, 0.9, 1.2, 30.4]
                ]
            }]
        }))
    }

    #[test]
    fn last_game_is_first_row() {
        let game = parse_last_game(&game_log_fixture()).unwrap().unwrap();
        assert_eq!(game.game_date, "JAN 05, 2025");
        assert_eq!(game.matchup, "LAL vs. BOS");
        assert_eq!((game.pts, game.reb, game.ast), (30, 10, 8));
        assert_eq!((game.stl, game.blk, game.tov), (1, 1, 2));
        assert_eq!(game.win_loss.as_deref(), Some("W"));
    }

    #[test]
    fn empty_row_set_means_no_game() {
        let empty = response(json!({
            "resultSets": [{
                "name": "PlayerGameLog",
                "headers": ["GAME_DATE", "MATCHUP", "PTS"],
                "rowSet": []
            }]
        }));
        assert!(parse_last_game(&empty).unwrap().is_none());
    }

    #[test]
    fn missing_column_is_an_error() {
        let broken = response(json!({
            "resultSets": [{
                "headers": ["GAME_DATE", "MATCHUP"],
                "rowSet": [["JAN 05, 2025", "LAL vs. BOS"]]
            }]
        }));
        let err = parse_last_game(&broken).unwrap_err();
        assert!(err.to_string().contains("PTS"), "{err}");
    }

    #[test]
    fn columns_are_found_by_header_name() {
        let reordered = response(json!({
            "resultSets": [{
                "headers": ["TOV", "BLK", "STL", "AST", "REB", "PTS", "MATCHUP", "GAME_DATE"],
                "rowSet": [[3, 2, 1, 9, 7, 25, "LAL @ GSW", "2025-02-01"]]
            }]
        }));
        let game = parse_last_game(&reordered).unwrap().unwrap();
        assert_eq!(game.pts, 25);
        assert_eq!(game.tov, 3);
        assert_eq!(game.matchup, "LAL @ GSW");
        assert_eq!(game.win_loss, None);
    }

    #[test]
    fn projections_are_sorted_by_points() {
        let players = parse_projections(&league_fixture()).unwrap();
        let names: Vec<_> = players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Shai Gilgeous-Alexander",
                "Giannis Antetokounmpo",
                "Nikola Jokic",
                "Luka Doncic"
            ]
        );
        assert_eq!(players[0].player_id, "1628983");
        assert_eq!(players[0].ast, 6.4);
    }

    #[test]
    fn null_stats_read_as_zero() {
        let sparse = response(json!({
            "resultSets": [{
                "headers": ["PLAYER_ID", "PLAYER_NAME", "PTS", "AST", "REB", "STL", "BLK", "TOV"],
                "rowSet": [[1, "Bench Guy", 2.0, null, 1.0, null, null, null]]
            }]
        }));
        let players = parse_projections(&sparse).unwrap();
        assert_eq!(players[0].ast, 0.0);
        assert_eq!(players[0].pts, 2.0);
    }

    #[test]
    fn top_performer_is_leading_scorer_with_whole_stats() {
        let players = parse_projections(&league_fixture()).unwrap();
        let performer = leading_performer(&players).unwrap();
        assert_eq!(performer.name, "Shai Gilgeous-Alexander");
        assert_eq!(performer.stats[PTS], 32.0);
        assert_eq!(performer.stats[AST], 6.0);
        assert_eq!(performer.stats.len(), 3);
        assert!(leading_performer(&[]).is_none());
    }

    #[test]
    fn no_result_sets_is_an_error() {
        let none = response(json!({ "resultSets": [] }));
        assert!(parse_projections(&none).is_err());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let adapter = NbaStatsAdapter::new(
            "http://localhost:9999/stats/",
            vec!["2024-25".into()],
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(adapter.base_url, "http://localhost:9999/stats");
        assert_eq!(adapter.seasons, vec!["2024-25".to_string()]);
    }

    #[tokio::test]
    async fn unreachable_source_is_unavailable() {
        let adapter = NbaStatsAdapter::new(
            "http://127.0.0.1:9",
            vec!["2025-26".into(), "2024-25".into()],
            Duration::from_secs(2),
        )
        .unwrap();
        assert!(matches!(
            adapter.last_game_log("2544").await,
            Upstream::Unavailable { .. }
        ));
        assert!(matches!(
            adapter.top_performer().await,
            Upstream::Unavailable { .. }
        ));
    }

    mod season_fallback {
        use super::*;
        use axum::Router;
        use axum::extract::Query;
        use axum::http::StatusCode;
        use axum::response::{IntoResponse, Json};
        use axum::routing::get;

        fn game_log_json(date: &str, rows: bool) -> Value {
            let row_set = if rows {
                json!([[date, "LAL vs. BOS", 30, 10, 8, 1, 1, 2]])
            } else {
                json!([])
            };
            json!({
                "resultSets": [{
                    "headers": ["GAME_DATE", "MATCHUP", "PTS", "REB", "AST", "STL", "BLK", "TOV"],
                    "rowSet": row_set
                }]
            })
        }

        /// Serve `playergamelog` locally, answering per season with `respond`.
        async fn serve(
            respond: fn(&str) -> Result<Value, StatusCode>,
        ) -> NbaStatsAdapter {
            let app = Router::new().route(
                "/stats/playergamelog",
                get(move |Query(query): Query<HashMap<String, String>>| async move {
                    let season = query.get("Season").cloned().unwrap_or_default();
                    match respond(&season) {
                        Ok(body) => Json(body).into_response(),
                        Err(status) => status.into_response(),
                    }
                }),
            );
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            NbaStatsAdapter::new(
                format!("http://{addr}/stats"),
                vec!["2025-26".into(), "2024-25".into()],
                Duration::from_secs(5),
            )
            .unwrap()
        }

        #[tokio::test]
        async fn failed_current_season_is_unavailable() {
            let adapter = serve(|season| match season {
                "2025-26" => Err(StatusCode::SERVICE_UNAVAILABLE),
                _ => Ok(game_log_json("APR 13, 2025", true)),
            })
            .await;

            match adapter.last_game_log("2544").await {
                Upstream::Unavailable { reason } => assert!(reason.contains("503"), "{reason}"),
                other => panic!("expected Unavailable, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn empty_current_season_falls_back_to_previous() {
            let adapter = serve(|season| match season {
                "2025-26" => Ok(game_log_json("", false)),
                _ => Ok(game_log_json("APR 13, 2025", true)),
            })
            .await;

            match adapter.last_game_log("2544").await {
                Upstream::Data(game) => assert_eq!(game.game_date, "APR 13, 2025"),
                other => panic!("expected Data, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn no_season_with_games_is_empty() {
            let adapter = serve(|_| Ok(game_log_json("", false))).await;
            assert_eq!(adapter.last_game_log("2544").await, Upstream::Empty);
        }
    }
}
