//! SQLite asset store.
//!
//! Stat maps are stored as JSON text, timestamps as fixed-width RFC 3339 UTC
//! text (so they sort lexically), and game dates as `YYYY-MM-DD`.

use crate::domain::asset::{
    Asset, AssetKind, LogSource, MatchLog, NewAsset, PriceHistoryEntry, PriceUpdate, StatMap,
};
use crate::domain::error::SportstockError;
use crate::ports::config_port::ConfigPort;
use crate::ports::store_port::AssetStore;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Type;
use rusqlite::{OptionalExtension, Row, params};
use tracing::debug;

const DATE_FORMAT: &str = "%Y-%m-%d";

const ASSET_COLUMNS: &str = "id, name, ticker, kind, player_id, current_price, projected_stats, \
                             created_at, updated_at";
const LOG_COLUMNS: &str =
    "id, asset_id, game_date, opponent, stats, performance_score, source, created_at";

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn query_err(e: rusqlite::Error) -> SportstockError {
    SportstockError::DatabaseQuery {
        reason: e.to_string(),
    }
}

fn conversion_err(
    column: usize,
    ty: Type,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, ty, Box::new(e))
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(column: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| conversion_err(column, Type::Text, e))
}

fn parse_stats(column: usize, value: &str) -> rusqlite::Result<StatMap> {
    serde_json::from_str(value).map_err(|e| conversion_err(column, Type::Text, e))
}

fn encode_stats(stats: &StatMap) -> Result<String, SportstockError> {
    serde_json::to_string(stats).map_err(|e| SportstockError::Database {
        reason: format!("failed to encode stats: {e}"),
    })
}

#[derive(Debug, thiserror::Error)]
#[error("unknown {what} {value:?}")]
struct UnknownVariant {
    what: &'static str,
    value: String,
}

fn asset_from_row(row: &Row<'_>) -> rusqlite::Result<Asset> {
    let kind: String = row.get(3)?;
    let projected: String = row.get(6)?;
    let created_at: String = row.get(7)?;
    let updated_at: Option<String> = row.get(8)?;
    Ok(Asset {
        id: row.get(0)?,
        name: row.get(1)?,
        ticker: row.get(2)?,
        kind: AssetKind::parse(&kind).ok_or_else(|| {
            conversion_err(
                3,
                Type::Text,
                UnknownVariant {
                    what: "asset kind",
                    value: kind.clone(),
                },
            )
        })?,
        player_id: row.get(4)?,
        current_price: row.get(5)?,
        projected_stats: parse_stats(6, &projected)?,
        created_at: parse_timestamp(7, &created_at)?,
        updated_at: updated_at
            .as_deref()
            .map(|ts| parse_timestamp(8, ts))
            .transpose()?,
    })
}

fn log_from_row(row: &Row<'_>) -> rusqlite::Result<MatchLog> {
    let game_date: String = row.get(2)?;
    let stats: String = row.get(4)?;
    let source: String = row.get(6)?;
    let created_at: String = row.get(7)?;
    Ok(MatchLog {
        id: row.get(0)?,
        asset_id: row.get(1)?,
        game_date: NaiveDate::parse_from_str(&game_date, DATE_FORMAT)
            .map_err(|e| conversion_err(2, Type::Text, e))?,
        opponent: row.get(3)?,
        stats: parse_stats(4, &stats)?,
        performance_score: row.get(5)?,
        source: LogSource::parse(&source).ok_or_else(|| {
            conversion_err(
                6,
                Type::Text,
                UnknownVariant {
                    what: "log source",
                    value: source.clone(),
                },
            )
        })?,
        created_at: parse_timestamp(7, &created_at)?,
    })
}

fn history_from_row(row: &Row<'_>) -> rusqlite::Result<PriceHistoryEntry> {
    let timestamp: String = row.get(3)?;
    Ok(PriceHistoryEntry {
        id: row.get(0)?,
        asset_id: row.get(1)?,
        price: row.get(2)?,
        timestamp: parse_timestamp(3, &timestamp)?,
    })
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, SportstockError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| SportstockError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("sqlite", "pool_size", 4).max(1) as u32;

        let manager = SqliteConnectionManager::file(&db_path)
            .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
        let pool =
            Pool::builder()
                .max_size(pool_size)
                .build(manager)
                .map_err(|e: r2d2::Error| SportstockError::Database {
                    reason: e.to_string(),
                })?;

        debug!(path = %db_path, pool_size, "opened sqlite pool");
        Ok(Self { pool })
    }

    /// Single-connection in-memory store; the one connection keeps the
    /// database alive for the adapter's lifetime.
    pub fn in_memory() -> Result<Self, SportstockError> {
        let manager = SqliteConnectionManager::memory()
            .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| SportstockError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, SportstockError> {
        self.pool
            .get()
            .map_err(|e: r2d2::Error| SportstockError::Database {
                reason: e.to_string(),
            })
    }

    pub fn initialize_schema(&self) -> Result<(), SportstockError> {
        let conn = self.conn()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS assets (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                ticker TEXT NOT NULL UNIQUE,
                kind TEXT NOT NULL DEFAULT 'player',
                player_id TEXT,
                current_price REAL NOT NULL,
                projected_stats TEXT NOT NULL DEFAULT '{}',
                created_at TEXT NOT NULL,
                updated_at TEXT
            );
            CREATE TABLE IF NOT EXISTS match_logs (
                id TEXT PRIMARY KEY,
                asset_id TEXT NOT NULL REFERENCES assets(id),
                game_date TEXT NOT NULL,
                opponent TEXT NOT NULL,
                stats TEXT NOT NULL,
                performance_score REAL NOT NULL,
                source TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE UNIQUE INDEX IF NOT EXISTS idx_match_logs_live_game
                ON match_logs(asset_id, game_date) WHERE source = 'live';
            CREATE INDEX IF NOT EXISTS idx_match_logs_asset_date
                ON match_logs(asset_id, game_date);
            CREATE TABLE IF NOT EXISTS price_history (
                id TEXT PRIMARY KEY,
                asset_id TEXT NOT NULL REFERENCES assets(id),
                price REAL NOT NULL,
                timestamp TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_price_history_asset_ts
                ON price_history(asset_id, timestamp);",
        )
        .map_err(query_err)?;

        Ok(())
    }
}

impl AssetStore for SqliteAdapter {
    fn list_assets(&self) -> Result<Vec<Asset>, SportstockError> {
        let conn = self.conn()?;
        let query = format!("SELECT {ASSET_COLUMNS} FROM assets ORDER BY created_at, ticker");
        let mut stmt = conn.prepare(&query).map_err(query_err)?;
        let rows = stmt.query_map([], asset_from_row).map_err(query_err)?;

        let mut assets = Vec::new();
        for row in rows {
            assets.push(row.map_err(query_err)?);
        }
        Ok(assets)
    }

    fn count_assets(&self) -> Result<usize, SportstockError> {
        let conn = self.conn()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM assets", [], |row| row.get(0))
            .map_err(query_err)?;
        Ok(count as usize)
    }

    fn get_asset(&self, id: &str) -> Result<Option<Asset>, SportstockError> {
        let conn = self.conn()?;
        let query = format!("SELECT {ASSET_COLUMNS} FROM assets WHERE id = ?1");
        conn.query_row(&query, params![id], asset_from_row)
            .optional()
            .map_err(query_err)
    }

    fn insert_asset(&self, asset: &NewAsset) -> Result<Option<Asset>, SportstockError> {
        let conn = self.conn()?;
        let stored = asset.clone().into_asset(Utc::now());
        let projected = encode_stats(&stored.projected_stats)?;

        let inserted = conn
            .execute(
                "INSERT INTO assets (id, name, ticker, kind, player_id, current_price,
                                     projected_stats, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL)
                 ON CONFLICT(ticker) DO NOTHING",
                params![
                    stored.id,
                    stored.name,
                    stored.ticker,
                    stored.kind.as_str(),
                    stored.player_id,
                    stored.current_price,
                    projected,
                    format_timestamp(&stored.created_at),
                ],
            )
            .map_err(query_err)?;

        Ok((inserted == 1).then_some(stored))
    }

    fn match_logs(&self, asset_id: &str) -> Result<Vec<MatchLog>, SportstockError> {
        let conn = self.conn()?;
        let query = format!(
            "SELECT {LOG_COLUMNS} FROM match_logs
             WHERE asset_id = ?1
             ORDER BY game_date DESC, created_at DESC"
        );
        let mut stmt = conn.prepare(&query).map_err(query_err)?;
        let rows = stmt
            .query_map(params![asset_id], log_from_row)
            .map_err(query_err)?;

        let mut logs = Vec::new();
        for row in rows {
            logs.push(row.map_err(query_err)?);
        }
        Ok(logs)
    }

    fn latest_live_game_date(&self, asset_id: &str) -> Result<Option<NaiveDate>, SportstockError> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT MAX(game_date) FROM match_logs
             WHERE asset_id = ?1 AND source = 'live'",
            params![asset_id],
            |row| {
                let latest: Option<String> = row.get(0)?;
                latest
                    .map(|d| {
                        NaiveDate::parse_from_str(&d, DATE_FORMAT)
                            .map_err(|e| conversion_err(0, Type::Text, e))
                    })
                    .transpose()
            },
        )
        .map_err(query_err)
    }

    fn price_history(&self, asset_id: &str) -> Result<Vec<PriceHistoryEntry>, SportstockError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, asset_id, price, timestamp FROM price_history
                 WHERE asset_id = ?1
                 ORDER BY timestamp ASC, rowid ASC",
            )
            .map_err(query_err)?;
        let rows = stmt
            .query_map(params![asset_id], history_from_row)
            .map_err(query_err)?;

        let mut history = Vec::new();
        for row in rows {
            history.push(row.map_err(query_err)?);
        }
        Ok(history)
    }

    fn record_price_update(&self, update: &PriceUpdate) -> Result<(), SportstockError> {
        let mut conn = self.conn()?;
        let stats = encode_stats(&update.log.stats)?;
        let tx = conn.transaction().map_err(query_err)?;

        let changed = tx
            .execute(
                "UPDATE assets SET current_price = ?1, updated_at = ?2 WHERE id = ?3",
                params![
                    update.new_price(),
                    format_timestamp(&update.history.timestamp),
                    update.asset_id(),
                ],
            )
            .map_err(query_err)?;
        if changed == 0 {
            return Err(SportstockError::asset_not_found(update.asset_id()));
        }

        let log = &update.log;
        tx.execute(
            "INSERT INTO match_logs (id, asset_id, game_date, opponent, stats,
                                     performance_score, source, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                log.id,
                log.asset_id,
                log.game_date.format(DATE_FORMAT).to_string(),
                log.opponent,
                stats,
                log.performance_score,
                log.source.as_str(),
                format_timestamp(&log.created_at),
            ],
        )
        .map_err(query_err)?;

        let history = &update.history;
        tx.execute(
            "INSERT INTO price_history (id, asset_id, price, timestamp)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                history.id,
                history.asset_id,
                history.price,
                format_timestamp(&history.timestamp),
            ],
        )
        .map_err(query_err)?;

        tx.commit().map_err(query_err)?;
        Ok(())
    }

    fn clear_all(&self) -> Result<(), SportstockError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_err)?;
        tx.execute_batch(
            "DELETE FROM price_history;
             DELETE FROM match_logs;
             DELETE FROM assets;",
        )
        .map_err(query_err)?;
        tx.commit().map_err(query_err)?;
        Ok(())
    }
}
