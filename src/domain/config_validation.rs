//! Configuration validation.
//!
//! Validates every config value the server and CLI read before anything is
//! started.

use crate::domain::error::SportstockError;
use crate::domain::pricing::PricingEngine;
use crate::ports::config_port::ConfigPort;
use std::net::SocketAddr;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:8000";
pub const DEFAULT_SEASONS: &str = "2025-26,2024-25";
pub const DEFAULT_TIMEOUT_SECS: i64 = 10;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), SportstockError> {
    validate_listen(config)?;
    validate_sqlite(config)?;
    validate_pricing(config)?;
    validate_stats(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> SportstockError {
    SportstockError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_listen(config: &dyn ConfigPort) -> Result<(), SportstockError> {
    let listen = config
        .get_string("server", "listen")
        .unwrap_or_else(|| DEFAULT_LISTEN.to_string());
    if listen.parse::<SocketAddr>().is_err() {
        return Err(invalid(
            "server",
            "listen",
            "listen must be an address like 127.0.0.1:8000",
        ));
    }
    Ok(())
}

fn validate_sqlite(config: &dyn ConfigPort) -> Result<(), SportstockError> {
    match config.get_string("sqlite", "path") {
        None => {
            return Err(SportstockError::ConfigMissing {
                section: "sqlite".to_string(),
                key: "path".to_string(),
            });
        }
        Some(path) if path.trim().is_empty() => {
            return Err(invalid("sqlite", "path", "path must not be empty"));
        }
        Some(_) => {}
    }
    if config.get_int("sqlite", "pool_size", 4) < 1 {
        return Err(invalid("sqlite", "pool_size", "pool_size must be at least 1"));
    }
    Ok(())
}

fn validate_pricing(config: &dyn ConfigPort) -> Result<(), SportstockError> {
    PricingEngine::from_config(config).map(|_| ())
}

fn validate_stats(config: &dyn ConfigPort) -> Result<(), SportstockError> {
    if config.get_int("stats", "timeout_secs", DEFAULT_TIMEOUT_SECS) <= 0 {
        return Err(invalid(
            "stats",
            "timeout_secs",
            "timeout_secs must be positive",
        ));
    }
    if config.get_int("stats", "top_players_limit", 50) < 1 {
        return Err(invalid(
            "stats",
            "top_players_limit",
            "top_players_limit must be at least 1",
        ));
    }
    let seasons = config
        .get_string("stats", "seasons")
        .unwrap_or_else(|| DEFAULT_SEASONS.to_string());
    parse_seasons(&seasons)?;
    Ok(())
}

/// Parse a comma-separated season list such as `2025-26,2024-25`.
pub fn parse_seasons(input: &str) -> Result<Vec<String>, SportstockError> {
    let mut seasons = Vec::new();
    for token in input.split(',') {
        let season = token.trim();
        if !is_season(season) {
            return Err(invalid(
                "stats",
                "seasons",
                &format!("invalid season {season:?} (expected YYYY-YY)"),
            ));
        }
        seasons.push(season.to_string());
    }
    Ok(seasons)
}

fn is_season(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 7
        && bytes[4] == b'-'
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[5..].iter().all(u8::is_ascii_digit)
}
