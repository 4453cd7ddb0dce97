//! Concrete adapter implementations for ports.

pub mod file_config_adapter;
pub mod nba_stats_adapter;
#[cfg(feature = "sqlite")]
pub mod sqlite_adapter;
#[cfg(feature = "web")]
pub mod web;
