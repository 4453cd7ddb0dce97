//! Core domain types and logic.

pub mod asset;
pub mod config_validation;
pub mod error;
pub mod game_log;
pub mod pricing;
pub mod roster;
pub mod scoring;
pub mod simulation;
pub mod sync;
