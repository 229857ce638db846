//! # Versus Board
//!
//! Leaderboard and player statistics for a versus game mode.
//!
//! ## Architecture
//!
//! - **parse**: Per-player CSV parsing
//! - **models**: Core data structures (records, summaries, snapshots)
//! - **calculate**: Summary stats, daily deltas and trend series
//! - **names**: Player code to display name resolution
//! - **ranking**: Leaderboard ordering, podium and pagination
//! - **fetch**: HTTP client for the board backend
//! - **source**: Local directory and remote data sources
//! - **loader**: Concurrent snapshot loading
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod fetch;
pub mod loader;
pub mod models;
pub mod names;
pub mod parse;
pub mod ranking;
pub mod source;

pub use models::*;
