//! Where player data comes from.
//!
//! A [`DataSource`] serves the same four things the backend does: the list
//! of per-player files, one player's CSV, the name mapping and a player's
//! daily snapshot history. The loader only talks to this trait.

mod dir;
mod http;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{AppConfig, SourceKind};
use crate::fetch::{BoardClient, FetchError};
use crate::models::{PlayerId, SnapshotRecord};

pub use dir::{DirSource, NAMES_FILE};
pub use http::HttpSource;

/// Errors from a data source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Player not found: {0}")]
    NotFound(String),

    #[error("No data rows for player {0}")]
    Empty(String),
}

/// Backend abstraction for player data.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Source name for logging.
    fn name(&self) -> &'static str;

    /// Per-player CSV file names, e.g. `Y9P7BN4JF.csv`.
    async fn list_files(&self) -> Result<Vec<String>, SourceError>;

    /// Raw CSV text for one player.
    async fn player_csv(&self, id: &PlayerId) -> Result<String, SourceError>;

    /// Player code to display name mapping.
    async fn name_mapping(&self) -> Result<BTreeMap<PlayerId, String>, SourceError>;

    /// Daily snapshots for one player, newest first, optionally limited to
    /// the most recent `days`.
    async fn player_history(
        &self,
        id: &PlayerId,
        days: Option<u32>,
    ) -> Result<Vec<SnapshotRecord>, SourceError>;
}

/// Build the data source selected in the configuration.
pub fn from_config(config: &AppConfig) -> Result<Arc<dyn DataSource>, SourceError> {
    match config.source.kind {
        SourceKind::Dir => Ok(Arc::new(DirSource::new(&config.data_dir))),
        SourceKind::Http => {
            let client = BoardClient::new(config.client_config())?;
            Ok(Arc::new(HttpSource::new(client)))
        }
    }
}
