//! Bulk snapshot loading.
//!
//! Lists the source's files, loads the name mapping, then fetches, parses
//! and derives every player concurrently. A player that fails is logged
//! and skipped; the load itself never fails.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::calculate::derive_summary;
use crate::models::{BoardSnapshot, PlayerId, PlayerSummary};
use crate::names::NameResolver;
use crate::parse::parse_csv;
use crate::source::{DataSource, SourceError};

/// File list used when the source cannot list its files.
pub const FALLBACK_FILES: &[&str] = &[
    "LDMLC6RLG.csv",
    "08VW66RLF.csv",
    "4QVF9V6RF.csv",
    "66NT81CTF.csv",
    "Q5MBL99QG.csv",
    "D8CJ2W62H.csv",
    "Y9P7BN4JF.csv",
    "SQW0796SF.csv",
    "D221SPHLF.csv",
];

/// Loader settings.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Players fetched at once
    pub max_concurrency: usize,

    /// File list used when listing fails
    pub fallback_files: Vec<String>,

    /// Name mapping used when the source has none
    pub fallback_names: BTreeMap<PlayerId, String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            fallback_files: FALLBACK_FILES.iter().map(|f| f.to_string()).collect(),
            fallback_names: BTreeMap::new(),
        }
    }
}

/// Load every player from `source` into a new snapshot.
pub async fn load_snapshot(source: Arc<dyn DataSource>, config: &LoaderConfig) -> BoardSnapshot {
    let files = match source.list_files().await {
        Ok(files) => files,
        Err(e) => {
            warn!(
                "Failed to list files from {} source, using fallback list: {}",
                source.name(),
                e
            );
            config.fallback_files.clone()
        }
    };

    // Deduplicated and ordered by code
    let ids: BTreeSet<PlayerId> = files
        .iter()
        .filter(|f| f.trim().ends_with(".csv"))
        .filter_map(|f| PlayerId::from_file_name(f))
        .collect();

    let names = match source.name_mapping().await {
        Ok(mapping) => NameResolver::new(mapping),
        Err(e) => {
            warn!("Failed to load name mapping, using fallback: {}", e);
            NameResolver::new(config.fallback_names.clone())
        }
    };

    info!(
        "Loading {} players from {} source ({} names)",
        ids.len(),
        source.name(),
        names.len()
    );

    let semaphore = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
    let mut tasks = JoinSet::new();
    // Players whose task has not reported back
    let mut pending = ids.clone();

    for id in ids {
        let source = Arc::clone(&source);
        let semaphore = Arc::clone(&semaphore);
        let display_name = names.resolve_name(id.as_str()).to_string();

        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            let result = load_player(source.as_ref(), &id, display_name).await;
            (id, result)
        });
    }

    let mut players = Vec::new();
    let mut skipped = Vec::new();

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((id, Ok(summary))) => {
                pending.remove(&id);
                players.push(summary);
            }
            Ok((id, Err(e))) => {
                warn!("Skipping player {}: {}", id, e);
                pending.remove(&id);
                skipped.push(id);
            }
            Err(e) => warn!("Player load task failed: {}", e),
        }
    }

    for id in pending {
        warn!("Skipping player {}: load task did not complete", id);
        skipped.push(id);
    }

    let snapshot = BoardSnapshot::new(players, names).with_skipped(skipped);
    info!(
        "Loaded {} players ({} skipped)",
        snapshot.len(),
        snapshot.skipped().len()
    );
    snapshot
}

async fn load_player(
    source: &dyn DataSource,
    id: &PlayerId,
    display_name: String,
) -> Result<PlayerSummary, SourceError> {
    let text = source.player_csv(id).await?;
    let table = parse_csv(&text);
    debug!("Parsed {} rows for {}", table.records.len(), id);

    derive_summary(id.clone(), table.records, display_name)
        .ok_or_else(|| SourceError::Empty(id.to_string()))
}
