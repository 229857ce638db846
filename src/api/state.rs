use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::loader::load_snapshot;
use crate::models::BoardSnapshot;
use crate::source::DataSource;

/// Shared server state.
///
/// Handlers clone the current snapshot `Arc` and release the lock before
/// computing anything. Reloads build a new snapshot off to the side and
/// swap it in.
#[derive(Clone)]
pub struct AppState {
    pub snapshot: Arc<RwLock<Arc<BoardSnapshot>>>,
    pub source: Arc<dyn DataSource>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(snapshot: BoardSnapshot, source: Arc<dyn DataSource>, config: AppConfig) -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(Arc::new(snapshot))),
            source,
            config: Arc::new(config),
        }
    }

    /// Load an initial snapshot from `source`.
    pub async fn load(source: Arc<dyn DataSource>, config: AppConfig) -> Self {
        let snapshot = load_snapshot(Arc::clone(&source), &config.loader_config()).await;
        Self::new(snapshot, source, config)
    }

    pub async fn current(&self) -> Arc<BoardSnapshot> {
        Arc::clone(&*self.snapshot.read().await)
    }

    /// Rebuild the snapshot and swap it in.
    ///
    /// An empty result never replaces a non-empty snapshot.
    pub async fn reload(&self) -> Arc<BoardSnapshot> {
        let fresh = load_snapshot(Arc::clone(&self.source), &self.config.loader_config()).await;

        let mut guard = self.snapshot.write().await;
        if fresh.is_empty() && !guard.is_empty() {
            warn!(
                "Reload produced no players, keeping snapshot from {}",
                guard.loaded_at()
            );
            return Arc::clone(&*guard);
        }

        info!("Snapshot reloaded: {} players", fresh.len());
        *guard = Arc::new(fresh);
        Arc::clone(&*guard)
    }

    /// Reload every `interval` in the background.
    pub fn spawn_reload(&self, interval: Duration) -> JoinHandle<()> {
        let state = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // First tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                state.reload().await;
            }
        })
    }
}
