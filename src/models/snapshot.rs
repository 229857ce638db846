//! Immutable board snapshot.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::{PlayerId, PlayerSummary};
use crate::names::{matches_query, NameResolver, MIN_SUGGEST_LEN};

/// Fully loaded player set plus the name mapping it was built with.
///
/// A snapshot is never mutated; reloading builds a new one. Players are
/// kept ordered by player code so every view derived from a snapshot is
/// independent of the order in which players finished loading.
#[derive(Debug, Clone)]
pub struct BoardSnapshot {
    players: BTreeMap<PlayerId, PlayerSummary>,
    names: NameResolver,
    loaded_at: DateTime<Utc>,
    skipped: Vec<PlayerId>,
}

impl BoardSnapshot {
    /// Build a snapshot from derived summaries. A later duplicate code replaces an earlier one.
    pub fn new(players: impl IntoIterator<Item = PlayerSummary>, names: NameResolver) -> Self {
        Self {
            players: players
                .into_iter()
                .map(|p| (p.player_id.clone(), p))
                .collect(),
            names,
            loaded_at: Utc::now(),
            skipped: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), NameResolver::empty())
    }

    /// Record players that could not be loaded.
    pub fn with_skipped(mut self, mut skipped: Vec<PlayerId>) -> Self {
        skipped.sort();
        self.skipped = skipped;
        self
    }

    pub fn get(&self, id: &str) -> Option<&PlayerSummary> {
        self.players.get(id)
    }

    /// Players in player-code order.
    pub fn players(&self) -> impl Iterator<Item = &PlayerSummary> {
        self.players.values()
    }

    pub fn player_ids(&self) -> impl Iterator<Item = &PlayerId> {
        self.players.keys()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn names(&self) -> &NameResolver {
        &self.names
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn skipped(&self) -> &[PlayerId] {
        &self.skipped
    }

    /// Look a player up by exact code, falling back to a display-name match.
    pub fn find(&self, query: &str) -> Option<&PlayerSummary> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        self.get(query)
            .or_else(|| self.get(&self.names.resolve_id(query)))
    }

    /// Loaded players whose code or display name contains `query`.
    pub fn suggest(&self, query: &str) -> Vec<&PlayerSummary> {
        let query = query.trim();
        if query.chars().count() < MIN_SUGGEST_LEN {
            return Vec::new();
        }

        let needle = query.to_lowercase();
        self.players()
            .filter(|p| matches_query(&needle, p.player_id.as_str(), &p.display_name))
            .collect()
    }
}
