//! Player name resolution.
//!
//! Maps opaque player codes to display names and back. Lookups by name are
//! case-insensitive substring matches. When several names contain the query,
//! the first match in mapping order wins; the mapping is ordered by player
//! code, so that is the match with the smallest code. There is no exact-match
//! priority.

use std::collections::BTreeMap;

use crate::models::PlayerId;

/// Minimum query length for live suggestions.
pub const MIN_SUGGEST_LEN: usize = 2;

/// Case-insensitive check of a lowercase needle against a player's code and name.
pub fn matches_query(needle_lower: &str, id: &str, name: &str) -> bool {
    id.to_lowercase().contains(needle_lower) || name.to_lowercase().contains(needle_lower)
}

/// Player code to display name mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameResolver {
    mapping: BTreeMap<PlayerId, String>,
}

impl NameResolver {
    pub fn new(mapping: BTreeMap<PlayerId, String>) -> Self {
        Self { mapping }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Display name for a player code; the code itself when unmapped or blank.
    pub fn resolve_name<'a>(&'a self, id: &'a str) -> &'a str {
        match self.mapping.get(id) {
            Some(name) if !name.trim().is_empty() => name,
            _ => id,
        }
    }

    /// Player code whose display name contains `query`.
    ///
    /// Returns `query` unchanged when nothing matches, so callers can treat
    /// it as a literal player code.
    pub fn resolve_id(&self, query: &str) -> String {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return query.to_string();
        }

        self.mapping
            .iter()
            .find(|(_, name)| name.to_lowercase().contains(&needle))
            .map(|(id, _)| id.to_string())
            .unwrap_or_else(|| query.to_string())
    }

    pub fn mapping(&self) -> &BTreeMap<PlayerId, String> {
        &self.mapping
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

impl From<BTreeMap<PlayerId, String>> for NameResolver {
    fn from(mapping: BTreeMap<PlayerId, String>) -> Self {
        Self::new(mapping)
    }
}
