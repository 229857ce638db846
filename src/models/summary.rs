//! Derived per-player statistics.

use serde::{Deserialize, Serialize};

use super::{PlayerId, PlayerRecord};
use crate::calculate::win_rate_percent;

/// Summary statistics for one player, computed from the latest row of
/// their time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSummary {
    /// Player code (unique within a snapshot)
    pub player_id: PlayerId,

    /// Resolved display name, or the player code when unmapped
    pub display_name: String,

    /// Cumulative wins
    pub total_wins: u64,

    /// Cumulative plays
    pub total_plays: u64,

    /// Latest rating
    pub current_rating: i64,

    /// Win percentage (0 to 100, 2 decimals)
    pub overall_win_rate: f64,

    /// Full time series, oldest first
    #[serde(default)]
    pub records: Vec<PlayerRecord>,
}

impl PlayerSummary {
    /// Create a new PlayerSummary with the win rate calculated.
    pub fn new(
        player_id: PlayerId,
        display_name: String,
        total_wins: u64,
        total_plays: u64,
        current_rating: i64,
        records: Vec<PlayerRecord>,
    ) -> Self {
        Self {
            player_id,
            display_name,
            total_wins,
            total_plays,
            current_rating,
            overall_win_rate: win_rate_percent(total_wins, total_plays),
            records,
        }
    }

    /// Latest row of the time series.
    pub fn latest(&self) -> Option<&PlayerRecord> {
        self.records.last()
    }

    /// Whether the player has enough plays to take part in win-rate ranking.
    pub fn is_eligible(&self, min_plays: u64) -> bool {
        self.total_plays >= min_plays
    }
}
