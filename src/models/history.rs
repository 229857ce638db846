//! Daily snapshot history models.

use serde::{Deserialize, Serialize};

/// One daily snapshot of a player's cumulative versus counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    /// When the snapshot was taken (date or datetime text)
    #[serde(default, alias = "stat_date", alias = "record_time")]
    pub created_at: String,

    /// Cumulative wins
    #[serde(default)]
    pub versus_won: i64,

    /// Cumulative plays
    #[serde(default)]
    pub versus_plays: i64,

    /// Rating at snapshot time
    #[serde(default)]
    pub versus_rating: i64,
}

/// Per-day increment derived from two successive snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyDelta {
    /// Display date (`YYYY-MM-DD`), already shifted one day forward
    pub date: String,
    pub rating: i64,
    pub daily_wins: u64,
    pub daily_plays: u64,
    /// Percentage, 2 decimals
    pub daily_win_rate: f64,
}

/// Totals over a window of daily deltas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub days: usize,
    pub total_wins: u64,
    pub total_plays: u64,
    pub win_rate: f64,
    pub latest_rating: Option<i64>,
    /// Newest rating minus oldest rating in the window
    pub rating_change: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_record_from_backend_json() {
        let json = r#"{"pid":"Y9P7BN4JF","created_at":"2025-03-02 04:00:00","versus_rating":5120,"versus_won":812,"versus_plays":1600}"#;
        let record: SnapshotRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.created_at, "2025-03-02 04:00:00");
        assert_eq!(record.versus_won, 812);
        assert_eq!(record.versus_plays, 1600);
        assert_eq!(record.versus_rating, 5120);
    }

    #[test]
    fn test_snapshot_record_accepts_stat_date() {
        let json = r#"{"stat_date":"2025-03-02","versus_won":1}"#;
        let record: SnapshotRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.created_at, "2025-03-02");
        assert_eq!(record.versus_plays, 0);
    }
}
