//! Daily delta calculation from cumulative snapshots.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::win_rate_percent;
use crate::models::{DailyDelta, HistoryStats, PlayerRecord, SnapshotRecord};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Calendar date of a snapshot timestamp, if it can be read.
pub fn parse_timestamp_date(timestamp: &str) -> Option<NaiveDate> {
    let ts = timestamp.trim();
    if ts.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Some(dt.date_naive());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(ts, fmt) {
            return Some(dt.date());
        }
    }

    let date_part = ts.split([' ', 'T']).next().unwrap_or(ts);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

/// Display date for a snapshot: its date shifted one calendar day forward.
///
/// Upstream stamps each snapshot with the previous day's date, so the shift
/// is part of the contract. Unreadable timestamps are returned as-is.
pub fn display_date(timestamp: &str) -> String {
    parse_timestamp_date(timestamp)
        .and_then(|d| d.succ_opt())
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

/// Per-day deltas for a newest-first snapshot sequence.
///
/// Each record is diffed against the next older one. The oldest record has
/// no older neighbor and reports its raw cumulative counters. Negative
/// deltas (counter resets) are floored at 0.
pub fn compute_daily_deltas(history: &[SnapshotRecord]) -> Vec<DailyDelta> {
    history
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let (wins, plays) = match history.get(i + 1) {
                Some(older) => (
                    record.versus_won.saturating_sub(older.versus_won),
                    record.versus_plays.saturating_sub(older.versus_plays),
                ),
                None => (record.versus_won, record.versus_plays),
            };

            let daily_wins = wins.max(0) as u64;
            let daily_plays = plays.max(0) as u64;

            DailyDelta {
                date: display_date(&record.created_at),
                rating: record.versus_rating,
                daily_wins,
                daily_plays,
                daily_win_rate: win_rate_percent(daily_wins, daily_plays),
            }
        })
        .collect()
}

/// Totals over a newest-first delta window.
pub fn summarize_history(deltas: &[DailyDelta]) -> HistoryStats {
    let total_wins = deltas
        .iter()
        .fold(0u64, |acc, d| acc.saturating_add(d.daily_wins));
    let total_plays = deltas
        .iter()
        .fold(0u64, |acc, d| acc.saturating_add(d.daily_plays));
    let latest_rating = deltas.first().map(|d| d.rating);
    let rating_change = match (deltas.first(), deltas.last()) {
        (Some(newest), Some(oldest)) => newest.rating.saturating_sub(oldest.rating),
        _ => 0,
    };

    HistoryStats {
        days: deltas.len(),
        total_wins,
        total_plays,
        win_rate: win_rate_percent(total_wins, total_plays),
        latest_rating,
        rating_change,
    }
}

/// Newest-first snapshots built from an oldest-first CSV series.
///
/// `days` limits the result to the most recent rows.
pub fn snapshots_from_records(records: &[PlayerRecord], days: Option<usize>) -> Vec<SnapshotRecord> {
    records
        .iter()
        .rev()
        .take(days.unwrap_or(usize::MAX))
        .map(|r| SnapshotRecord {
            created_at: r.timestamp().to_string(),
            versus_won: r.wins_total() as i64,
            versus_plays: r.plays_total() as i64,
            versus_rating: r.rating(),
        })
        .collect()
}
