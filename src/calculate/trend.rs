//! Chart series for a player's recent activity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::PlayerRecord;

/// Rows shown in the daily stats chart.
pub const DAILY_WINDOW: usize = 30;

/// Rows shown in the rating and win-rate trend charts.
pub const TREND_WINDOW: usize = 60;

/// Which chart to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendKind {
    /// Daily wins and plays, last 30 rows
    #[default]
    Daily,
    /// Rating, last 60 rows
    Rating,
    /// Recorded win rate as a percentage, last 60 rows
    WinRate,
}

impl TrendKind {
    pub fn window(&self) -> usize {
        match self {
            TrendKind::Daily => DAILY_WINDOW,
            TrendKind::Rating | TrendKind::WinRate => TREND_WINDOW,
        }
    }
}

impl fmt::Display for TrendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendKind::Daily => write!(f, "daily"),
            TrendKind::Rating => write!(f, "rating"),
            TrendKind::WinRate => write!(f, "win_rate"),
        }
    }
}

impl FromStr for TrendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "daily" | "daily_stats" | "dailystats" => Ok(TrendKind::Daily),
            "rating" | "rating_trend" | "ratingtrend" => Ok(TrendKind::Rating),
            "win_rate" | "winrate" | "win_rate_trend" | "winratetrend" => Ok(TrendKind::WinRate),
            other => Err(format!("unknown trend kind: {}", other)),
        }
    }
}

/// One named series of values aligned with the chart labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    pub values: Vec<f64>,
}

/// Labels plus one or more datasets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub kind: TrendKind,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

/// Build a chart series from a player's rows (oldest first).
pub fn build_trend(records: &[PlayerRecord], kind: TrendKind) -> TrendSeries {
    let window = &records[records.len().saturating_sub(kind.window())..];
    let labels = window.iter().map(label).collect();

    let datasets = match kind {
        TrendKind::Daily => vec![
            dataset("wins", window, |r| r.wins() as f64),
            dataset("plays", window, |r| r.plays() as f64),
        ],
        TrendKind::Rating => vec![dataset("rating", window, |r| r.rating() as f64)],
        TrendKind::WinRate => vec![dataset("win_rate", window, |r| r.win_rate() * 100.0)],
    };

    TrendSeries {
        kind,
        labels,
        datasets,
    }
}

/// Date part of a row's timestamp.
fn label(record: &PlayerRecord) -> String {
    record
        .timestamp()
        .split(' ')
        .next()
        .unwrap_or_default()
        .to_string()
}

fn dataset(name: &str, rows: &[PlayerRecord], value: impl Fn(&PlayerRecord) -> f64) -> Dataset {
    Dataset {
        name: name.to_string(),
        values: rows.iter().map(value).collect(),
    }
}
