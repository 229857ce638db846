//! Player time-series rows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::calculate::{parse_count_or_zero, parse_float_or_zero, parse_int_or_zero};

/// Column names used by the per-player CSV files.
pub mod columns {
    pub const TIME: &str = "time";
    pub const WINS: &str = "wins";
    pub const PLAYS: &str = "plays";
    pub const WIN_RATE: &str = "win_rate";
    pub const RATE: &str = "rate";
    pub const RATE_CHANGE: &str = "rate_change";
    pub const WINS_TOTAL: &str = "wins_total";
    pub const PLAYS_TOTAL: &str = "plays_total";
}

/// One row of a player's time series, keyed by header name.
///
/// Raw values are kept as text; the typed accessors coerce on read and
/// fall back to zero (or an empty string) when a field is missing or
/// malformed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerRecord {
    fields: BTreeMap<String, String>,
}

impl PlayerRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from `(field, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Raw value of a field, or `""` when absent.
    pub fn get(&self, field: &str) -> &str {
        self.fields.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Date or datetime text of this row.
    pub fn timestamp(&self) -> &str {
        self.get(columns::TIME)
    }

    /// Wins on this day.
    pub fn wins(&self) -> u64 {
        parse_count_or_zero(self.get(columns::WINS))
    }

    /// Plays on this day.
    pub fn plays(&self) -> u64 {
        parse_count_or_zero(self.get(columns::PLAYS))
    }

    /// Cumulative wins to date.
    pub fn wins_total(&self) -> u64 {
        parse_count_or_zero(self.get(columns::WINS_TOTAL))
    }

    /// Cumulative plays to date.
    pub fn plays_total(&self) -> u64 {
        parse_count_or_zero(self.get(columns::PLAYS_TOTAL))
    }

    pub fn rating(&self) -> i64 {
        parse_int_or_zero(self.get(columns::RATE))
    }

    pub fn rating_change(&self) -> i64 {
        parse_int_or_zero(self.get(columns::RATE_CHANGE))
    }

    /// Fractional win rate (0.0 to 1.0) as recorded in the row.
    pub fn win_rate(&self) -> f64 {
        parse_float_or_zero(self.get(columns::WIN_RATE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PlayerRecord {
        PlayerRecord::from_pairs([
            ("time", "2024-05-13 22:04:25"),
            ("wins", "7"),
            ("plays", "12"),
            ("win_rate", "0.58"),
            ("rate", "4210"),
            ("rate_change", "-35"),
            ("wins_total", "1503"),
            ("plays_total", "2890"),
        ])
    }

    #[test]
    fn test_typed_accessors() {
        let record = sample();
        assert_eq!(record.timestamp(), "2024-05-13 22:04:25");
        assert_eq!(record.wins(), 7);
        assert_eq!(record.plays(), 12);
        assert_eq!(record.wins_total(), 1503);
        assert_eq!(record.plays_total(), 2890);
        assert_eq!(record.rating(), 4210);
        assert_eq!(record.rating_change(), -35);
        assert!((record.win_rate() - 0.58).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_fields_default() {
        let record = PlayerRecord::new();
        assert_eq!(record.get("anything"), "");
        assert_eq!(record.timestamp(), "");
        assert_eq!(record.wins_total(), 0);
        assert_eq!(record.rating(), 0);
        assert_eq!(record.win_rate(), 0.0);
        assert!(record.is_empty());
    }

    #[test]
    fn test_malformed_numbers_default_to_zero() {
        let record = PlayerRecord::from_pairs([("wins_total", "n/a"), ("rate", "")]);
        assert_eq!(record.wins_total(), 0);
        assert_eq!(record.rating(), 0);
    }

    #[test]
    fn test_insert_overwrites() {
        let mut record = PlayerRecord::new();
        record.insert("wins", "1");
        record.insert("wins", "2");
        assert_eq!(record.wins(), 2);
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_serializes_as_field_map() {
        let record = PlayerRecord::from_pairs([("time", "2024-01-01"), ("wins", "5")]);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["time"], "2024-01-01");
        assert_eq!(json["wins"], "5");
    }
}
