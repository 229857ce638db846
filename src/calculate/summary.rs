//! Player summary derivation.

use crate::models::{PlayerId, PlayerRecord, PlayerSummary};

/// Derive a player's summary from their time series (oldest first).
///
/// The last row is taken as the latest snapshot. Returns `None` for an
/// empty series; callers skip that player rather than abort a load.
pub fn derive_summary(
    player_id: PlayerId,
    records: Vec<PlayerRecord>,
    display_name: String,
) -> Option<PlayerSummary> {
    let latest = records.last()?;
    let total_wins = latest.wins_total();
    let total_plays = latest.plays_total();
    let current_rating = latest.rating();

    Some(PlayerSummary::new(
        player_id,
        display_name,
        total_wins,
        total_plays,
        current_rating,
        records,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_csv;

    #[test]
    fn test_derive_summary_from_csv() {
        let table = parse_csv(
            "time,wins,plays,wins_total,plays_total,rate\n2024-01-01,5,10,50,120,1500",
        );
        let summary =
            derive_summary("Y9P7BN4JF".into(), table.records, "Y9P7BN4JF".to_string()).unwrap();

        assert_eq!(summary.total_wins, 50);
        assert_eq!(summary.total_plays, 120);
        assert_eq!(summary.current_rating, 1500);
        assert_eq!(summary.overall_win_rate, 41.67);
    }

    #[test]
    fn test_derive_summary_uses_latest_row() {
        let table = parse_csv(
            "time,wins_total,plays_total,rate\n\
             2024-01-01,10,20,1000\n\
             2024-01-02,15,30,1100\n\
             2024-01-03,18,40,1050",
        );
        let summary = derive_summary("A".into(), table.records, "Alpha".to_string()).unwrap();

        assert_eq!(summary.display_name, "Alpha");
        assert_eq!(summary.total_wins, 18);
        assert_eq!(summary.total_plays, 40);
        assert_eq!(summary.current_rating, 1050);
        assert_eq!(summary.overall_win_rate, 45.0);
        assert_eq!(summary.records.len(), 3);
    }

    #[test]
    fn test_derive_summary_empty_series() {
        let table = parse_csv("time,wins_total,plays_total,rate");
        assert!(derive_summary("A".into(), table.records, "A".to_string()).is_none());
    }

    #[test]
    fn test_derive_summary_zero_plays() {
        let table = parse_csv("time,wins_total,plays_total,rate\n2024-01-01,0,0,0");
        let summary = derive_summary("A".into(), table.records, "A".to_string()).unwrap();
        assert_eq!(summary.overall_win_rate, 0.0);
    }

    #[test]
    fn test_derive_summary_missing_columns() {
        let table = parse_csv("time,wins\n2024-01-01,3");
        let summary = derive_summary("A".into(), table.records, "A".to_string()).unwrap();

        assert_eq!(summary.total_wins, 0);
        assert_eq!(summary.total_plays, 0);
        assert_eq!(summary.current_rating, 0);
        assert_eq!(summary.overall_win_rate, 0.0);
    }

    #[test]
    fn test_win_rate_bounds_and_precision() {
        let cases = [(1, 3), (2, 3), (999, 1000), (0, 5), (7, 7), (12, 9)];
        for (wins, plays) in cases {
            let csv = format!("wins_total,plays_total\n{},{}", wins, plays);
            let summary =
                derive_summary("A".into(), parse_csv(&csv).records, "A".to_string()).unwrap();
            let rate = summary.overall_win_rate;

            assert!((0.0..=100.0).contains(&rate), "{} out of range", rate);
            assert!(((rate * 100.0).round() - rate * 100.0).abs() < 1e-6);
        }
    }
}
