//! Statistics calculation engine.
//!
//! Computes derived metrics from player time series:
//! - Summary statistics from the latest row (`summary`)
//! - Daily deltas from cumulative snapshots (`history`)
//! - Chart series over recent rows (`trend`)
//!
//! Numeric input is untrusted text. Every parser here returns zero instead
//! of failing.

pub mod history;
pub mod summary;
pub mod trend;

pub use history::{compute_daily_deltas, display_date, snapshots_from_records, summarize_history};
pub use summary::derive_summary;
pub use trend::{build_trend, TrendKind, TrendSeries};

/// Parse the leading integer of `s`, or 0.
///
/// Accepts surrounding whitespace, an optional sign and trailing junk
/// (`"1500.0"` parses as 1500). Overflow yields 0.
pub fn parse_int_or_zero(s: &str) -> i64 {
    let s = s.trim();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return 0;
    }

    match digits[..end].parse::<i64>() {
        Ok(n) if negative => -n,
        Ok(n) => n,
        Err(_) => 0,
    }
}

/// Parse a non-negative counter, or 0. Negative input clamps to 0.
pub fn parse_count_or_zero(s: &str) -> u64 {
    parse_int_or_zero(s).max(0) as u64
}

/// Parse the leading decimal number of `s`, or 0.0. Non-finite values yield 0.0.
pub fn parse_float_or_zero(s: &str) -> f64 {
    let s = s.trim();
    if let Ok(v) = s.parse::<f64>() {
        return if v.is_finite() { v } else { 0.0 };
    }

    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in s.char_indices() {
        match c {
            '+' | '-' if i == 0 => {}
            '0'..='9' => {}
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }

    s[..end]
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Round to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Win percentage (0 to 100, 2 decimals). Zero plays gives 0.
///
/// Wins above plays are clamped so the result never exceeds 100.
pub fn win_rate_percent(wins: u64, plays: u64) -> f64 {
    if plays == 0 {
        0.0
    } else {
        round2(wins.min(plays) as f64 / plays as f64 * 100.0)
    }
}
