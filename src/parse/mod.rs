//! Per-player CSV parsing.
//!
//! The data files are plain comma-separated text with a header row. There
//! is no quoting or escaping; a comma always separates fields. Parsing is
//! best-effort and never fails.

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::models::PlayerRecord;

/// Header plus parsed rows, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub records: Vec<PlayerRecord>,
}

impl CsvTable {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn is_blank(row: &StringRecord) -> bool {
    row.iter().all(str::is_empty)
}

/// Parse CSV text into field-keyed records.
///
/// Fields are trimmed. A short row gets empty strings for its missing
/// trailing fields; extra fields past the header are dropped. Blank rows
/// are skipped. Empty input yields no headers and no rows.
pub fn parse_csv(text: &str) -> CsvTable {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(text.trim().as_bytes());

    let mut rows = reader
        .records()
        .filter_map(Result::ok)
        .filter(|row| !is_blank(row));

    let headers: Vec<String> = match rows.next() {
        Some(row) => row.iter().map(str::to_string).collect(),
        None => return CsvTable::default(),
    };

    let records = rows
        .map(|row| {
            let mut record = PlayerRecord::new();
            for (i, header) in headers.iter().enumerate() {
                record.insert(header.as_str(), row.get(i).unwrap_or(""));
            }
            record
        })
        .collect();

    CsvTable { headers, records }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_basic() {
        let table = parse_csv(
            "wins,plays,win_rate,rate,rate_change,wins_total,plays_total,time\n\
             7,12,0.58,4210,-35,1503,2890,2024-05-13 22:04:25",
        );

        assert_eq!(table.headers.len(), 8);
        assert_eq!(table.records.len(), 1);
        let row = &table.records[0];
        assert_eq!(row.get("time"), "2024-05-13 22:04:25");
        assert_eq!(row.wins_total(), 1503);
        assert_eq!(row.rating_change(), -35);
    }

    #[test]
    fn test_header_only() {
        let table = parse_csv("time,wins,plays\n");
        assert_eq!(table.headers, vec!["time", "wins", "plays"]);
        assert!(table.records.is_empty());
        assert!(table.is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_csv(""), CsvTable::default());
        assert_eq!(parse_csv("  \n \n"), CsvTable::default());
    }

    #[test]
    fn test_short_row_fills_empty() {
        let table = parse_csv("time,wins,plays\n2024-01-01,5");
        let row = &table.records[0];
        assert_eq!(row.get("wins"), "5");
        assert_eq!(row.get("plays"), "");
        assert_eq!(row.len(), 3);
    }

    #[test]
    fn test_extra_fields_dropped() {
        let table = parse_csv("time,wins\n2024-01-01,5,99,100");
        assert_eq!(table.records[0].len(), 2);
        assert_eq!(table.records[0].get("wins"), "5");
    }

    #[test]
    fn test_fields_trimmed_and_crlf() {
        let table = parse_csv(" time , wins \r\n 2024-01-01 , 5 \r\n2024-01-02,6\r\n");
        assert_eq!(table.headers, vec!["time", "wins"]);
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[0].get("time"), "2024-01-01");
        assert_eq!(table.records[1].wins(), 6);
    }

    #[test]
    fn test_blank_rows_skipped() {
        let table = parse_csv("time,wins\n2024-01-01,1\n\n2024-01-02,2");
        assert_eq!(table.records.len(), 2);
    }

    #[test]
    fn test_rows_keep_file_order() {
        let table = parse_csv("time\n2024-01-03\n2024-01-01\n2024-01-02");
        let times: Vec<_> = table.records.iter().map(|r| r.timestamp()).collect();
        assert_eq!(times, vec!["2024-01-03", "2024-01-01", "2024-01-02"]);
    }
}
