//! Generic comma-delimited statement export.
//!
//! Expected shape:
//!   date,description,amount
//!   2024-01-01,"Coffee, Inc",-5.50
//!
//! Every physical line is one record and the first line is the header row.
//! A double quote only toggles whether commas split fields: it is never kept,
//! `""` is not an escaped quote, and a quote left open runs to the end of its
//! line only. Rows are not required to match the header width; `map_records`
//! drops rows that are too short for the chosen columns.

use finwise_core::Result;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::types::{ColumnMapping, CsvTable, MappedRecord};

static CURRENCY_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[$,]").expect("static regex"));

/// Longest numeric prefix, the way statement exports write amounts (`12.50 USD`)
static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)").expect("static regex")
});

/// Split raw CSV text into a header row and records.
pub fn parse_csv(text: &str) -> CsvTable {
    let text = text.trim();
    if text.is_empty() {
        return CsvTable::default();
    }

    let mut lines = text.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l));
    let headers = lines
        .next()
        .map(|h| h.split(',').map(|f| f.trim().replace('"', "")).collect())
        .unwrap_or_default();
    let rows = lines.map(split_record).collect();

    CsvTable { headers, rows }
}

fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

/// Parse an amount cell, ignoring `$` and thousands separators and anything
/// after the leading number. Returns `None` when there is no finite number.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned = CURRENCY_PUNCT.replace_all(raw, "");
    LEADING_NUMBER
        .captures(&cleaned)
        .and_then(|c| c[1].parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Pull the mapped columns out of each row.
///
/// A row is dropped when it is shorter than the furthest mapped column, when
/// its amount does not parse, or when the amount is zero. Drops are not errors.
pub fn map_records(table: &CsvTable, mapping: &ColumnMapping) -> Result<Vec<MappedRecord>> {
    let cols = table.resolve(mapping)?;
    let required = cols.required_len();

    let mut out = Vec::with_capacity(table.rows.len());
    for (i, row) in table.rows.iter().enumerate() {
        if row.len() < required {
            debug!(row = i, fields = row.len(), required, "dropping short row");
            continue;
        }
        let signed_amount = match parse_amount(&row[cols.amount]) {
            Some(v) if v.abs() > 0.0 => v,
            _ => {
                debug!(row = i, amount = %row[cols.amount], "dropping row with unusable amount");
                continue;
            }
        };
        out.push(MappedRecord {
            date: row[cols.date].clone(),
            description: row[cols.description].clone(),
            signed_amount,
        });
    }

    debug!(kept = out.len(), total = table.rows.len(), "mapped CSV rows");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use finwise_core::Error;

    #[test]
    fn test_quoted_comma_is_literal() {
        let text = "date,description,amount\n2024-01-01,\"Coffee, Inc\",-5.50\n";
        let table = parse_csv(text);
        assert_eq!(table.headers, vec!["date", "description", "amount"]);
        assert_eq!(table.rows, vec![vec!["2024-01-01", "Coffee, Inc", "-5.50"]]);
    }

    #[test]
    fn test_unbalanced_quote_stays_on_its_line() {
        let text = "date,description,amount\n\
2024-01-01,\"Joe's Diner,-5.50\n\
2024-01-02,Coffee,-3.00\n\
2024-01-03,Lunch,-9.00\n";
        let table = parse_csv(text);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0], vec!["2024-01-01", "Joe's Diner,-5.50"]);
        assert_eq!(table.rows[1], vec!["2024-01-02", "Coffee", "-3.00"]);
        assert_eq!(table.rows[2], vec!["2024-01-03", "Lunch", "-9.00"]);
    }

    #[test]
    fn test_doubled_quote_is_not_an_escape() {
        let table = parse_csv("description,amount\n\"x\"\"y\",1\n\"a, \"\"b\"\"\",2\n");
        assert_eq!(table.rows[0], vec!["xy", "1"]);
        assert_eq!(table.rows[1], vec!["a, b", "2"]);
    }

    #[test]
    fn test_headers_quotes_and_whitespace_stripped() {
        let text = "\"Date\",\"Description\",Amount \r\n 01/02/2024 , Lunch , 12.00\r\n";
        let table = parse_csv(text);
        assert_eq!(table.headers, vec!["Date", "Description", "Amount"]);
        assert_eq!(table.rows[0], vec!["01/02/2024", "Lunch", "12.00"]);
    }

    #[test]
    fn test_empty_input() {
        let table = parse_csv("");
        assert!(table.headers.is_empty());
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_ragged_rows_are_kept() {
        let table = parse_csv("a,b,c\n1,2\n1,2,3,4\n");
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].len(), 2);
        assert_eq!(table.rows[1].len(), 4);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("$1,234.50"), Some(1234.5));
        assert_eq!(parse_amount("-5.50"), Some(-5.5));
        assert_eq!(parse_amount(" $-20 "), Some(-20.0));
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("NaN"), None);
    }

    #[test]
    fn test_parse_amount_reads_leading_number() {
        assert_eq!(parse_amount("12.50 USD"), Some(12.5));
        assert_eq!(parse_amount("-5.50 CR"), Some(-5.5));
        assert_eq!(parse_amount("$1,200.00 (pending)"), Some(1200.0));
        assert_eq!(parse_amount(".75"), Some(0.75));
        assert_eq!(parse_amount("1e3x"), Some(1000.0));
        assert_eq!(parse_amount("1e"), Some(1.0));
        assert_eq!(parse_amount("USD 12.50"), None);
        assert_eq!(parse_amount("-"), None);
    }

    #[test]
    fn test_map_records_filters_bad_rows() {
        let text = "\
Date,Memo,Amount
2024-01-01,Salary,\"$3,000.00\"
2024-01-02,Short row
2024-01-03,Bad amount,n/a
2024-01-04,Zero,0.00
2024-01-05,Coffee,-4.25
";
        let table = parse_csv(text);
        let mapping = ColumnMapping::new("Date", "Memo", "Amount");
        let records = map_records(&table, &mapping).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].signed_amount, 3000.0);
        assert_eq!(records[1].description, "Coffee");
        assert_eq!(records[1].signed_amount, -4.25);
        assert_eq!(records[1].amount(), 4.25);
    }

    #[test]
    fn test_unknown_column_is_an_error() {
        let table = parse_csv("date,description,amount\n");
        let err = map_records(&table, &ColumnMapping::new("date", "memo", "amount")).unwrap_err();
        assert!(matches!(err, Error::MissingColumn(name) if name == "memo"));
    }
}
