//! Calendar helpers: month windows and loose date parsing.

use chrono::{Datelike, Months, NaiveDate};

/// Formats accepted for dates typed by users or exported by banks
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%Y/%m/%d",
    "%b %d, %Y",
    "%d %b %Y",
];

/// First day of the month containing `date`
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// First day of the month `months` before the month of `as_of`.
///
/// Any day in month M yields the 1st of M-3 for `months = 3`.
pub fn window_start(as_of: NaiveDate, months: u32) -> NaiveDate {
    let start = month_start(as_of);
    start
        .checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

/// Last day of the month containing `date`
pub fn month_end(date: NaiveDate) -> NaiveDate {
    month_start(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

/// The first day of each of the last `count` months ending with the month of
/// `as_of`, oldest first.
pub fn trailing_months(as_of: NaiveDate, count: u32) -> Vec<NaiveDate> {
    (0..count)
        .rev()
        .filter_map(|back| month_start(as_of).checked_sub_months(Months::new(back)))
        .collect()
}

/// Parse a date in any of the common formats. ISO timestamps are truncated to their date.
pub fn parse_loose_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    let s = match s.find('T') {
        Some(pos) if pos == 10 => &s[..pos],
        _ => s,
    };
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// True when `date` falls in the same calendar month as `month`
pub fn same_month(date: NaiveDate, month: NaiveDate) -> bool {
    date.year() == month.year() && date.month() == month.month()
}
