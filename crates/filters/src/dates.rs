//! Lenient date parsing for time-series columns

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use housefilter_formats::Cell;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
];

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Parse a date string.
///
/// Accepts ISO dates and datetimes (offsets are converted to UTC), slash
/// dates, month names, `YYYYMMDD`, `YYYY-MM` and a bare `YYYY`; partial
/// dates resolve to the first day of the period.
pub fn parse_date_str(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
        let year: i32 = s.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1).map(start_of_day);
    }

    if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
        let year: i32 = s[0..4].parse().ok()?;
        let month: u32 = s[4..6].parse().ok()?;
        let day: u32 = s[6..8].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day).map(start_of_day);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(start_of_day(date));
        }
    }

    // "2020-03" and "2020/03"
    for sep in ['-', '/'] {
        if let Some((year, month)) = s.split_once(sep) {
            if year.len() == 4 && (1..=2).contains(&month.len()) {
                if let (Ok(y), Ok(m)) = (year.parse::<i32>(), month.parse::<u32>()) {
                    if let Some(date) = NaiveDate::from_ymd_opt(y, m, 1) {
                        return Some(start_of_day(date));
                    }
                }
            }
        }
    }

    None
}

/// Parse a cell as a date. Integral numbers are read as `YYYY` or `YYYYMMDD`.
pub fn parse_date_cell(cell: &Cell) -> Option<NaiveDateTime> {
    match cell {
        Cell::DateTime(dt) => Some(*dt),
        Cell::Text(s) => parse_date_str(s),
        Cell::Int(i) => parse_date_str(&i.to_string()),
        Cell::Float(f) if f.fract() == 0.0 && f.is_finite() => parse_date_str(&format!("{}", *f as i64)),
        _ => None,
    }
}
