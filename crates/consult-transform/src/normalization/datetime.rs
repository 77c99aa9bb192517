//! Date parsing for the two date policies and month bucketing.

use chrono::{NaiveDate, NaiveDateTime};

/// Exact layout of consultation dates.
pub const CONSULTATION_DATE_FORMAT: &str = "%d/%m/%Y";

/// Layout of month buckets; sorts lexically in calendar order.
pub const MONTH_BUCKET_FORMAT: &str = "%Y-%m";

/// How a date column is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePolicy {
    /// Accept any of the common layouts.
    FreeForm,
    /// Accept exactly one layout.
    Exact(&'static str),
}

impl DatePolicy {
    pub fn parse(&self, value: &str) -> Option<NaiveDate> {
        match self {
            Self::FreeForm => parse_date_free(value),
            Self::Exact(format) => parse_date_exact(value, format),
        }
    }
}

/// Parse a date written in one of the common layouts.
///
/// ISO layouts are tried first. An ambiguous `a/b/yyyy` date is read
/// month-first; day-first only applies when the month-first reading is
/// impossible. A time of day, when present, is discarded.
pub fn parse_date_free(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    try_parse_date(trimmed).or_else(|| try_parse_datetime(trimmed).map(|dt| dt.date()))
}

/// Parse a date that must match `format` exactly, with nothing left over.
///
/// Field widths follow strptime: `%d`, `%m`, `%H`, `%M` and `%S` take one or
/// two digits, `%Y` exactly four, and no whitespace is skipped.
pub fn parse_date_exact(value: &str, format: &str) -> Option<NaiveDate> {
    if !has_strict_shape(value, format) {
        return None;
    }
    NaiveDate::parse_from_str(value, format).ok()
}

/// `YYYY-MM` bucket of a date.
pub fn month_bucket(date: NaiveDate) -> String {
    date.format(MONTH_BUCKET_FORMAT).to_string()
}

fn try_parse_date(value: &str) -> Option<NaiveDate> {
    let formats = [
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%m/%d/%Y",  // US: 01/15/2024
        "%d/%m/%Y",  // European: 15/01/2024
        "%d-%m-%Y",  // 15-01-2024
        "%d.%m.%Y",  // 15.01.2024
        "%d-%b-%Y",  // 15-Jan-2024
        "%d-%B-%Y",  // 15-January-2024
        "%d %b %Y",  // 15 Jan 2024
        "%d %B %Y",  // 15 January 2024
        "%b %d, %Y", // Jan 15, 2024
        "%B %d, %Y", // January 15, 2024
        "%Y%m%d",    // Compact: 20240115
    ];

    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

fn try_parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let formats = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
        "%d/%m/%Y %H:%M:%S",
        "%d/%m/%Y %H:%M",
    ];

    formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

/// Checks digit widths and literal characters of `value` against `format`.
///
/// Formats using other directives are left to chrono alone.
fn has_strict_shape(value: &str, format: &str) -> bool {
    let mut rest = value.as_bytes();
    let mut directives = format.as_bytes().iter();
    while let Some(&expected) = directives.next() {
        if expected != b'%' {
            match rest.split_first() {
                Some((&found, tail)) if found == expected => rest = tail,
                _ => return false,
            }
            continue;
        }
        let (min, max) = match directives.next() {
            Some(b'd' | b'm' | b'H' | b'M' | b'S') => (1, 2),
            Some(b'Y') => (4, 4),
            _ => return true,
        };
        let digits = rest
            .iter()
            .take(max)
            .take_while(|byte| byte.is_ascii_digit())
            .count();
        if digits < min {
            return false;
        }
        rest = &rest[digits..];
    }
    rest.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn free_form_accepts_common_layouts() {
        assert_eq!(parse_date_free("1980-01-31"), Some(ymd(1980, 1, 31)));
        assert_eq!(parse_date_free("31/01/1980"), Some(ymd(1980, 1, 31)));
        assert_eq!(parse_date_free("01/31/1980"), Some(ymd(1980, 1, 31)));
        assert_eq!(parse_date_free("31-Jan-1980"), Some(ymd(1980, 1, 31)));
        assert_eq!(parse_date_free(" 1980-01-31 "), Some(ymd(1980, 1, 31)));
    }

    #[test]
    fn free_form_reads_ambiguous_dates_month_first() {
        assert_eq!(parse_date_free("02/03/1980"), Some(ymd(1980, 2, 3)));
        assert_eq!(parse_date_free("13/03/1980"), Some(ymd(1980, 3, 13)));
        assert_eq!(parse_date_free("02/03/1980 08:15"), Some(ymd(1980, 2, 3)));
    }

    #[test]
    fn free_form_drops_time_of_day() {
        assert_eq!(parse_date_free("1980-01-31T10:30:00"), Some(ymd(1980, 1, 31)));
        assert_eq!(parse_date_free("1980-01-31 10:30"), Some(ymd(1980, 1, 31)));
    }

    #[test]
    fn free_form_rejects_garbage() {
        assert_eq!(parse_date_free(""), None);
        assert_eq!(parse_date_free("yesterday"), None);
        assert_eq!(parse_date_free("1980-13-01"), None);
    }

    #[test]
    fn exact_format_is_strict() {
        let policy = DatePolicy::Exact(CONSULTATION_DATE_FORMAT);
        assert_eq!(policy.parse("15/03/2023"), Some(ymd(2023, 3, 15)));
        assert_eq!(policy.parse("2023-03-15"), None);
        assert_eq!(policy.parse("15/03/2023 10:00"), None);
        assert_eq!(policy.parse("31/02/2023"), None);
        assert_eq!(policy.parse("not_a_date"), None);
        assert_eq!(policy.parse("15/03/23"), None);
        assert_eq!(policy.parse("15/03/02023"), None);
        assert_eq!(policy.parse(" 15/03/2023"), None);
        assert_eq!(policy.parse("15/03/2023 "), None);
        assert_eq!(policy.parse("5/3/2023"), Some(ymd(2023, 3, 5)));
    }

    #[test]
    fn month_bucket_is_iso_sortable() {
        assert_eq!(month_bucket(ymd(2023, 3, 15)), "2023-03");
        assert!(month_bucket(ymd(2023, 1, 31)) < month_bucket(ymd(2023, 2, 1)));
        assert!(month_bucket(ymd(2022, 12, 1)) < month_bucket(ymd(2023, 1, 1)));
    }
}
