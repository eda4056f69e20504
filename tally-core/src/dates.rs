//! Date spellings found in statements, and calendar-month arithmetic.

use std::sync::OnceLock;

use chrono::{Datelike, Days, NaiveDate};
use regex::Regex;

use crate::error::{CoreError, Result};

fn dmy_long_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").expect("invalid dmy regex"))
}

fn dmy_short_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{2})$").expect("invalid dmy regex"))
}

fn iso_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("invalid iso regex"))
}

fn compact_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{4})(\d{2})(\d{2})$").expect("invalid compact regex"))
}

fn month_year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,2})/(\d{4})$").expect("invalid month/year regex"))
}

fn ymd(text: &str, year: &str, month: &str, day: &str) -> Result<NaiveDate> {
    let invalid = || CoreError::InvalidDate(text.to_string());
    let y: i32 = year.parse().map_err(|_| invalid())?;
    let m: u32 = month.parse().map_err(|_| invalid())?;
    let d: u32 = day.parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(y, m, d).ok_or_else(invalid)
}

/// Parse a statement date.
///
/// Tried in order: `DD/MM/YYYY`, `DD/MM/YY` (as 20YY), `YYYY-MM-DD`,
/// `YYYYMMDD`. The first pattern that matches decides; an impossible
/// calendar date under that pattern is an error.
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    let s = text.trim();

    if let Some(c) = dmy_long_re().captures(s) {
        return ymd(s, &c[3], &c[2], &c[1]);
    }
    if let Some(c) = dmy_short_re().captures(s) {
        let year = format!("20{}", &c[3]);
        return ymd(s, &year, &c[2], &c[1]);
    }
    if let Some(c) = iso_re().captures(s) {
        return ymd(s, &c[1], &c[2], &c[3]);
    }
    if let Some(c) = compact_re().captures(s) {
        return ymd(s, &c[1], &c[2], &c[3]);
    }

    Err(CoreError::InvalidDate(s.to_string()))
}

/// Parse a month reference (`DD/MM/YYYY` or `MM/YYYY`) into the first day of
/// that month.
pub fn parse_month_year(text: &str) -> Result<NaiveDate> {
    let s = text.trim();
    if let Some(c) = month_year_re().captures(s) {
        return ymd(s, &c[2], &c[1], "1");
    }
    let date = parse_date(s)?;
    date.with_day(1)
        .ok_or_else(|| CoreError::InvalidDate(s.to_string()))
}

/// Move a date by `delta` calendar months, keeping the day of month.
///
/// Days that do not exist in the target month overflow into the next one
/// (31 Jan + 1 month is 2 or 3 Mar), there is no clamping. `None` only when
/// the result leaves chrono's representable range.
pub fn shift_months(date: NaiveDate, delta: i32) -> Option<NaiveDate> {
    let index = date.year() * 12 + date.month0() as i32 + delta;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1)?.checked_add_days(Days::new(date.day0() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_date_patterns() {
        assert_eq!(parse_date("10/09/2024"), Ok(d(2024, 9, 10)));
        assert_eq!(parse_date("10/09/24"), Ok(d(2024, 9, 10)));
        assert_eq!(parse_date("2024-09-10"), Ok(d(2024, 9, 10)));
        assert_eq!(parse_date("20240910"), Ok(d(2024, 9, 10)));
        assert_eq!(parse_date(" 1/2/2025 "), Ok(d(2025, 2, 1)));
    }

    #[test]
    fn test_parse_date_rejects_unknown() {
        assert!(parse_date("Sep 10 2024").is_err());
        assert!(parse_date("31/02/2024").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_parse_month_year() {
        assert_eq!(parse_month_year("03/2024"), Ok(d(2024, 3, 1)));
        assert_eq!(parse_month_year("15/03/2024"), Ok(d(2024, 3, 1)));
        assert!(parse_month_year("13/2024").is_err());
    }

    #[test]
    fn test_shift_months_crosses_years() {
        assert_eq!(shift_months(d(2024, 1, 15), -2), Some(d(2023, 11, 15)));
        assert_eq!(shift_months(d(2023, 11, 15), 2), Some(d(2024, 1, 15)));
        assert_eq!(shift_months(d(2024, 5, 10), 0), Some(d(2024, 5, 10)));
    }

    #[test]
    fn test_shift_months_overflows_short_months() {
        assert_eq!(shift_months(d(2024, 1, 31), 1), Some(d(2024, 3, 2)));
        assert_eq!(shift_months(d(2023, 1, 31), 1), Some(d(2023, 3, 3)));
    }
}
