//! Locale-formatted amounts to integer cents.
//!
//! Statements use the Brazilian convention ("1.234,56"), but OFX files and
//! some exports use a plain dot decimal ("-45.00"). Both land here.

use crate::error::{CoreError, Result};

/// Largest magnitude accepted, in cents. Keeps sign flips and `abs` on parsed
/// amounts clear of `i64` overflow.
const MAX_ABS_CENTS: i64 = i64::MAX / 2;

/// Parse a currency string into signed cents.
///
/// Everything except digits, `,`, `.` and `-` is discarded first, so
/// `"R$ -1.234,56"` yields `-123456`. When both separators are present the
/// dot is a thousands separator and the comma the decimal point; a lone comma
/// is the decimal point.
pub fn parse_currency_to_cents(text: &str) -> Result<i64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();

    let normalized = if cleaned.contains(',') && cleaned.contains('.') {
        cleaned.replace('.', "").replace(',', ".")
    } else if cleaned.contains(',') {
        cleaned.replace(',', ".")
    } else {
        cleaned
    };

    let invalid = || CoreError::InvalidAmount(text.trim().to_string());
    let value: f64 = normalized.parse().map_err(|_| invalid())?;
    let cents = (value * 100.0).round();
    if !cents.is_finite() || cents.abs() > MAX_ABS_CENTS as f64 {
        return Err(invalid());
    }

    Ok(cents as i64)
}

/// Render cents as `1.234,56` (sign kept, no currency symbol).
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let units = (abs / 100).to_string();
    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, ch) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped},{:02}", abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_decimal() {
        assert_eq!(parse_currency_to_cents("45,00"), Ok(4500));
        assert_eq!(parse_currency_to_cents("0,29"), Ok(29));
    }

    #[test]
    fn test_both_separators() {
        assert_eq!(parse_currency_to_cents("1.234,56"), Ok(123456));
        assert_eq!(parse_currency_to_cents("R$ -1.234,56"), Ok(-123456));
    }

    #[test]
    fn test_dot_decimal() {
        assert_eq!(parse_currency_to_cents("-45.00"), Ok(-4500));
        assert_eq!(parse_currency_to_cents("120"), Ok(12000));
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(parse_currency_to_cents("abc").is_err());
        assert!(parse_currency_to_cents("").is_err());
        assert!(parse_currency_to_cents("-").is_err());
    }

    #[test]
    fn test_out_of_range_is_an_error() {
        assert!(parse_currency_to_cents("-99999999999999999999,00").is_err());
        assert!(parse_currency_to_cents("99999999999999999999").is_err());
        assert!(parse_currency_to_cents("1e400").is_err());
        assert_eq!(parse_currency_to_cents("-1.000.000.000,00"), Ok(-100_000_000_000));
    }

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(4500), "45,00");
        assert_eq!(format_cents(123456789), "1.234.567,89");
        assert_eq!(format_cents(-5), "-0,05");
    }
}
