//! Date helpers for the `yyyy-MM-dd` format used by the backend.

use crate::error::Result;
use chrono::NaiveDate;

/// Backend date format pattern, as documented for API consumers
pub const DATE_YMD_FORMAT: &str = "yyyy-MM-dd";

const DATE_YMD_CHRONO: &str = "%Y-%m-%d";

/// Parse a `yyyy-MM-dd` date
pub fn date_from_ymd(s: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(s, DATE_YMD_CHRONO)?)
}

/// Format a date as `yyyy-MM-dd`
pub fn date_to_ymd(date: &NaiveDate) -> String {
    date.format(DATE_YMD_CHRONO).to_string()
}

/// Cheap pre-check before attempting to parse a value as a date
pub fn is_possibly_date(s: &str) -> bool {
    s.chars().next().map(|c| c.is_ascii_digit()).unwrap_or(false)
        && s.chars().count() == DATE_YMD_FORMAT.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_format() {
        let date = date_from_ymd("1985-03-07").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(1985, 3, 7).unwrap());
        assert_eq!(date_to_ymd(&date), "1985-03-07");
    }

    #[test]
    fn test_invalid_date() {
        assert!(date_from_ymd("1985-13-07").is_err());
        assert!(date_from_ymd("07.03.1985").is_err());
    }

    #[test]
    fn test_is_possibly_date() {
        assert!(is_possibly_date("2020-01-01"));
        assert!(is_possibly_date("1234567890"));
        assert!(!is_possibly_date("a020-01-01"));
        assert!(!is_possibly_date("2020-1-1"));
        assert!(!is_possibly_date(""));
    }
}
