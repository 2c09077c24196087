use chrono::{Local, NaiveDate};
use thiserror::Error;

use crate::utils::time::parse_display_date;

/// Message returned for a range that passes every check.
pub const VALID_DATES: &str = "Fechas válidas";

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DateRangeError {
    #[error("Ambas fechas son requeridas")]
    Missing,

    #[error("Formato de fecha inválido. Use MM/DD/YYYY (ejemplo: 08/10/2025)")]
    InvalidFormat,

    #[error("La fecha de inicio debe ser anterior a la fecha de fin")]
    NotOrdered,

    #[error("La fecha de fin no puede estar en el futuro")]
    EndInFuture,
}

/// A validated, strictly ordered backtest period.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// Check `start`/`end` (`MM/DD/YYYY`) against `today`.
pub fn check_date_range(start: &str, end: &str, today: NaiveDate) -> Result<DateRange, DateRangeError> {
    if start.trim().is_empty() || end.trim().is_empty() {
        return Err(DateRangeError::Missing);
    }
    let (start, end) = match (parse_display_date(start), parse_display_date(end)) {
        (Some(start), Some(end)) => (start, end),
        _ => return Err(DateRangeError::InvalidFormat),
    };
    if start >= end {
        return Err(DateRangeError::NotOrdered);
    }
    if end > today {
        return Err(DateRangeError::EndInFuture);
    }
    Ok(DateRange { start, end })
}

/// `(valid, message)` for a date range, judged against `today`.
pub fn validate_date_range_on(start: &str, end: &str, today: NaiveDate) -> (bool, String) {
    match check_date_range(start, end, today) {
        Ok(_) => (true, VALID_DATES.to_string()),
        Err(err) => (false, err.to_string()),
    }
}

/// `(valid, message)` for a date range, judged against the local date.
pub fn validate_date_range(start: &str, end: &str) -> (bool, String) {
    validate_date_range_on(start, end, Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn start_after_end_is_rejected() {
        let (ok, msg) = validate_date_range_on("08/10/2025", "08/09/2025", day(2026, 1, 1));
        assert!(!ok);
        assert_eq!(msg, DateRangeError::NotOrdered.to_string());
    }

    #[test]
    fn equal_dates_are_rejected() {
        assert_eq!(
            check_date_range("08/10/2025", "08/10/2025", day(2026, 1, 1)),
            Err(DateRangeError::NotOrdered)
        );
    }

    #[test]
    fn out_of_range_month_and_day_are_format_errors() {
        let (ok, msg) = validate_date_range_on("13/45/2025", "08/09/2025", day(2026, 1, 1));
        assert!(!ok);
        assert!(msg.starts_with("Formato de fecha inválido"));
    }

    #[test]
    fn other_formats_are_rejected() {
        let today = day(2026, 1, 1);
        for (start, end) in [
            ("2024-01-01", "2025-01-01"),
            ("1/1/2024", "01/01/2025"),
            ("01/01/24", "01/01/2025"),
            ("01-01-2024", "01/01/2025"),
        ] {
            assert_eq!(
                check_date_range(start, end, today),
                Err(DateRangeError::InvalidFormat),
                "{start} .. {end}"
            );
        }
    }

    #[test]
    fn empty_fields_are_reported_first() {
        let today = day(2026, 1, 1);
        assert_eq!(check_date_range("", "01/01/2025", today), Err(DateRangeError::Missing));
        assert_eq!(check_date_range("01/01/2024", "  ", today), Err(DateRangeError::Missing));
        assert_eq!(check_date_range("", "garbage", today), Err(DateRangeError::Missing));
    }

    #[test]
    fn valid_past_range() {
        let (ok, msg) = validate_date_range_on("01/01/2024", "01/01/2025", day(2025, 6, 1));
        assert!(ok);
        assert_eq!(msg, "Fechas válidas");
        let range = check_date_range("01/01/2024", "01/01/2025", day(2025, 6, 1)).unwrap();
        assert_eq!(range.days(), 366);
    }

    #[test]
    fn end_today_is_allowed_but_tomorrow_is_not() {
        let today = day(2025, 1, 1);
        assert!(check_date_range("01/01/2024", "01/01/2025", today).is_ok());
        assert_eq!(
            check_date_range("01/01/2024", "01/02/2025", today),
            Err(DateRangeError::EndInFuture)
        );
    }

    #[test]
    fn wall_clock_variant_accepts_old_range() {
        let (ok, msg) = validate_date_range("01/01/2024", "01/01/2025");
        assert!(ok, "{msg}");
    }
}
