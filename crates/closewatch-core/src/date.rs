//! Date normalization for export columns
//!
//! Jira and Maximo exports carry planned dates in whatever shape the
//! exporting locale produced. Everything is coerced into a naive
//! `NaiveDateTime`; anything that cannot be read becomes `None`.
//!
//! # Accepted inputs
//!
//! | Input                     | Reading                        |
//! |---------------------------|--------------------------------|
//! | `03/04/2024`              | 3 April 2024 (day first)       |
//! | `03-04-2024 14:30`        | 3 April 2024 14:30             |
//! | `03.04.24 2:30 PM`        | 3 April 2024 14:30             |
//! | `2024-04-03T14:30:00`     | 3 April 2024 14:30 (year first)|
//! | `2024-04-03T14:30:00-03:00` | offset dropped, 14:30 kept   |
//!
//! When the day-first reading is impossible (`12/25/2024`) the month-first
//! reading is used instead.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime};

const TIME_FORMATS: &[&str] = &[
    "%H:%M:%S%.f",
    "%H:%M:%S",
    "%H:%M",
    "%I:%M:%S %p",
    "%I:%M %p",
    "%I:%M%p",
];

/// Parse a date string into a naive date-time, day-first when ambiguous.
///
/// Returns `None` for empty or unparseable input.
pub fn normalize_date(input: &str) -> Option<NaiveDateTime> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_local());
    }

    let (date_part, time_part) = match trimmed.split_once([' ', 'T']) {
        Some((date, time)) => (date, Some(time.trim())),
        None => (trimmed, None),
    };

    let date = parse_date_part(date_part)?;
    let time = match time_part {
        None | Some("") => NaiveTime::MIN,
        Some(time) => parse_time_part(time)?,
    };

    Some(date.and_time(time))
}

/// Last serial Excel can display: 9999-12-31 23:59:59
const MAX_EXCEL_SERIAL: f64 = 2_958_465.999_99;

/// Convert a spreadsheet serial date (days since 1899-12-30) to a date-time.
///
/// Serials outside Excel's date range yield `None`.
pub fn from_excel_serial(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(0.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }

    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_time(NaiveTime::MIN);
    let days = serial.trunc() as i64;
    let seconds = (serial.fract() * 86_400.0).round() as i64;

    epoch
        .checked_add_signed(Duration::try_days(days)?)?
        .checked_add_signed(Duration::try_seconds(seconds)?)
}

fn parse_date_part(s: &str) -> Option<NaiveDate> {
    let fields: Vec<&str> = s.split(['/', '-', '.']).collect();
    if fields.len() != 3 || fields.iter().any(|f| f.is_empty() || !f.bytes().all(|b| b.is_ascii_digit())) {
        return None;
    }

    if fields[0].len() == 4 {
        let year: i32 = fields[0].parse().ok()?;
        let month: u32 = fields[1].parse().ok()?;
        let day: u32 = fields[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    let first: u32 = fields[0].parse().ok()?;
    let second: u32 = fields[1].parse().ok()?;
    let year = parse_year(fields[2])?;

    NaiveDate::from_ymd_opt(year, second, first)
        .or_else(|| NaiveDate::from_ymd_opt(year, first, second))
}

fn parse_year(s: &str) -> Option<i32> {
    let value: i32 = s.parse().ok()?;
    match s.len() {
        4 => Some(value),
        // Same pivot as chrono's %y
        2 if value < 70 => Some(2000 + value),
        2 => Some(1900 + value),
        _ => None,
    }
}

fn parse_time_part(s: &str) -> Option<NaiveTime> {
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn ambiguous_dates_are_day_first() {
        assert_eq!(normalize_date("03/04/2024"), Some(dt(2024, 4, 3, 0, 0, 0)));
        assert_eq!(normalize_date("03-04-2024"), Some(dt(2024, 4, 3, 0, 0, 0)));
        assert_eq!(normalize_date("03.04.2024"), Some(dt(2024, 4, 3, 0, 0, 0)));
    }

    #[test]
    fn day_first_with_time() {
        assert_eq!(
            normalize_date("31/01/2025 23:15"),
            Some(dt(2025, 1, 31, 23, 15, 0))
        );
        assert_eq!(
            normalize_date("31/01/2025 23:15:42"),
            Some(dt(2025, 1, 31, 23, 15, 42))
        );
        assert_eq!(
            normalize_date("01/02/2025 2:30 PM"),
            Some(dt(2025, 2, 1, 14, 30, 0))
        );
    }

    #[test]
    fn iso_inputs_are_year_first() {
        assert_eq!(normalize_date("2024-04-03"), Some(dt(2024, 4, 3, 0, 0, 0)));
        assert_eq!(
            normalize_date("2024-04-03T10:20:30"),
            Some(dt(2024, 4, 3, 10, 20, 30))
        );
        assert_eq!(
            normalize_date("2024-04-03 10:20:30.250"),
            Some(dt(2024, 4, 3, 10, 20, 30).checked_add_signed(Duration::milliseconds(250)).unwrap())
        );
        assert_eq!(normalize_date("2024/04/03"), Some(dt(2024, 4, 3, 0, 0, 0)));
    }

    #[test]
    fn offsets_are_dropped_keeping_wall_clock() {
        assert_eq!(
            normalize_date("2024-04-30T22:00:00-03:00"),
            Some(dt(2024, 4, 30, 22, 0, 0))
        );
        assert_eq!(
            normalize_date("2024-04-30T22:00:00Z"),
            Some(dt(2024, 4, 30, 22, 0, 0))
        );
    }

    #[test]
    fn month_first_fallback_when_day_first_impossible() {
        assert_eq!(normalize_date("12/25/2024"), Some(dt(2024, 12, 25, 0, 0, 0)));
    }

    #[test]
    fn two_digit_years() {
        assert_eq!(normalize_date("15/08/24"), Some(dt(2024, 8, 15, 0, 0, 0)));
        assert_eq!(normalize_date("15/08/99"), Some(dt(1999, 8, 15, 0, 0, 0)));
    }

    #[test]
    fn invalid_input_is_absent() {
        assert_eq!(normalize_date(""), None);
        assert_eq!(normalize_date("   "), None);
        assert_eq!(normalize_date("NaT"), None);
        assert_eq!(normalize_date("tomorrow"), None);
        assert_eq!(normalize_date("32/01/2024"), None);
        assert_eq!(normalize_date("29/02/2023"), None);
        assert_eq!(normalize_date("01/02/2024 25:00"), None);
        assert_eq!(normalize_date("01/02"), None);
    }

    #[test]
    fn leap_day_parses() {
        assert_eq!(normalize_date("29/02/2024"), Some(dt(2024, 2, 29, 0, 0, 0)));
    }

    #[test]
    fn excel_serial_dates() {
        // 45412 is 2024-04-30 in the 1900 date system
        assert_eq!(from_excel_serial(45412.0), Some(dt(2024, 4, 30, 0, 0, 0)));
        assert_eq!(from_excel_serial(45412.75), Some(dt(2024, 4, 30, 18, 0, 0)));
        assert_eq!(from_excel_serial(-1.0), None);
        assert_eq!(from_excel_serial(f64::NAN), None);
    }

    #[test]
    fn excel_serial_out_of_range_is_absent() {
        assert_eq!(from_excel_serial(1.0e12), None);
        assert_eq!(from_excel_serial(f64::MAX), None);
        assert_eq!(from_excel_serial(f64::INFINITY), None);
        assert_eq!(from_excel_serial(2_958_466.0), None);
        assert_eq!(
            from_excel_serial(2_958_465.0),
            Some(dt(9999, 12, 31, 0, 0, 0))
        );
    }
}
