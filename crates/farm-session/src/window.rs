//! Lookback Window
//!
//! Date range the transactions view starts from: one calendar month back,
//! plus one day, up to now.

use chrono::{DateTime, Datelike, Duration, Months, Utc};
use serde::Serialize;

/// Transactions date range
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LookbackWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl LookbackWindow {
    /// Window ending at `now`
    ///
    /// The day of month is kept when stepping back, and a day the previous
    /// month does not have rolls over into the current one: March 31st
    /// becomes "February 31st", i.e. March 2nd in a leap year and March 3rd
    /// otherwise, before the extra day is added.
    pub fn ending_at(now: DateTime<Utc>) -> Self {
        let month_back = now
            .with_day(1)
            .and_then(|first| first.checked_sub_months(Months::new(1)))
            .map(|first| first + Duration::days(i64::from(now.day()) - 1))
            .unwrap_or(now - Duration::days(30));

        Self {
            start: month_back + Duration::days(1),
            end: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_mid_month() {
        let window = LookbackWindow::ending_at(at(2024, 5, 15));
        assert_eq!(window.start, at(2024, 4, 16));
        assert_eq!(window.end, at(2024, 5, 15));
    }

    #[test]
    fn test_month_end_rolls_over_short_february() {
        let window = LookbackWindow::ending_at(at(2024, 3, 31));
        assert_eq!(window.start, at(2024, 3, 3));

        let window = LookbackWindow::ending_at(at(2023, 3, 31));
        assert_eq!(window.start, at(2023, 3, 4));
    }

    #[test]
    fn test_month_end_rolls_over_thirty_day_month() {
        let window = LookbackWindow::ending_at(at(2024, 5, 31));
        assert_eq!(window.start, at(2024, 5, 2));
    }

    #[test]
    fn test_year_boundary() {
        let window = LookbackWindow::ending_at(at(2024, 1, 10));
        assert_eq!(window.start, at(2023, 12, 11));
    }
}
