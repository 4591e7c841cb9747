use std::{fmt, str::FromStr};

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::errors::{FinanceError, Result};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A calendar month, addressed with a zero-based month (`0` = January).
///
/// Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MonthPeriod {
    year: i32,
    month0: u32,
}

impl MonthPeriod {
    pub fn new(year: i32, month0: u32) -> Result<Self> {
        if month0 > 11 {
            return Err(FinanceError::validation(format!(
                "month must be within 0-11, got {month0}"
            )));
        }
        Ok(Self { year, month0 })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month0: date.month0(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Zero-based month.
    pub fn month0(&self) -> u32 {
        self.month0
    }

    /// One-based month, as chrono expects it.
    pub fn month(&self) -> u32 {
        self.month0 + 1
    }

    /// Shifts the period by `months`, wrapping year boundaries in both directions.
    pub fn offset(&self, months: i32) -> Self {
        let index = self.year as i64 * 12 + self.month0 as i64 + months as i64;
        Self {
            year: index.div_euclid(12) as i32,
            month0: index.rem_euclid(12) as u32,
        }
    }

    pub fn next(&self) -> Self {
        self.offset(1)
    }

    pub fn previous(&self) -> Self {
        self.offset(-1)
    }

    pub fn first_day(&self) -> NaiveDate {
        calendar_date(self.year, self.month(), 1)
    }

    pub fn days_in_month(&self) -> u32 {
        let next = self.next();
        let first_next = calendar_date(next.year, next.month(), 1);
        (first_next - Duration::days(1)).day()
    }

    /// Places `day` inside this month, clamping to the last day when the month is shorter.
    pub fn due_date(&self, day: u8) -> NaiveDate {
        let day = (day.max(1) as u32).min(self.days_in_month());
        calendar_date(self.year, self.month(), day)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::from_date(date) == *self
    }

    /// Human-readable label such as "March 2024".
    pub fn label(&self) -> String {
        format!("{} {}", MONTH_NAMES[self.month0 as usize], self.year)
    }
}

impl fmt::Display for MonthPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month())
    }
}

impl FromStr for MonthPeriod {
    type Err = FinanceError;

    /// Parses `YYYY-MM` with a one-based month.
    fn from_str(value: &str) -> Result<Self> {
        let invalid = || FinanceError::validation(format!("expected YYYY-MM, got `{value}`"));
        let (year, month) = value.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }
        Self::new(year, month - 1)
    }
}

// Periods only come from valid dates or validated months, so the fallback is
// reached only for years outside chrono's supported range.
fn calendar_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(if year < 0 {
        NaiveDate::MIN
    } else {
        NaiveDate::MAX
    })
}
