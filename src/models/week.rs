use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// ISO-8601 week number, 1..=53. Used as the cache partition key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct IsoWeek(u8);

impl IsoWeek {
    pub const FIRST: u32 = 1;
    pub const LAST: u32 = 53;

    pub fn new(week: u32) -> Result<Self, AppError> {
        if (Self::FIRST..=Self::LAST).contains(&week) {
            Ok(Self(week as u8))
        } else {
            Err(AppError::InvalidWeek(week))
        }
    }

    /// Week containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self(date.iso_week().week() as u8)
    }

    /// The week of `from` followed by the next `count - 1` weeks, crossing
    /// year boundaries the way the calendar does (52 or 53 back to 1).
    pub fn upcoming(from: NaiveDate, count: usize) -> Vec<Self> {
        (0..count as i64)
            .map(|offset| Self::of(from + Duration::weeks(offset)))
            .collect()
    }

    pub fn number(self) -> u32 {
        self.0 as u32
    }
}

impl TryFrom<u32> for IsoWeek {
    type Error = AppError;

    fn try_from(week: u32) -> Result<Self, Self::Error> {
        IsoWeek::new(week)
    }
}

impl From<IsoWeek> for u32 {
    fn from(week: IsoWeek) -> Self {
        week.number()
    }
}

impl fmt::Display for IsoWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_weeks() {
        assert!(IsoWeek::new(0).is_err());
        assert!(IsoWeek::new(54).is_err());
        assert_eq!(IsoWeek::new(53).unwrap().number(), 53);
    }

    #[test]
    fn week_of_date_follows_iso_numbering() {
        // 2024-01-01 is a Monday in ISO week 1.
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(IsoWeek::of(date).number(), 1);
        // 2021-01-03 still belongs to week 53 of 2020.
        let date = NaiveDate::from_ymd_opt(2021, 1, 3).unwrap();
        assert_eq!(IsoWeek::of(date).number(), 53);
    }

    #[test]
    fn upcoming_wraps_at_year_end() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 18).unwrap();
        let weeks: Vec<u32> = IsoWeek::upcoming(date, 3)
            .into_iter()
            .map(IsoWeek::number)
            .collect();
        assert_eq!(weeks, vec![51, 52, 1]);
    }

    #[test]
    fn deserializes_with_range_check() {
        assert!(serde_json::from_str::<IsoWeek>("12").is_ok());
        assert!(serde_json::from_str::<IsoWeek>("60").is_err());
    }
}
