//! Calendar-day values and the week arithmetic used by the picker.
//!
//! Every site-specific date format is derived from [`NormalizedDate`]; nothing
//! here knows about URLs.

use crate::errors::WeekSearchError;
use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

const CANONICAL_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NormalizedDate(NaiveDate);

impl NormalizedDate {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn naive(self) -> NaiveDate {
        self.0
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    pub fn month(self) -> u32 {
        self.0.month()
    }

    pub fn day(self) -> u32 {
        self.0.day()
    }

    pub fn add_days(self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }

    pub fn is_sunday(self) -> bool {
        self.0.weekday().num_days_from_sunday() == 0
    }
}

impl From<NaiveDate> for NormalizedDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for NormalizedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(CANONICAL_FORMAT))
    }
}

impl FromStr for NormalizedDate {
    type Err = WeekSearchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        // chrono accepts unpadded fields; the canonical form does not.
        let shaped = trimmed.len() == 10
            && trimmed
                .char_indices()
                .all(|(i, c)| if i == 4 || i == 7 { c == '-' } else { c.is_ascii_digit() });
        if !shaped {
            return Err(WeekSearchError::invalid_date(value));
        }
        NaiveDate::parse_from_str(trimmed, CANONICAL_FORMAT)
            .map(Self)
            .map_err(|_| WeekSearchError::invalid_date(value))
    }
}

impl Serialize for NormalizedDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NormalizedDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NormalizedDate,
    pub end: NormalizedDate,
}

impl DateRange {
    pub fn new(start: NormalizedDate, end: NormalizedDate) -> Self {
        Self { start, end }
    }

    pub fn shifted(self, weeks: i64) -> Self {
        Self {
            start: self.start.add_days(weeks * 7),
            end: self.end.add_days(weeks * 7),
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub start: Option<NormalizedDate>,
    pub end: Option<NormalizedDate>,
}

impl Selection {
    pub fn complete(&self) -> Option<DateRange> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(DateRange::new(start, end)),
            _ => None,
        }
    }

    pub fn set_range(&mut self, range: DateRange) {
        self.start = Some(range.start);
        self.end = Some(range.end);
    }

    /// Moves both ends by whole weeks, or falls back to the current week when
    /// either end is unset.
    pub fn shift_weeks(&mut self, weeks: i64, today: NormalizedDate) {
        let next = match self.complete() {
            Some(range) => range.shifted(weeks),
            None => current_week(today),
        };
        self.set_range(next);
    }
}

impl From<DateRange> for Selection {
    fn from(range: DateRange) -> Self {
        Self {
            start: Some(range.start),
            end: Some(range.end),
        }
    }
}

pub fn week_start(date: NormalizedDate) -> NormalizedDate {
    let back = date.naive().weekday().num_days_from_sunday();
    date.add_days(-i64::from(back))
}

pub fn current_week(today: NormalizedDate) -> DateRange {
    let start = week_start(today);
    DateRange::new(start, start.add_days(6))
}
