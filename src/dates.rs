// src/dates.rs

use crate::error::{ChurnError, Result};
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

/// A `YYYY[-MM[-DD]]` date covering a whole year, month or day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBound {
    first: NaiveDate,
    last: NaiveDate,
}

impl DateBound {
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || ChurnError::InvalidDate(input.to_string());
        let text = input.trim_end_matches('-');

        let (first, last) = match text.len() {
            4 => {
                let year = text.parse().map_err(|_| invalid())?;
                let first = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?;
                let last = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(invalid)?;
                (first, last)
            }
            7 => {
                let first = NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d")
                    .map_err(|_| invalid())?;
                (first, last_day_of_month(first).ok_or_else(invalid)?)
            }
            10 => {
                let day = NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| invalid())?;
                (day, day)
            }
            _ => return Err(invalid()),
        };

        Ok(DateBound { first, last })
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.last
    }

    /// Start of the first day, local time, as a unix timestamp.
    pub fn lower_seconds(&self) -> i64 {
        local_seconds(self.first.and_time(NaiveTime::MIN))
    }

    /// Last second of the last day, local time, as a unix timestamp.
    pub fn upper_seconds(&self) -> i64 {
        let end = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
        local_seconds(self.last.and_time(end))
    }
}

/// Parses an optional bound; an empty argument leaves that side open.
pub fn parse_bound(input: &str) -> Result<Option<DateBound>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    DateBound::parse(input.trim()).map(Some)
}

fn last_day_of_month(first: NaiveDate) -> Option<NaiveDate> {
    if first.month() == 12 {
        return NaiveDate::from_ymd_opt(first.year(), 12, 31);
    }
    NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)?.pred_opt()
}

fn local_seconds(datetime: NaiveDateTime) -> i64 {
    // DST gaps have no local instant; fall back to reading the time as UTC.
    Local
        .from_local_datetime(&datetime)
        .earliest()
        .map_or_else(|| datetime.and_utc().timestamp(), |dt| dt.timestamp())
}
