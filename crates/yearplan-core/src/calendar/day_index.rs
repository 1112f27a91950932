//! Day-of-year offsets.
//!
//! Offset 0 is January 1st of the plan year. The number of valid offsets is
//! the sum of the year's actual month lengths, so leap years have 366.

use chrono::{Datelike, NaiveDate, Weekday};
use tracing::debug;

use crate::error::PlanError;

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

#[must_use]
pub const fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Days in `month` (1-based).
#[must_use]
pub const fn days_in_month(year: i32, month: u32) -> u16 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

#[must_use]
pub fn days_in_year(year: i32) -> u16 {
    (1..=12).map(|m| days_in_month(year, m)).sum()
}

/// Offset of the first day of `month` (1-based).
#[must_use]
pub fn month_start_offset(year: i32, month: u32) -> u16 {
    (1..month).map(|m| days_in_month(year, m)).sum()
}

#[must_use]
pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES[(month.clamp(1, 12) - 1) as usize]
}

/// Empty cells before day 1 of `month` in a Monday-first week grid.
#[must_use]
pub fn monday_padding(year: i32, month: u32) -> u8 {
    NaiveDate::from_ymd_opt(year, month, 1).map_or(0, |d| {
        u8::try_from(d.weekday().num_days_from_monday()).unwrap_or(0)
    })
}

#[must_use]
pub fn weekday_of(year: i32, offset: u16) -> Option<Weekday> {
    date_for_offset(year, offset).ok().map(|d| d.weekday())
}

/// Calendar date for `offset` in `year`.
pub fn date_for_offset(year: i32, offset: u16) -> Result<NaiveDate, PlanError> {
    let days = days_in_year(year);
    let out_of_range = || PlanError::OffsetOutOfRange {
        year,
        offset: i64::from(offset),
        days,
    };
    if offset >= days {
        return Err(out_of_range());
    }
    NaiveDate::from_yo_opt(year, u32::from(offset) + 1).ok_or_else(out_of_range)
}

/// Offset of `date`, which must fall inside `year`.
pub fn offset_for_date(year: i32, date: NaiveDate) -> Result<u16, PlanError> {
    if date.year() != year {
        return Err(PlanError::DateOutsideYear { year, date });
    }
    u16::try_from(date.ordinal0()).map_err(|_| PlanError::DateOutsideYear { year, date })
}

/// Signed distance in days from January 1st of `year` to `date`.
///
/// Negative before the year starts and `>= days_in_year` after it ends.
#[must_use]
pub fn signed_offset(year: i32, date: NaiveDate) -> i64 {
    NaiveDate::from_ymd_opt(year, 1, 1).map_or(0, |jan1| (date - jan1).num_days())
}

/// Parse a persisted comma-joined day list.
///
/// Entries that are not integers inside `year` are skipped. The result is
/// sorted and deduplicated.
#[must_use]
pub fn parse_day_list(raw: &str, year: i32) -> Vec<u16> {
    let days = days_in_year(year);
    let mut out: Vec<u16> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse::<u16>() {
            Ok(d) if d < days => Some(d),
            _ => {
                debug!(entry = s, year, "dropping invalid day entry");
                None
            }
        })
        .collect();
    out.sort_unstable();
    out.dedup();
    out
}

/// Parse a single persisted day, `None` for blank or invalid values.
#[must_use]
pub fn parse_day(raw: &str, year: i32) -> Option<u16> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<u16>()
        .ok()
        .filter(|d| *d < days_in_year(year))
}

#[must_use]
pub fn join_day_list(days: &[u16]) -> String {
    days.iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
