//! Day-number sort values.
//!
//! A sort value is the Julian day number of a proleptic Gregorian date, so
//! plain integer comparison is chronological and the difference of two values
//! is a count of days. Zero is reserved for "unknown" and never produced for a
//! real date (day 0 is in 4713 BC).

use chrono::{Datelike, Local, NaiveDate};

const SDN_OFFSET: i64 = 32_045;
const DAYS_PER_5_MONTHS: i64 = 153;
const DAYS_PER_4_YEARS: i64 = 1_461;
const DAYS_PER_400_YEARS: i64 = 146_097;

/// Days in a year, used to turn day differences into whole years.
pub const DAYS_PER_YEAR: i32 = 365;

/// Julian day number for a Gregorian year/month/day.
///
/// Missing parts are adjusted before conversion: year 0 becomes 1, month and
/// day 0 become 1. Out-of-range days roll over arithmetically instead of
/// failing.
pub fn day_number(year: i32, month: u32, day: u32) -> i32 {
    let year = if year == 0 { 1 } else { i64::from(year) };
    let month = i64::from(month.max(1));
    let day = i64::from(day.max(1));

    let mut y = if year < 0 { year + 4_801 } else { year + 4_800 };
    let m = if month > 2 {
        month - 3
    } else {
        y -= 1;
        month + 9
    };

    let sdn = (y.div_euclid(100) * DAYS_PER_400_YEARS).div_euclid(4)
        + (y.rem_euclid(100) * DAYS_PER_4_YEARS).div_euclid(4)
        + (m * DAYS_PER_5_MONTHS + 2).div_euclid(5)
        + day
        - SDN_OFFSET;

    i32::try_from(sdn).unwrap_or(0)
}

pub fn from_naive(date: NaiveDate) -> i32 {
    day_number(date.year(), date.month(), date.day())
}

/// Sort value of the local calendar date.
pub fn today() -> i32 {
    from_naive(Local::now().date_naive())
}

/// A span of `days` is more than `years` whole years long.
pub fn exceeds_years(days: i32, years: u32) -> bool {
    i64::from(days) > i64::from(years) * i64::from(DAYS_PER_YEAR)
}

/// A span of `days` is shorter than `years` years.
pub fn short_of_years(days: i32, years: u32) -> bool {
    i64::from(days) < i64::from(years) * i64::from(DAYS_PER_YEAR)
}
