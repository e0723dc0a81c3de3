/*
 * Copyright (c) 2025. The misp-time contributors
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, you can obtain one at https://mozilla.org/MPL/2.0/.
 */

/*!
    `calendar_dates` exposes [Date], a proleptic Gregorian calendar date keyed
    by Modified Julian Day. It backs the ISO 8601 textual form of
    [crate::UtcInstant] and [crate::Instant].
*/

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::OnceLock;

use num::ToPrimitive;
use regex::Regex;
use thiserror::Error;

fn iso_regex() -> &'static Regex {
    static ISO: OnceLock<Regex> = OnceLock::new();
    ISO.get_or_init(|| {
        Regex::new(r"^(?<year>-?\d{4,})-(?<month>\d{2})-(?<day>\d{2})$").unwrap()
    })
}

/// Error type returned when attempting to construct a [Date] from invalid
/// inputs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DateError {
    #[error("invalid date `{0}-{1:02}-{2:02}`")]
    InvalidDate(i64, u8, u8),
    #[error("date `{0}-{1:02}-{2:02}` exceeds the supported modified Julian day range")]
    DateOutOfRange(i64, u8, u8),
    #[error("invalid ISO string `{0}`")]
    InvalidIsoString(String),
}

/// A proleptic Gregorian calendar date.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Date {
    year: i64,
    month: u8,
    day: u8,
}

impl Date {
    /// Constructs a new [Date] from a year, month and day.
    ///
    /// # Errors
    ///
    /// - [DateError::InvalidDate] if the input fields do not represent a valid
    ///   date.
    /// - [DateError::DateOutOfRange] if the date has no `i64` Modified Julian
    ///   Day.
    pub fn new(year: i64, month: u8, day: u8) -> Result<Self, DateError> {
        if !(1..=12).contains(&month) {
            return Err(DateError::InvalidDate(year, month, day));
        }
        let mjd = modified_julian_day_of(year, month, day)
            .to_i64()
            .ok_or(DateError::DateOutOfRange(year, month, day))?;
        let check = Date::from_modified_julian_day(mjd);
        if check.year != year || check.month != month || check.day != day {
            return Err(DateError::InvalidDate(year, month, day));
        }
        Ok(Date { year, month, day })
    }

    /// Constructs a new [Date] from an ISO 8601 date string.
    ///
    /// # Errors
    ///
    /// - [DateError::InvalidIsoString] if the input is not a valid ISO 8601
    ///   date.
    /// - [DateError::InvalidDate] if the parsed fields do not represent a
    ///   valid date.
    pub fn from_iso(iso: &str) -> Result<Self, DateError> {
        let caps = iso_regex()
            .captures(iso)
            .ok_or_else(|| DateError::InvalidIsoString(iso.to_owned()))?;
        let year: i64 = caps["year"]
            .parse()
            .map_err(|_| DateError::InvalidIsoString(iso.to_owned()))?;
        let month = caps["month"]
            .parse()
            .map_err(|_| DateError::InvalidIsoString(iso.to_owned()))?;
        let day = caps["day"]
            .parse()
            .map_err(|_| DateError::InvalidIsoString(iso.to_owned()))?;
        Date::new(year, month, day)
    }

    /// Constructs a new [Date] from a Modified Julian Day.
    pub fn from_modified_julian_day(mjd: i64) -> Self {
        let year = find_year(mjd);
        let leap = is_leap_year(year as i128);
        let day_of_year = (mjd as i128 - last_day_of_year(year as i128 - 1))
            .to_u16()
            .unwrap_or_else(|| unreachable!("day of year should be in the range [1, 366]"));
        let month = find_month(day_of_year, leap);
        let day = find_day(day_of_year, month, leap);

        Date { year, month, day }
    }

    /// Returns the Modified Julian Day of `self`.
    pub fn modified_julian_day(&self) -> i64 {
        modified_julian_day_of(self.year, self.month, self.day)
            .to_i64()
            .unwrap_or_else(|| {
                unreachable!(
                    "modified Julian day of a valid date should be representable as i64: {}",
                    self
                )
            })
    }

    pub fn year(&self) -> i64 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }
}

impl Display for Date {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.year < 0 {
            write!(f, "-{:04}-{:02}-{:02}", -self.year, self.month, self.day)
        } else {
            write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
        }
    }
}

impl FromStr for Date {
    type Err = DateError;

    fn from_str(iso: &str) -> Result<Self, Self::Err> {
        Self::from_iso(iso)
    }
}

/// 2000-01-01 as a Modified Julian Day.
const MJD_J2000: i64 = 51_544;

/// Returns the Modified Julian Day of 31 December of `year`.
fn last_day_of_year(year: i128) -> i128 {
    365 * year + year.div_euclid(4) - year.div_euclid(100) + year.div_euclid(400) - 678_576
}

fn is_leap_year(year: i128) -> bool {
    year.rem_euclid(4) == 0 && (year.rem_euclid(400) == 0 || year.rem_euclid(100) != 0)
}

fn find_year(mjd: i64) -> i64 {
    let days = mjd as i128 - MJD_J2000 as i128;
    let year = (400 * days + 292_194_288).div_euclid(146_097);
    let year = if mjd as i128 <= last_day_of_year(year - 1) {
        year - 1
    } else {
        year
    };
    year.to_i64()
        .unwrap_or_else(|| unreachable!("year could not be represented as i64: {}", year))
}

const PREVIOUS_MONTH_END_DAY: [u16; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

const PREVIOUS_MONTH_END_DAY_LEAP: [u16; 12] =
    [0, 31, 60, 91, 121, 152, 182, 213, 244, 274, 305, 335];

fn find_month(day_of_year: u16, is_leap: bool) -> u8 {
    let offset = if is_leap { 313 } else { 323 };
    let month = if day_of_year < 32 {
        1
    } else {
        (10 * day_of_year + offset) / 306
    };
    month
        .to_u8()
        .unwrap_or_else(|| unreachable!("month could not be represented as u8: {}", month))
}

fn find_day(day_of_year: u16, month: u8, is_leap: bool) -> u8 {
    let previous_days = if is_leap {
        PREVIOUS_MONTH_END_DAY_LEAP
    } else {
        PREVIOUS_MONTH_END_DAY
    };
    let day = day_of_year - previous_days[(month - 1) as usize];
    day.to_u8()
        .unwrap_or_else(|| unreachable!("day could not be represented as u8: {}", day))
}

fn modified_julian_day_of(year: i64, month: u8, day: u8) -> i128 {
    let leap = is_leap_year(year as i128);
    let previous_days = if leap {
        PREVIOUS_MONTH_END_DAY_LEAP
    } else {
        PREVIOUS_MONTH_END_DAY
    };
    last_day_of_year(year as i128 - 1)
        + previous_days[(month - 1) as usize] as i128
        + day as i128
}
