/*
 * Copyright (c) 2025. The misp-time contributors
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, you can obtain one at https://mozilla.org/MPL/2.0/.
 */

/*!
    Module `utc` exposes [UtcInstant], a leap-second aware point on the civil
    UTC scale.

    A UTC instant is a Modified Julian Day paired with a nanosecond-of-day.
    The length of a day depends on the leap second table: days bearing a
    positive leap second are 86401 SI seconds long, days bearing a negative
    one 86399. All operations that depend on day lengths take the governing
    [leap_seconds::UtcRules] either explicitly (`*_with_rules`) or implicitly
    via the process-wide [leap_seconds::SystemUtcRules].
*/

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::calendar_dates::{Date, DateError};
use crate::constants::{NANOS_PER_DAY, NANOS_PER_SECOND, SECONDS_PER_DAY};
use crate::deltas::{Overflow, TimeDelta};
use crate::instant::{write_second_fraction, Instant};
use crate::misp::MispInstant;
use crate::tai::TaiInstant;

use self::leap_seconds::{SystemUtcRules, UtcRules};

pub mod leap_seconds;

fn iso_regex() -> &'static Regex {
    static ISO: OnceLock<Regex> = OnceLock::new();
    ISO.get_or_init(|| {
        Regex::new(
            r"^(?<year>-?\d{4,})-(?<month>\d{2})-(?<day>\d{2})T(?<hour>\d{2}):(?<minute>\d{2}):(?<second>\d{2})(?<fraction>\.\d{1,9})?Z$",
        )
        .unwrap()
    })
}

/// Error type returned when attempting to construct a [UtcInstant] from
/// invalid inputs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UtcError {
    #[error(transparent)]
    Date(#[from] DateError),
    #[error("invalid UTC instant string `{0}`")]
    InvalidIsoString(String),
    #[error("nano of day must be in the range [0, {max}) on modified Julian day {mjd} but was {nano_of_day}")]
    InvalidNanoOfDay { mjd: i64, nano_of_day: i64, max: i64 },
    #[error("leap seconds are only valid at 23:59:60")]
    InvalidLeapSecond,
    #[error("no leap second on {0}")]
    NonLeapSecondDate(Date),
}

/// A point on the civil UTC scale with nanosecond precision and full leap
/// second support.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "(i64, i64)", into = "(i64, i64)"))]
pub struct UtcInstant {
    mjd: i64,
    nano_of_day: i64,
}

impl UtcInstant {
    /// Constructs a [UtcInstant] from a Modified Julian Day and a
    /// nanosecond-of-day, validated against the process-wide leap second
    /// rules.
    ///
    /// # Errors
    ///
    /// - [UtcError::InvalidNanoOfDay] if `nano_of_day` is outside the length
    ///   of day `mjd`.
    pub fn from_modified_julian_day(mjd: i64, nano_of_day: i64) -> Result<Self, UtcError> {
        Self::from_modified_julian_day_with_rules(mjd, nano_of_day, &SystemUtcRules)
    }

    /// Constructs a [UtcInstant] validated against the given rules.
    pub fn from_modified_julian_day_with_rules(
        mjd: i64,
        nano_of_day: i64,
        rules: &impl UtcRules,
    ) -> Result<Self, UtcError> {
        let max = rules.nanos_per_day(mjd);
        if !(0..max).contains(&nano_of_day) {
            return Err(UtcError::InvalidNanoOfDay {
                mjd,
                nano_of_day,
                max,
            });
        }
        Ok(Self { mjd, nano_of_day })
    }

    // Invariant: callers guarantee `nano_of_day` is within the day length.
    pub(crate) const fn from_parts(mjd: i64, nano_of_day: i64) -> Self {
        Self { mjd, nano_of_day }
    }

    /// Constructs a [UtcInstant] from an ISO 8601 string, validated against
    /// the process-wide leap second rules.
    ///
    /// The second field may be `60` only at `23:59` on a day bearing a
    /// positive leap second. Between one and nine fractional digits are
    /// accepted; the trailing `Z` is required.
    ///
    /// # Errors
    ///
    /// - [UtcError::InvalidIsoString] if the input does not match the
    ///   grammar.
    /// - [UtcError::Date] if the date component is invalid.
    /// - [UtcError::InvalidLeapSecond] if the second is `60` anywhere but
    ///   `23:59:60`.
    /// - [UtcError::NonLeapSecondDate] if the second is `60` on a date
    ///   without a positive leap second.
    pub fn from_iso(iso: &str) -> Result<Self, UtcError> {
        Self::from_iso_with_rules(iso, &SystemUtcRules)
    }

    /// Constructs a [UtcInstant] from an ISO 8601 string, validated against
    /// the given rules.
    pub fn from_iso_with_rules(iso: &str, rules: &impl UtcRules) -> Result<Self, UtcError> {
        let caps = iso_regex()
            .captures(iso)
            .ok_or_else(|| UtcError::InvalidIsoString(iso.to_owned()))?;
        let year: i64 = caps["year"]
            .parse()
            .map_err(|_| UtcError::InvalidIsoString(iso.to_owned()))?;
        let month: u8 = caps["month"]
            .parse()
            .map_err(|_| UtcError::InvalidIsoString(iso.to_owned()))?;
        let day: u8 = caps["day"]
            .parse()
            .map_err(|_| UtcError::InvalidIsoString(iso.to_owned()))?;
        let hour: i64 = caps["hour"]
            .parse()
            .map_err(|_| UtcError::InvalidIsoString(iso.to_owned()))?;
        let minute: i64 = caps["minute"]
            .parse()
            .map_err(|_| UtcError::InvalidIsoString(iso.to_owned()))?;
        let second: i64 = caps["second"]
            .parse()
            .map_err(|_| UtcError::InvalidIsoString(iso.to_owned()))?;

        if hour > 23 || minute > 59 || second > 60 {
            return Err(UtcError::InvalidIsoString(iso.to_owned()));
        }

        let date = Date::new(year, month, day)?;
        let mjd = date.modified_julian_day();

        if second == 60 {
            if hour != 23 || minute != 59 {
                return Err(UtcError::InvalidLeapSecond);
            }
            if rules.leap_second_adjustment(mjd) != 1 {
                return Err(UtcError::NonLeapSecondDate(date));
            }
        }

        let nano = match caps.name("fraction") {
            Some(fraction) => {
                let digits = &fraction.as_str()[1..];
                let value: i64 = digits
                    .parse()
                    .map_err(|_| UtcError::InvalidIsoString(iso.to_owned()))?;
                value * 10i64.pow(9 - digits.len() as u32)
            }
            None => 0,
        };

        let second_of_day = hour * 3600 + minute * 60 + second;
        Self::from_modified_julian_day_with_rules(
            mjd,
            second_of_day * NANOS_PER_SECOND + nano,
            rules,
        )
    }

    /// Converts a TAI instant to UTC using the process-wide leap second
    /// rules.
    pub fn from_tai(tai: TaiInstant) -> Self {
        tai.to_utc()
    }

    /// Converts an [Instant] to UTC using the process-wide leap second rules.
    pub fn from_instant(instant: Instant) -> Self {
        instant.to_utc()
    }

    /// Converts a MISP instant to UTC via TAI.
    ///
    /// # Errors
    ///
    /// - [Overflow] if the intermediate TAI conversion overflows.
    pub fn from_misp(misp: MispInstant) -> Result<Self, Overflow> {
        misp.to_utc()
    }

    /// Returns the Modified Julian Day of the instant.
    pub fn modified_julian_day(&self) -> i64 {
        self.mjd
    }

    /// Returns the nanoseconds into the UTC day, in
    /// `[0, 86400... + leap adjustment × 10^9)`.
    pub fn nano_of_day(&self) -> i64 {
        self.nano_of_day
    }

    /// Returns true if the instant falls inside an added leap second.
    pub fn is_leap_second(&self) -> bool {
        self.nano_of_day >= NANOS_PER_DAY
    }

    /// Returns a copy of this instant on the given day, keeping the
    /// nanosecond-of-day.
    ///
    /// # Errors
    ///
    /// - [UtcError::InvalidNanoOfDay] if the nanosecond-of-day does not fit
    ///   the new day's length.
    pub fn with_modified_julian_day(&self, mjd: i64) -> Result<Self, UtcError> {
        Self::from_modified_julian_day(mjd, self.nano_of_day)
    }

    /// Returns a copy of this instant with the given nanosecond-of-day.
    ///
    /// # Errors
    ///
    /// - [UtcError::InvalidNanoOfDay] if `nano_of_day` is outside the day's
    ///   length.
    pub fn with_nano_of_day(&self, nano_of_day: i64) -> Result<Self, UtcError> {
        Self::from_modified_julian_day(self.mjd, nano_of_day)
    }

    /// Returns this instant advanced by `delta`, walking forward across days
    /// of varying length under the process-wide leap second rules.
    ///
    /// # Errors
    ///
    /// - [Overflow] if the Modified Julian Day overflows.
    pub fn checked_add(&self, delta: TimeDelta) -> Result<Self, Overflow> {
        // A single snapshot keeps the whole walk on one table even if a
        // registration lands mid-operation.
        self.checked_add_with_rules(delta, SystemUtcRules.snapshot().as_ref())
    }

    /// Returns this instant advanced by `delta` under the given rules.
    pub fn checked_add_with_rules(
        &self,
        delta: TimeDelta,
        rules: &impl UtcRules,
    ) -> Result<Self, Overflow> {
        self.shifted(delta.seconds() as i128, delta.nano() as i64, rules)
    }

    /// Returns this instant moved back by `delta`, walking backward across
    /// days of varying length under the process-wide leap second rules.
    ///
    /// # Errors
    ///
    /// - [Overflow] if the Modified Julian Day overflows.
    pub fn checked_sub(&self, delta: TimeDelta) -> Result<Self, Overflow> {
        self.checked_sub_with_rules(delta, SystemUtcRules.snapshot().as_ref())
    }

    /// Returns this instant moved back by `delta` under the given rules.
    pub fn checked_sub_with_rules(
        &self,
        delta: TimeDelta,
        rules: &impl UtcRules,
    ) -> Result<Self, Overflow> {
        self.shifted(-(delta.seconds() as i128), -(delta.nano() as i64), rules)
    }

    // The shift is an SI-second displacement over days of varying length.
    // The instant is projected onto the rules' linear nanosecond axis, the
    // displacement applied there, and the result re-normalised to a day and
    // a nanosecond-of-day. The widened intermediate keeps every `i64`
    // Modified Julian Day representable, so only a result whose day leaves
    // the `i64` range fails.
    fn shifted(&self, seconds: i128, nanos: i64, rules: &impl UtcRules) -> Result<Self, Overflow> {
        let position = leap_seconds::day_start_nanos(rules, self.mjd as i128)
            + self.nano_of_day as i128
            + seconds * NANOS_PER_SECOND as i128
            + nanos as i128;
        leap_seconds::utc_at_linear_nanos(rules, position)
    }

    /// Converts the instant to TAI using the process-wide leap second rules.
    ///
    /// # Errors
    ///
    /// - [Overflow] if the TAI seconds count is not representable.
    pub fn to_tai(&self) -> Result<TaiInstant, Overflow> {
        self.to_tai_with_rules(&SystemUtcRules)
    }

    /// Converts the instant to TAI using the given rules.
    pub fn to_tai_with_rules(&self, rules: &impl UtcRules) -> Result<TaiInstant, Overflow> {
        rules.convert_utc_to_tai(*self)
    }

    /// Converts the instant to the leap-second-free [Instant] scale using the
    /// process-wide leap second rules.
    ///
    /// On days bearing a leap second the conversion applies the Smoothed Leap
    /// Second mapping, so it is continuous and monotone but inexact by up to
    /// one nanosecond inside the smoothing window.
    ///
    /// # Errors
    ///
    /// - [Overflow] if the Unix seconds count is not representable.
    pub fn to_instant(&self) -> Result<Instant, Overflow> {
        self.to_instant_with_rules(&SystemUtcRules)
    }

    /// Converts the instant to the leap-second-free [Instant] scale using the
    /// given rules.
    pub fn to_instant_with_rules(&self, rules: &impl UtcRules) -> Result<Instant, Overflow> {
        rules.convert_utc_to_instant(*self)
    }

    /// Converts the instant to the MISP scale via TAI.
    ///
    /// # Errors
    ///
    /// - [Overflow] if either conversion overflows.
    pub fn to_misp(&self) -> Result<MispInstant, Overflow> {
        MispInstant::from_utc(*self)
    }

    /// Returns the big-endian framing of the instant: the Modified Julian
    /// Day followed by the nanosecond-of-day.
    pub fn to_be_bytes(&self) -> [u8; 16] {
        let mut bytes = [0; 16];
        bytes[..8].copy_from_slice(&self.mjd.to_be_bytes());
        bytes[8..].copy_from_slice(&self.nano_of_day.to_be_bytes());
        bytes
    }

    /// Reconstructs a [UtcInstant] from its big-endian framing, validated
    /// against the process-wide leap second rules.
    ///
    /// # Errors
    ///
    /// - [UtcError::InvalidNanoOfDay] if the nanosecond-of-day is outside the
    ///   day's length.
    pub fn from_be_bytes(bytes: [u8; 16]) -> Result<Self, UtcError> {
        let mut mjd = [0; 8];
        mjd.copy_from_slice(&bytes[..8]);
        let mut nano_of_day = [0; 8];
        nano_of_day.copy_from_slice(&bytes[8..]);
        Self::from_modified_julian_day(i64::from_be_bytes(mjd), i64::from_be_bytes(nano_of_day))
    }
}

impl Display for UtcInstant {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let date = Date::from_modified_julian_day(self.mjd);
        let second_of_day = self.nano_of_day / NANOS_PER_SECOND;
        let nano = self.nano_of_day % NANOS_PER_SECOND;
        let (hour, minute, second) = if second_of_day >= SECONDS_PER_DAY {
            // An added leap second renders as second 60 of the last minute.
            (23, 59, 60 + second_of_day - SECONDS_PER_DAY)
        } else {
            (
                second_of_day / 3600,
                second_of_day / 60 % 60,
                second_of_day % 60,
            )
        };
        write!(f, "{}T{:02}:{:02}:{:02}", date, hour, minute, second)?;
        write_second_fraction(f, nano)?;
        f.write_str("Z")
    }
}

impl FromStr for UtcInstant {
    type Err = UtcError;

    fn from_str(iso: &str) -> Result<Self, Self::Err> {
        Self::from_iso(iso)
    }
}

impl From<UtcInstant> for (i64, i64) {
    fn from(utc: UtcInstant) -> Self {
        (utc.mjd, utc.nano_of_day)
    }
}

impl TryFrom<(i64, i64)> for UtcInstant {
    type Error = UtcError;

    fn try_from((mjd, nano_of_day): (i64, i64)) -> Result<Self, Self::Error> {
        Self::from_modified_julian_day(mjd, nano_of_day)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use crate::constants::NANOS_PER_DAY;

    use super::*;

    const FIRST_LEAP_MJD: i64 = 41_498; // 1972-06-30, an 86401 second day

    #[rstest]
    #[case::start_of_day(41_317, 0, true)]
    #[case::end_of_normal_day(41_317, NANOS_PER_DAY - 1, true)]
    #[case::second_60_on_normal_day(41_317, NANOS_PER_DAY, false)]
    #[case::leap_second(FIRST_LEAP_MJD, NANOS_PER_DAY, true)]
    #[case::end_of_leap_day(FIRST_LEAP_MJD, NANOS_PER_DAY + NANOS_PER_SECOND - 1, true)]
    #[case::past_leap_day(FIRST_LEAP_MJD, NANOS_PER_DAY + NANOS_PER_SECOND, false)]
    #[case::negative(41_317, -1, false)]
    fn test_utc_from_modified_julian_day(
        #[case] mjd: i64,
        #[case] nano_of_day: i64,
        #[case] valid: bool,
    ) {
        let actual = UtcInstant::from_modified_julian_day(mjd, nano_of_day);
        if valid {
            let utc = actual.unwrap();
            assert_eq!(utc.modified_julian_day(), mjd);
            assert_eq!(utc.nano_of_day(), nano_of_day);
        } else {
            assert!(matches!(actual, Err(UtcError::InvalidNanoOfDay { .. })));
        }
    }

    #[rstest]
    #[case::unix_epoch("1970-01-01T00:00:00Z", 40_587, 0)]
    #[case::fractional("2022-03-05T00:00:08.000082Z", 59_643, 8 * NANOS_PER_SECOND + 82_000)]
    #[case::nine_digits("2022-03-05T00:00:08.123456789Z", 59_643, 8 * NANOS_PER_SECOND + 123_456_789)]
    #[case::leap_second("1972-06-30T23:59:60Z", FIRST_LEAP_MJD, NANOS_PER_DAY)]
    #[case::leap_second_fraction("1972-06-30T23:59:60.5Z", FIRST_LEAP_MJD, NANOS_PER_DAY + 500_000_000)]
    #[case::last_nano_before_leap("1972-06-30T23:59:59.999999999Z", FIRST_LEAP_MJD, NANOS_PER_DAY - 1)]
    fn test_utc_parse(#[case] iso: &str, #[case] mjd: i64, #[case] nano_of_day: i64) {
        let utc: UtcInstant = iso.parse().unwrap();
        assert_eq!(utc.modified_julian_day(), mjd);
        assert_eq!(utc.nano_of_day(), nano_of_day);
    }

    #[rstest]
    #[case::missing_zulu("1972-06-30T23:59:60", UtcError::InvalidIsoString("1972-06-30T23:59:60".to_string()))]
    #[case::space_separator("1972-06-30 23:59:60Z", UtcError::InvalidIsoString("1972-06-30 23:59:60Z".to_string()))]
    #[case::ten_fraction_digits("1972-06-30T12:00:00.0123456789Z", UtcError::InvalidIsoString("1972-06-30T12:00:00.0123456789Z".to_string()))]
    #[case::hour_24("2000-01-01T24:00:00Z", UtcError::InvalidIsoString("2000-01-01T24:00:00Z".to_string()))]
    #[case::second_61("2000-01-01T23:59:61Z", UtcError::InvalidIsoString("2000-01-01T23:59:61Z".to_string()))]
    #[case::leap_second_mid_day("1972-06-30T12:34:60Z", UtcError::InvalidLeapSecond)]
    #[case::leap_second_on_normal_day("2000-01-01T23:59:60Z", UtcError::NonLeapSecondDate(Date::new(2000, 1, 1).unwrap()))]
    #[case::invalid_date("2022-02-30T00:00:00Z", UtcError::Date(DateError::InvalidDate(2022, 2, 30)))]
    fn test_utc_parse_errors(#[case] iso: &str, #[case] expected: UtcError) {
        let actual: Result<UtcInstant, UtcError> = iso.parse();
        assert_eq!(actual, Err(expected));
    }

    #[rstest]
    #[case::unix_epoch(UtcInstant::from_parts(40_587, 0), "1970-01-01T00:00:00Z")]
    #[case::millis(UtcInstant::from_parts(59_643, 500_000_000), "2022-03-05T00:00:00.500Z")]
    #[case::micros(UtcInstant::from_parts(59_643, 8 * NANOS_PER_SECOND + 82_000), "2022-03-05T00:00:08.000082Z")]
    #[case::nanos(UtcInstant::from_parts(59_643, 123_456_789), "2022-03-05T00:00:00.123456789Z")]
    #[case::leap_second(UtcInstant::from_parts(FIRST_LEAP_MJD, NANOS_PER_DAY), "1972-06-30T23:59:60Z")]
    #[case::mid_leap_second(UtcInstant::from_parts(FIRST_LEAP_MJD, NANOS_PER_DAY + 250_000_000), "1972-06-30T23:59:60.250Z")]
    fn test_utc_display(#[case] utc: UtcInstant, #[case] expected: &str) {
        assert_eq!(expected, utc.to_string());
    }

    #[test]
    fn test_utc_is_leap_second() {
        assert!(UtcInstant::from_parts(FIRST_LEAP_MJD, NANOS_PER_DAY).is_leap_second());
        assert!(!UtcInstant::from_parts(FIRST_LEAP_MJD, NANOS_PER_DAY - 1).is_leap_second());
    }

    #[rstest]
    #[case::into_leap_second(
        UtcInstant::from_parts(FIRST_LEAP_MJD, NANOS_PER_DAY - 1),
        TimeDelta::normalized(0, 1).unwrap(),
        UtcInstant::from_parts(FIRST_LEAP_MJD, NANOS_PER_DAY),
    )]
    #[case::through_leap_second(
        UtcInstant::from_parts(FIRST_LEAP_MJD, NANOS_PER_DAY),
        TimeDelta::from_seconds(1),
        UtcInstant::from_parts(41_499, 0),
    )]
    #[case::one_normal_day(
        UtcInstant::from_parts(41_317, 12 * 3600 * NANOS_PER_SECOND),
        TimeDelta::from_seconds(SECONDS_PER_DAY),
        UtcInstant::from_parts(41_318, 12 * 3600 * NANOS_PER_SECOND),
    )]
    #[case::across_leap_day(
        UtcInstant::from_parts(FIRST_LEAP_MJD, 0),
        TimeDelta::from_seconds(2 * SECONDS_PER_DAY),
        UtcInstant::from_parts(41_499, 86_399 * NANOS_PER_SECOND),
    )]
    fn test_utc_checked_add(
        #[case] utc: UtcInstant,
        #[case] delta: TimeDelta,
        #[case] expected: UtcInstant,
    ) {
        assert_eq!(Ok(expected), utc.checked_add(delta));
        assert_eq!(Ok(utc), expected.checked_sub(delta));
    }

    #[test]
    fn test_utc_add_day_across_leap_is_a_leap_second_longer() {
        // 86400 elapsed seconds starting at noon of the leap day land one
        // second before noon of the next day.
        let utc = UtcInstant::from_parts(FIRST_LEAP_MJD, 12 * 3600 * NANOS_PER_SECOND);
        let shifted = utc.checked_add(TimeDelta::from_seconds(SECONDS_PER_DAY)).unwrap();
        assert_eq!(
            shifted,
            UtcInstant::from_parts(41_499, (12 * 3600 - 1) * NANOS_PER_SECOND)
        );
    }

    #[test]
    fn test_utc_checked_sub_borrows_from_leap_day() {
        let utc = UtcInstant::from_parts(41_499, 0);
        let shifted = utc.checked_sub(TimeDelta::normalized(0, 1).unwrap()).unwrap();
        assert_eq!(
            shifted,
            UtcInstant::from_parts(FIRST_LEAP_MJD, NANOS_PER_DAY + NANOS_PER_SECOND - 1)
        );
    }

    #[rstest]
    #[case::add(TimeDelta::from_seconds(SECONDS_PER_DAY), true)]
    #[case::sub(TimeDelta::from_seconds(SECONDS_PER_DAY), false)]
    fn test_utc_shift_overflows_at_mjd_bounds(#[case] delta: TimeDelta, #[case] forward: bool) {
        let (mjd, result) = if forward {
            (i64::MAX, UtcInstant::from_parts(i64::MAX, 0).checked_add(delta))
        } else {
            (i64::MIN, UtcInstant::from_parts(i64::MIN, 0).checked_sub(delta))
        };
        assert_eq!(result, Err(Overflow), "shifting mjd {} should overflow", mjd);
    }

    #[test]
    fn test_utc_with_modified_julian_day() {
        let leap = UtcInstant::from_parts(FIRST_LEAP_MJD, NANOS_PER_DAY);
        // 1981-06-30 also bears a positive leap second.
        let moved = leap.with_modified_julian_day(45_150).unwrap();
        assert_eq!(moved.to_string(), "1981-06-30T23:59:60Z");
        assert!(matches!(
            leap.with_modified_julian_day(41_499),
            Err(UtcError::InvalidNanoOfDay { .. })
        ));
    }

    #[test]
    fn test_utc_with_nano_of_day() {
        let utc = UtcInstant::from_parts(FIRST_LEAP_MJD, 0);
        assert_eq!(
            utc.with_nano_of_day(NANOS_PER_DAY),
            Ok(UtcInstant::from_parts(FIRST_LEAP_MJD, NANOS_PER_DAY))
        );
        assert!(matches!(
            utc.with_nano_of_day(NANOS_PER_DAY + NANOS_PER_SECOND),
            Err(UtcError::InvalidNanoOfDay { .. })
        ));
    }

    #[test]
    fn test_utc_ordering_across_leap_second() {
        let before = UtcInstant::from_parts(FIRST_LEAP_MJD, NANOS_PER_DAY - 1);
        let leap = UtcInstant::from_parts(FIRST_LEAP_MJD, NANOS_PER_DAY);
        let after = UtcInstant::from_parts(41_499, 0);
        assert!(before < leap);
        assert!(leap < after);
    }

    #[test]
    fn test_utc_be_bytes_roundtrip() {
        let utc = UtcInstant::from_parts(FIRST_LEAP_MJD, NANOS_PER_DAY + 123);
        assert_eq!(Ok(utc), UtcInstant::from_be_bytes(utc.to_be_bytes()));
    }

    proptest! {
        #[test]
        fn prop_utc_parse_display_roundtrip(mjd in 36_204i64..80_000, nano_of_day in 0..NANOS_PER_DAY) {
            let utc = UtcInstant::from_modified_julian_day(mjd, nano_of_day).unwrap();
            prop_assert_eq!(Ok(utc), utc.to_string().parse());
        }

        #[test]
        fn prop_utc_add_sub_inverse(
            mjd in 41_000i64..60_000,
            nano_of_day in 0..NANOS_PER_DAY,
            delta_seconds in -10_000_000i64..10_000_000,
            delta_nanos in 0i64..1_000_000_000,
        ) {
            let utc = UtcInstant::from_modified_julian_day(mjd, nano_of_day).unwrap();
            let delta = TimeDelta::normalized(delta_seconds, delta_nanos).unwrap();
            let roundtrip = utc.checked_add(delta).unwrap().checked_sub(delta).unwrap();
            prop_assert_eq!(utc, roundtrip);
        }
    }
}
