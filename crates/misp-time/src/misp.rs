/*
 * Copyright (c) 2026. The misp-time contributors
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, you can obtain one at https://mozilla.org/MPL/2.0/.
 */

/*!
    Module `misp` exposes [MispInstant], a point on the mission time scale.

    MISP is a constant offset from TAI: its zero is the TAI instant
    378691208 s and 82000 ns past the TAI epoch. Everything beyond that single
    datum is shared with [TaiInstant]; conversions to UTC and to the external
    [Instant] scale compose through TAI.
*/

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::constants::{MISP_EPOCH_TAI_NANOS, MISP_EPOCH_TAI_SECONDS, NANOS_PER_SECOND};
use crate::deltas::{normalize, InvalidNano, Overflow, TimeDelta};
use crate::instant::{be_bytes, parts_from_be_bytes, Instant};
use crate::tai::{parse_scaled_instant, TaiInstant};
use crate::utc::UtcInstant;

fn misp_regex() -> &'static Regex {
    static MISP: OnceLock<Regex> = OnceLock::new();
    MISP.get_or_init(|| Regex::new(r"^(?<seconds>-?[0-9]+)\.(?<nano>[0-9]{9})s\(MISP\)$").unwrap())
}

/// Error type returned when parsing an invalid MISP instant string.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid MISP instant string `{0}`")]
pub struct ParseMispError(pub String);

/// A point on the MISP scale with nanosecond precision.
///
/// The representation mirrors [TaiInstant] with the seconds counted from the
/// MISP epoch instead of the TAI epoch.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "(i64, u32)", into = "(i64, u32)"))]
pub struct MispInstant {
    misp_seconds: i64,
    nano: u32,
}

impl MispInstant {
    /// Constructs a [MispInstant] from a count of MISP seconds and an
    /// arbitrary signed nanosecond adjustment.
    ///
    /// # Errors
    ///
    /// - [Overflow] if applying the adjustment overflows the seconds count.
    pub fn from_misp_seconds(misp_seconds: i64, nano_adjustment: i64) -> Result<Self, Overflow> {
        let (misp_seconds, nano) = normalize(misp_seconds, nano_adjustment)?;
        Ok(Self { misp_seconds, nano })
    }

    /// Translates a TAI instant to the MISP scale by subtracting the MISP
    /// epoch.
    ///
    /// # Errors
    ///
    /// - [Overflow] if the MISP seconds count is not representable.
    pub fn from_tai(tai: TaiInstant) -> Result<Self, Overflow> {
        let misp_seconds = tai
            .tai_seconds()
            .checked_sub(MISP_EPOCH_TAI_SECONDS)
            .ok_or(Overflow)?;
        Self::from_misp_seconds(
            misp_seconds,
            tai.nano() as i64 - MISP_EPOCH_TAI_NANOS as i64,
        )
    }

    /// The inverse of [MispInstant::from_tai].
    ///
    /// # Errors
    ///
    /// - [Overflow] if the TAI seconds count is not representable.
    pub fn to_tai(&self) -> Result<TaiInstant, Overflow> {
        let tai_seconds = self
            .misp_seconds
            .checked_add(MISP_EPOCH_TAI_SECONDS)
            .ok_or(Overflow)?;
        TaiInstant::from_tai_seconds(
            tai_seconds,
            self.nano as i64 + MISP_EPOCH_TAI_NANOS as i64,
        )
    }

    /// Converts a UTC instant to the MISP scale via TAI.
    ///
    /// # Errors
    ///
    /// - [Overflow] if either conversion overflows.
    pub fn from_utc(utc: UtcInstant) -> Result<Self, Overflow> {
        Self::from_tai(utc.to_tai()?)
    }

    /// Converts the instant to UTC via TAI.
    ///
    /// # Errors
    ///
    /// - [Overflow] if the TAI seconds count is not representable.
    pub fn to_utc(&self) -> Result<UtcInstant, Overflow> {
        Ok(self.to_tai()?.to_utc())
    }

    /// Translates an [Instant] to the MISP scale via TAI.
    ///
    /// # Errors
    ///
    /// - [Overflow] if either translation overflows.
    pub fn from_instant(instant: Instant) -> Result<Self, Overflow> {
        Self::from_tai(TaiInstant::from_instant(instant)?)
    }

    /// The inverse of [MispInstant::from_instant].
    ///
    /// # Errors
    ///
    /// - [Overflow] if either translation overflows.
    pub fn to_instant(&self) -> Result<Instant, Overflow> {
        self.to_tai()?.to_instant()
    }

    /// Returns the whole seconds since the MISP epoch, which carry the sign
    /// of the instant.
    pub fn misp_seconds(&self) -> i64 {
        self.misp_seconds
    }

    /// Returns the nanoseconds since the last whole second, always in
    /// `[0, 10^9)`.
    pub fn nano(&self) -> u32 {
        self.nano
    }

    /// Returns a copy of this instant with the given count of whole seconds.
    pub fn with_misp_seconds(&self, misp_seconds: i64) -> Self {
        Self {
            misp_seconds,
            nano: self.nano,
        }
    }

    /// Returns a copy of this instant with the given nanosecond-of-second.
    ///
    /// # Errors
    ///
    /// - [InvalidNano] if `nano` is not in `[0, 10^9)`.
    pub fn with_nano(&self, nano: u32) -> Result<Self, InvalidNano> {
        if nano as i64 >= NANOS_PER_SECOND {
            return Err(InvalidNano(nano as i64));
        }
        Ok(Self {
            misp_seconds: self.misp_seconds,
            nano,
        })
    }

    /// Returns this instant advanced by `delta`.
    ///
    /// # Errors
    ///
    /// - [Overflow] if the seconds count overflows.
    pub fn checked_add(&self, delta: TimeDelta) -> Result<Self, Overflow> {
        let seconds = self
            .misp_seconds
            .checked_add(delta.seconds())
            .ok_or(Overflow)?;
        Self::from_misp_seconds(seconds, self.nano as i64 + delta.nano() as i64)
    }

    /// Returns this instant moved back by `delta`.
    ///
    /// # Errors
    ///
    /// - [Overflow] if the seconds count overflows.
    pub fn checked_sub(&self, delta: TimeDelta) -> Result<Self, Overflow> {
        let seconds = self
            .misp_seconds
            .checked_sub(delta.seconds())
            .ok_or(Overflow)?;
        Self::from_misp_seconds(seconds, self.nano as i64 - delta.nano() as i64)
    }

    /// Returns the signed duration from this instant to `other`.
    ///
    /// # Errors
    ///
    /// - [Overflow] if the difference exceeds the representable range.
    pub fn duration_until(&self, other: MispInstant) -> Result<TimeDelta, Overflow> {
        let seconds = other
            .misp_seconds
            .checked_sub(self.misp_seconds)
            .ok_or(Overflow)?;
        TimeDelta::normalized(seconds, other.nano as i64 - self.nano as i64)
    }

    pub fn is_before(&self, other: MispInstant) -> bool {
        *self < other
    }

    pub fn is_after(&self, other: MispInstant) -> bool {
        *self > other
    }

    /// Returns the big-endian framing of the instant: seconds followed by the
    /// nanosecond-of-second.
    pub fn to_be_bytes(&self) -> [u8; 12] {
        be_bytes(self.misp_seconds, self.nano)
    }

    /// Reconstructs a [MispInstant] from its big-endian framing.
    ///
    /// # Errors
    ///
    /// - [InvalidNano] if the nanosecond field is not in `[0, 10^9)`.
    pub fn from_be_bytes(bytes: [u8; 12]) -> Result<Self, InvalidNano> {
        let (misp_seconds, nano) = parts_from_be_bytes(bytes)?;
        Ok(Self { misp_seconds, nano })
    }
}

impl Display for MispInstant {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}s(MISP)", self.misp_seconds, self.nano)
    }
}

impl FromStr for MispInstant {
    type Err = ParseMispError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (misp_seconds, nano) =
            parse_scaled_instant(s, misp_regex()).ok_or_else(|| ParseMispError(s.to_owned()))?;
        Ok(Self { misp_seconds, nano })
    }
}

impl From<MispInstant> for (i64, u32) {
    fn from(misp: MispInstant) -> Self {
        (misp.misp_seconds, misp.nano)
    }
}

impl TryFrom<(i64, u32)> for MispInstant {
    type Error = InvalidNano;

    fn try_from((misp_seconds, nano): (i64, u32)) -> Result<Self, Self::Error> {
        if nano as i64 >= NANOS_PER_SECOND {
            return Err(InvalidNano(nano as i64));
        }
        Ok(Self { misp_seconds, nano })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_misp_epoch_is_the_documented_tai_instant() {
        let tai = MispInstant::default().to_tai().unwrap();
        assert_eq!(tai.tai_seconds(), MISP_EPOCH_TAI_SECONDS);
        assert_eq!(tai.nano(), MISP_EPOCH_TAI_NANOS);
        assert_eq!(Ok(MispInstant::default()), MispInstant::from_tai(tai));
    }

    #[rstest]
    #[case::carry_into_tai(
        MispInstant { misp_seconds: 0, nano: 999_999_990 },
        TaiInstant::from_tai_seconds(MISP_EPOCH_TAI_SECONDS + 1, 81_990).unwrap(),
    )]
    #[case::plain(
        MispInstant { misp_seconds: 100, nano: 0 },
        TaiInstant::from_tai_seconds(MISP_EPOCH_TAI_SECONDS + 100, 82_000).unwrap(),
    )]
    fn test_misp_to_tai(#[case] misp: MispInstant, #[case] expected: TaiInstant) {
        assert_eq!(Ok(expected), misp.to_tai());
        assert_eq!(Ok(misp), MispInstant::from_tai(expected));
    }

    #[test]
    fn test_misp_from_tai_borrows_across_the_epoch() {
        let tai = TaiInstant::from_tai_seconds(MISP_EPOCH_TAI_SECONDS, 81_999).unwrap();
        let misp = MispInstant::from_tai(tai).unwrap();
        assert_eq!(misp, MispInstant { misp_seconds: -1, nano: 999_999_999 });
    }

    #[test]
    fn test_misp_epoch_in_utc() {
        // MISP zero is 1970-01-01T00:00:08.000082 on the TAI clock, which is
        // still inside 1969-12-31 UTC under the base offset of ten seconds.
        let utc = MispInstant::default().to_utc().unwrap();
        assert_eq!(utc.to_string(), "1969-12-31T23:59:58.000082Z");
        assert_eq!(Ok(MispInstant::default()), MispInstant::from_utc(utc));
    }

    #[rstest]
    #[case(MispInstant { misp_seconds: 2, nano: 3 }, "2.000000003s(MISP)")]
    #[case(MispInstant { misp_seconds: -2, nano: 1 }, "-2.000000001s(MISP)")]
    fn test_misp_display(#[case] misp: MispInstant, #[case] expected: &str) {
        assert_eq!(expected, misp.to_string());
    }

    #[rstest]
    #[case::canonical("2.000000003s(MISP)", Ok(MispInstant { misp_seconds: 2, nano: 3 }))]
    #[case::wrong_scale("2.000000003s(TAI)", Err(ParseMispError("2.000000003s(TAI)".to_string())))]
    #[case::leading_plus("+2.000000003s(MISP)", Err(ParseMispError("+2.000000003s(MISP)".to_string())))]
    #[case::eight_nano_digits("2.00000003s(MISP)", Err(ParseMispError("2.00000003s(MISP)".to_string())))]
    fn test_misp_parse(#[case] s: &str, #[case] expected: Result<MispInstant, ParseMispError>) {
        assert_eq!(expected, s.parse());
    }

    #[test]
    fn test_misp_arithmetic_matches_tai() {
        let misp = MispInstant { misp_seconds: 5, nano: 900_000_000 };
        let delta = TimeDelta::normalized(2, 200_000_000).unwrap();
        let shifted = misp.checked_add(delta).unwrap();
        assert_eq!(shifted, MispInstant { misp_seconds: 8, nano: 100_000_000 });
        assert_eq!(Ok(misp), shifted.checked_sub(delta));

        let via_tai = MispInstant::from_tai(misp.to_tai().unwrap().checked_add(delta).unwrap());
        assert_eq!(Ok(shifted), via_tai);
    }

    #[test]
    fn test_misp_duration_until() {
        let earlier = MispInstant { misp_seconds: 0, nano: 2 };
        let later = MispInstant { misp_seconds: 0, nano: 0 };
        let delta = earlier.duration_until(later).unwrap();
        assert_eq!(delta.seconds(), -1);
        assert_eq!(delta.nano(), 999_999_998);
        assert!(earlier.is_after(later));
        assert!(later.is_before(earlier));
    }

    #[test]
    fn test_misp_be_bytes_roundtrip() {
        let misp = MispInstant { misp_seconds: 42, nano: 82_000 };
        assert_eq!(Ok(misp), MispInstant::from_be_bytes(misp.to_be_bytes()));
    }

    proptest! {
        #[test]
        fn prop_misp_parse_display_roundtrip(seconds in any::<i64>(), nano in 0u32..1_000_000_000) {
            let misp = MispInstant { misp_seconds: seconds, nano };
            prop_assert_eq!(Ok(misp), misp.to_string().parse());
        }

        #[test]
        fn prop_misp_tai_roundtrip(seconds in -1_000_000_000_000i64..1_000_000_000_000, nano in 0u32..1_000_000_000) {
            let misp = MispInstant { misp_seconds: seconds, nano };
            prop_assert_eq!(Ok(misp), MispInstant::from_tai(misp.to_tai().unwrap()));
        }
    }
}
