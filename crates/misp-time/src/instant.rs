/*
 * Copyright (c) 2025. The misp-time contributors
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, you can obtain one at https://mozilla.org/MPL/2.0/.
 */

/*!
    Module `instant` exposes [Instant], a nanosecond-precision point on the
    leap-second-free Unix scale.

    [Instant] is the crate's bridge to external systems that have no notion of
    leap seconds. Its conversion to [crate::TaiInstant] is a constant
    translation; its conversion to [crate::UtcInstant] passes through the
    Smoothed Leap Second mapping of [crate::utc::leap_seconds::UtcRules] so
    that leap-second-bearing days round-trip continuously.
*/

use std::fmt::{self, Display, Formatter};

use crate::calendar_dates::Date;
use crate::constants::{MJD_UNIX_EPOCH, NANOS_PER_SECOND, SECONDS_PER_DAY};
use crate::deltas::{normalize, InvalidNano, Overflow};
use crate::misp::MispInstant;
use crate::tai::TaiInstant;
use crate::utc::leap_seconds::{SystemUtcRules, UtcRules};
use crate::utc::UtcInstant;

/// A point on the leap-second-free Unix scale with nanosecond precision.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "(i64, u32)", into = "(i64, u32)"))]
pub struct Instant {
    unix_seconds: i64,
    nano: u32,
}

impl Instant {
    /// Constructs an [Instant] from a count of Unix seconds and an arbitrary
    /// signed nanosecond adjustment.
    ///
    /// # Errors
    ///
    /// - [Overflow] if applying the adjustment overflows the seconds count.
    pub fn from_unix_seconds(unix_seconds: i64, nano_adjustment: i64) -> Result<Self, Overflow> {
        let (unix_seconds, nano) = normalize(unix_seconds, nano_adjustment)?;
        Ok(Self { unix_seconds, nano })
    }

    pub(crate) const fn from_parts(unix_seconds: i64, nano: u32) -> Self {
        Self { unix_seconds, nano }
    }

    /// Returns the whole seconds since 1970-01-01T00:00:00 on the
    /// leap-second-free scale.
    pub fn unix_seconds(&self) -> i64 {
        self.unix_seconds
    }

    /// Returns the nanoseconds since the last whole second, always in
    /// `[0, 10^9)`.
    pub fn nano(&self) -> u32 {
        self.nano
    }

    /// Translates the instant to the TAI scale by the constant epoch offset.
    ///
    /// # Errors
    ///
    /// - [Overflow] if the TAI seconds count is not representable.
    pub fn to_tai(&self) -> Result<TaiInstant, Overflow> {
        TaiInstant::from_instant(*self)
    }

    pub fn from_tai(tai: TaiInstant) -> Result<Self, Overflow> {
        tai.to_instant()
    }

    /// Translates the instant to the MISP scale via TAI.
    ///
    /// # Errors
    ///
    /// - [Overflow] if either translation overflows.
    pub fn to_misp(&self) -> Result<MispInstant, Overflow> {
        MispInstant::from_instant(*self)
    }

    pub fn from_misp(misp: MispInstant) -> Result<Self, Overflow> {
        misp.to_instant()
    }

    /// Converts the instant to UTC using the process-wide leap second rules.
    pub fn to_utc(&self) -> UtcInstant {
        self.to_utc_with_rules(&SystemUtcRules)
    }

    /// Converts the instant to UTC using the given rules.
    pub fn to_utc_with_rules(&self, rules: &impl UtcRules) -> UtcInstant {
        rules.convert_instant_to_utc(*self)
    }

    pub fn from_utc(utc: UtcInstant) -> Result<Self, Overflow> {
        utc.to_instant()
    }

    /// Returns the big-endian framing of the instant: seconds followed by the
    /// nanosecond-of-second.
    pub fn to_be_bytes(&self) -> [u8; 12] {
        be_bytes(self.unix_seconds, self.nano)
    }

    /// Reconstructs an [Instant] from its big-endian framing.
    ///
    /// # Errors
    ///
    /// - [InvalidNano] if the nanosecond field is not in `[0, 10^9)`.
    pub fn from_be_bytes(bytes: [u8; 12]) -> Result<Self, InvalidNano> {
        let (unix_seconds, nano) = parts_from_be_bytes(bytes)?;
        Ok(Self { unix_seconds, nano })
    }
}

impl Display for Instant {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let date = Date::from_modified_julian_day(
            self.unix_seconds.div_euclid(SECONDS_PER_DAY) + MJD_UNIX_EPOCH,
        );
        let second_of_day = self.unix_seconds.rem_euclid(SECONDS_PER_DAY);
        write!(
            f,
            "{}T{:02}:{:02}:{:02}",
            date,
            second_of_day / 3600,
            second_of_day / 60 % 60,
            second_of_day % 60,
        )?;
        write_second_fraction(f, self.nano as i64)?;
        f.write_str("Z")
    }
}

impl From<Instant> for (i64, u32) {
    fn from(instant: Instant) -> Self {
        (instant.unix_seconds, instant.nano)
    }
}

impl TryFrom<(i64, u32)> for Instant {
    type Error = InvalidNano;

    fn try_from((unix_seconds, nano): (i64, u32)) -> Result<Self, Self::Error> {
        if nano as i64 >= NANOS_PER_SECOND {
            return Err(InvalidNano(nano as i64));
        }
        Ok(Self { unix_seconds, nano })
    }
}

/// Writes `nano` as a second fraction in the shortest of the 3, 6 or 9 digit
/// groups that renders it exactly.
pub(crate) fn write_second_fraction(f: &mut Formatter<'_>, nano: i64) -> fmt::Result {
    if nano == 0 {
        Ok(())
    } else if nano % 1_000_000 == 0 {
        write!(f, ".{:03}", nano / 1_000_000)
    } else if nano % 1_000 == 0 {
        write!(f, ".{:06}", nano / 1_000)
    } else {
        write!(f, ".{:09}", nano)
    }
}

pub(crate) fn be_bytes(seconds: i64, nano: u32) -> [u8; 12] {
    let mut bytes = [0; 12];
    bytes[..8].copy_from_slice(&seconds.to_be_bytes());
    bytes[8..].copy_from_slice(&nano.to_be_bytes());
    bytes
}

pub(crate) fn parts_from_be_bytes(bytes: [u8; 12]) -> Result<(i64, u32), InvalidNano> {
    let mut seconds = [0; 8];
    seconds.copy_from_slice(&bytes[..8]);
    let mut nano = [0; 4];
    nano.copy_from_slice(&bytes[8..]);
    let seconds = i64::from_be_bytes(seconds);
    let nano = u32::from_be_bytes(nano);
    if nano as i64 >= NANOS_PER_SECOND {
        return Err(InvalidNano(nano as i64));
    }
    Ok((seconds, nano))
}
