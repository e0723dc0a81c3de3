/*
 * Copyright (c) 2025. The misp-time contributors
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, you can obtain one at https://mozilla.org/MPL/2.0/.
 */

/*!
    Module `tai` exposes [TaiInstant], a point on the International Atomic
    Time scale.

    TAI is the hub of the crate's conversion graph: UTC reaches the other
    scales through the leap second rules, the external [Instant] scale through
    a constant epoch translation, and MISP through a constant offset from TAI.
*/

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::constants::{NANOS_PER_SECOND, UNIX_EPOCH_TAI_SECONDS};
use crate::deltas::{normalize, InvalidNano, Overflow, TimeDelta};
use crate::instant::{be_bytes, parts_from_be_bytes, Instant};
use crate::misp::MispInstant;
use crate::utc::leap_seconds::{SystemUtcRules, UtcRules};
use crate::utc::UtcInstant;

fn tai_regex() -> &'static Regex {
    static TAI: OnceLock<Regex> = OnceLock::new();
    TAI.get_or_init(|| Regex::new(r"^(?<seconds>-?[0-9]+)\.(?<nano>[0-9]{9})s\(TAI\)$").unwrap())
}

/// Parses the shared `<seconds>.<nine digit nano>s(<scale>)` grammar of the
/// TAI and MISP textual forms.
pub(crate) fn parse_scaled_instant(s: &str, regex: &Regex) -> Option<(i64, u32)> {
    let caps = regex.captures(s)?;
    let seconds = caps["seconds"].parse().ok()?;
    let nano = caps["nano"].parse().ok()?;
    Some((seconds, nano))
}

/// Error type returned when parsing an invalid TAI instant string.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid TAI instant string `{0}`")]
pub struct ParseTaiError(pub String);

/// A point on the TAI scale with nanosecond precision.
///
/// The count of seconds is relative to the TAI epoch 1958-01-01T00:00:00,
/// with the nanosecond-of-second always in `[0, 10^9)`. The value is
/// `tai_seconds + nano / 10^9`, so an instant one nanosecond before the epoch
/// is represented as -1 s and 999999999 ns.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "(i64, u32)", into = "(i64, u32)"))]
pub struct TaiInstant {
    tai_seconds: i64,
    nano: u32,
}

impl TaiInstant {
    /// Constructs a [TaiInstant] from a count of TAI seconds and an arbitrary
    /// signed nanosecond adjustment.
    ///
    /// # Errors
    ///
    /// - [Overflow] if applying the adjustment overflows the seconds count.
    pub fn from_tai_seconds(tai_seconds: i64, nano_adjustment: i64) -> Result<Self, Overflow> {
        let (tai_seconds, nano) = normalize(tai_seconds, nano_adjustment)?;
        Ok(Self { tai_seconds, nano })
    }

    pub(crate) const fn from_parts(tai_seconds: i64, nano: u32) -> Self {
        Self { tai_seconds, nano }
    }

    /// Translates an [Instant] to the TAI scale by the constant epoch offset.
    ///
    /// The translation never consults the leap second table; leap seconds are
    /// absorbed on the UTC side of the conversion graph, which keeps this
    /// bridge a bijection.
    ///
    /// # Errors
    ///
    /// - [Overflow] if the TAI seconds count is not representable.
    pub fn from_instant(instant: Instant) -> Result<Self, Overflow> {
        let tai_seconds = instant
            .unix_seconds()
            .checked_add(UNIX_EPOCH_TAI_SECONDS)
            .ok_or(Overflow)?;
        Ok(Self {
            tai_seconds,
            nano: instant.nano(),
        })
    }

    /// The inverse of [TaiInstant::from_instant].
    ///
    /// # Errors
    ///
    /// - [Overflow] if the Unix seconds count is not representable.
    pub fn to_instant(&self) -> Result<Instant, Overflow> {
        let unix_seconds = self
            .tai_seconds
            .checked_sub(UNIX_EPOCH_TAI_SECONDS)
            .ok_or(Overflow)?;
        Ok(Instant::from_parts(unix_seconds, self.nano))
    }

    /// Converts a UTC instant to TAI using the process-wide leap second rules.
    ///
    /// # Errors
    ///
    /// - [Overflow] if the TAI seconds count is not representable.
    pub fn from_utc(utc: UtcInstant) -> Result<Self, Overflow> {
        Self::from_utc_with_rules(utc, &SystemUtcRules)
    }

    /// Converts a UTC instant to TAI using the given rules.
    pub fn from_utc_with_rules(utc: UtcInstant, rules: &impl UtcRules) -> Result<Self, Overflow> {
        rules.convert_utc_to_tai(utc)
    }

    /// Converts the instant to UTC using the process-wide leap second rules.
    pub fn to_utc(&self) -> UtcInstant {
        self.to_utc_with_rules(&SystemUtcRules)
    }

    /// Converts the instant to UTC using the given rules.
    pub fn to_utc_with_rules(&self, rules: &impl UtcRules) -> UtcInstant {
        rules.convert_tai_to_utc(*self)
    }

    /// Translates the instant to the MISP scale.
    ///
    /// # Errors
    ///
    /// - [Overflow] if the MISP seconds count is not representable.
    pub fn to_misp(&self) -> Result<MispInstant, Overflow> {
        MispInstant::from_tai(*self)
    }

    pub fn from_misp(misp: MispInstant) -> Result<Self, Overflow> {
        misp.to_tai()
    }

    /// Returns the whole seconds since the TAI epoch, which carry the sign of
    /// the instant.
    pub fn tai_seconds(&self) -> i64 {
        self.tai_seconds
    }

    /// Returns the nanoseconds since the last whole second, always in
    /// `[0, 10^9)`.
    pub fn nano(&self) -> u32 {
        self.nano
    }

    /// Returns a copy of this instant with the given count of whole seconds.
    pub fn with_tai_seconds(&self, tai_seconds: i64) -> Self {
        Self {
            tai_seconds,
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
            tai_seconds: self.tai_seconds,
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
            .tai_seconds
            .checked_add(delta.seconds())
            .ok_or(Overflow)?;
        let (tai_seconds, nano) = normalize(seconds, self.nano as i64 + delta.nano() as i64)?;
        Ok(Self { tai_seconds, nano })
    }

    /// Returns this instant moved back by `delta`.
    ///
    /// # Errors
    ///
    /// - [Overflow] if the seconds count overflows.
    pub fn checked_sub(&self, delta: TimeDelta) -> Result<Self, Overflow> {
        let seconds = self
            .tai_seconds
            .checked_sub(delta.seconds())
            .ok_or(Overflow)?;
        let (tai_seconds, nano) = normalize(seconds, self.nano as i64 - delta.nano() as i64)?;
        Ok(Self { tai_seconds, nano })
    }

    /// Returns the signed duration from this instant to `other`.
    ///
    /// The result is negative if `other` is earlier, with the nanosecond
    /// component still canonical: two nanoseconds into the past is -1 s and
    /// 999999998 ns.
    ///
    /// # Errors
    ///
    /// - [Overflow] if the difference exceeds the representable range.
    pub fn duration_until(&self, other: TaiInstant) -> Result<TimeDelta, Overflow> {
        let seconds = other
            .tai_seconds
            .checked_sub(self.tai_seconds)
            .ok_or(Overflow)?;
        TimeDelta::normalized(seconds, other.nano as i64 - self.nano as i64)
    }

    pub fn is_before(&self, other: TaiInstant) -> bool {
        *self < other
    }

    pub fn is_after(&self, other: TaiInstant) -> bool {
        *self > other
    }

    /// Returns the big-endian framing of the instant: seconds followed by the
    /// nanosecond-of-second.
    pub fn to_be_bytes(&self) -> [u8; 12] {
        be_bytes(self.tai_seconds, self.nano)
    }

    /// Reconstructs a [TaiInstant] from its big-endian framing.
    ///
    /// # Errors
    ///
    /// - [InvalidNano] if the nanosecond field is not in `[0, 10^9)`.
    pub fn from_be_bytes(bytes: [u8; 12]) -> Result<Self, InvalidNano> {
        let (tai_seconds, nano) = parts_from_be_bytes(bytes)?;
        Ok(Self { tai_seconds, nano })
    }
}

impl Display for TaiInstant {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}s(TAI)", self.tai_seconds, self.nano)
    }
}

impl FromStr for TaiInstant {
    type Err = ParseTaiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (tai_seconds, nano) =
            parse_scaled_instant(s, tai_regex()).ok_or_else(|| ParseTaiError(s.to_owned()))?;
        Ok(Self { tai_seconds, nano })
    }
}

impl From<TaiInstant> for (i64, u32) {
    fn from(tai: TaiInstant) -> Self {
        (tai.tai_seconds, tai.nano)
    }
}

impl TryFrom<(i64, u32)> for TaiInstant {
    type Error = InvalidNano;

    fn try_from((tai_seconds, nano): (i64, u32)) -> Result<Self, Self::Error> {
        TaiInstant::from_parts(tai_seconds, 0).with_nano(nano)
    }
}
