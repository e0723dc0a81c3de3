/*
 * Copyright (c) 2025. The misp-time contributors
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, you can obtain one at https://mozilla.org/MPL/2.0/.
 */

/*!
    Module `leap_seconds` exposes [UtcRules], the policy object governing all
    conversions between UTC and the continuous scales, and [SystemUtcRules],
    the process-wide singleton backed by the embedded leap second table.

    The table is held as an immutable snapshot behind a writer-side lock.
    Queries and conversions operate on a single snapshot, so readers always
    observe a fully consistent table; [SystemUtcRules::register] validates a
    new entry, builds the next snapshot and swaps it in atomically.

    The bridge to the leap-second-free [Instant] scale uses the Smoothed Leap
    Second (SLS) mapping: on a day bearing a leap second the final stretch of
    the UTC day is scaled linearly so that it spans the final 1000 seconds of
    the external day. The mapping is continuous and monotone; its inverse is
    exact only to within one nanosecond inside the smoothing window.
*/

use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use itertools::Itertools;
use thiserror::Error;

use crate::constants::{
    MJD_TAI_EPOCH, MJD_UNIX_EPOCH, NANOS_PER_DAY, NANOS_PER_SECOND, SECONDS_PER_DAY,
    TAI_BASE_OFFSET,
};
use crate::deltas::Overflow;
use crate::instant::Instant;
use crate::tai::TaiInstant;
use crate::utc::UtcInstant;

/// Number of external-scale seconds over which a leap second is smoothed.
const SLS_WINDOW_SECONDS: i64 = 1_000;

/// Error type returned when registering a leap second or parsing leap second
/// table data fails.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LeapSecondError {
    #[error("leap second adjustment must be -1 or +1 but was {0}")]
    InvalidAdjustment(i32),
    #[error("modified Julian day {mjd} is already registered with adjustment {registered}")]
    AdjustmentConflict { mjd: i64, registered: i32 },
    #[error("leap seconds must be registered in date order but modified Julian day {mjd} is not after {latest}")]
    OutOfOrder { mjd: i64, latest: i64 },
    #[error("invalid leap second table line `{0}`")]
    InvalidTableLine(String),
    #[error("leap second table must open at the base TAI offset of 10 but was {0}")]
    InvalidBaseOffset(i32),
    #[error("leap second table contains no entries")]
    EmptyTable,
}

/// The policy object governing the bijection between UTC days and TAI
/// seconds.
///
/// Implementations provide the leap second queries; every conversion is
/// derived from them. The queries are keyed by Modified Julian Day, where an
/// entry's day is the day *bearing* the leap second: the day's length is
/// `86400 + adjustment` seconds and the TAI offset changes from the start of
/// the following day.
pub trait UtcRules {
    /// Returns +1 or -1 if `mjd` bears a leap second, and 0 otherwise.
    fn leap_second_adjustment(&self, mjd: i64) -> i32;

    /// Returns TAI - UTC in whole seconds as in force during day `mjd`.
    ///
    /// The offset counts the adjustments of all leap seconds borne by days
    /// strictly before `mjd`, on top of the base offset of 10; the adjustment
    /// of `mjd` itself only takes effect on the following day.
    fn tai_offset(&self, mjd: i64) -> i32;

    /// Returns the days bearing a leap second, in ascending order.
    fn leap_second_dates(&self) -> Vec<i64>;

    /// Returns the length of UTC day `mjd` in nanoseconds.
    fn nanos_per_day(&self, mjd: i64) -> i64 {
        (SECONDS_PER_DAY + self.leap_second_adjustment(mjd) as i64) * NANOS_PER_SECOND
    }

    /// Converts a UTC instant to TAI.
    ///
    /// # Errors
    ///
    /// - [Overflow] if the TAI seconds count is not representable.
    fn convert_utc_to_tai(&self, utc: UtcInstant) -> Result<TaiInstant, Overflow> {
        let tai_seconds = (utc.modified_julian_day() as i128 - MJD_TAI_EPOCH as i128)
            * SECONDS_PER_DAY as i128
            + self.tai_offset(utc.modified_julian_day()) as i128
            + (utc.nano_of_day() / NANOS_PER_SECOND) as i128;
        let tai_seconds = i64::try_from(tai_seconds).map_err(|_| Overflow)?;
        TaiInstant::from_tai_seconds(tai_seconds, utc.nano_of_day() % NANOS_PER_SECOND)
    }

    /// Converts a TAI instant to UTC.
    ///
    /// Instants before the first modelled day convert with the constant base
    /// offset of 10.
    fn convert_tai_to_utc(&self, tai: TaiInstant) -> UtcInstant {
        let position = tai.tai_seconds() as i128 * NANOS_PER_SECOND as i128 + tai.nano() as i128;
        utc_at_linear_nanos(self, position).unwrap_or_else(|_| {
            unreachable!("every TAI instant maps to a representable modified Julian day")
        })
    }

    /// Converts a UTC instant to the leap-second-free [Instant] scale,
    /// applying the SLS mapping on days bearing a leap second.
    ///
    /// # Errors
    ///
    /// - [Overflow] if the Unix seconds count is not representable.
    fn convert_utc_to_instant(&self, utc: UtcInstant) -> Result<Instant, Overflow> {
        let adjustment = self.leap_second_adjustment(utc.modified_julian_day()) as i64;
        let sls_nanos = sls_from_utc_nanos(utc.nano_of_day(), adjustment);
        let unix_seconds = (utc.modified_julian_day() as i128 - MJD_UNIX_EPOCH as i128)
            * SECONDS_PER_DAY as i128
            + (sls_nanos / NANOS_PER_SECOND) as i128;
        let unix_seconds = i64::try_from(unix_seconds).map_err(|_| Overflow)?;
        Ok(Instant::from_parts(
            unix_seconds,
            (sls_nanos % NANOS_PER_SECOND) as u32,
        ))
    }

    /// Converts an [Instant] to UTC, applying the inverse SLS mapping on days
    /// bearing a leap second.
    ///
    /// The inverse is exact only to within one nanosecond inside the
    /// smoothing window.
    fn convert_instant_to_utc(&self, instant: Instant) -> UtcInstant {
        let mjd = instant.unix_seconds().div_euclid(SECONDS_PER_DAY) + MJD_UNIX_EPOCH;
        let sls_nanos = instant.unix_seconds().rem_euclid(SECONDS_PER_DAY) * NANOS_PER_SECOND
            + instant.nano() as i64;
        let adjustment = self.leap_second_adjustment(mjd) as i64;
        UtcInstant::from_parts(mjd, utc_from_sls_nanos(sls_nanos, adjustment))
    }
}

/// Nanosecond-of-day at which the smoothing window opens on a day with the
/// given adjustment. The value is shared by the UTC and external scales,
/// which coincide at the window's start.
fn sls_start_nanos(adjustment: i64) -> i64 {
    (SECONDS_PER_DAY + adjustment - SLS_WINDOW_SECONDS) * NANOS_PER_SECOND
}

/// Maps a UTC nanosecond-of-day to the external scale. Identity outside the
/// smoothing window; inside it, the remaining `1000 + adjustment` UTC seconds
/// are scaled onto the remaining `1000` external seconds.
fn sls_from_utc_nanos(utc_nanos: i64, adjustment: i64) -> i64 {
    if adjustment == 0 {
        return utc_nanos;
    }
    let start = sls_start_nanos(adjustment);
    if utc_nanos < start {
        return utc_nanos;
    }
    start + (utc_nanos - start) * (SLS_WINDOW_SECONDS - adjustment) / SLS_WINDOW_SECONDS
}

/// The inverse of [sls_from_utc_nanos], lossy by up to one nanosecond inside
/// the smoothing window.
fn utc_from_sls_nanos(sls_nanos: i64, adjustment: i64) -> i64 {
    if adjustment == 0 {
        return sls_nanos;
    }
    let start = sls_start_nanos(adjustment);
    if sls_nanos < start {
        return sls_nanos;
    }
    start + (sls_nanos - start) * SLS_WINDOW_SECONDS / (SLS_WINDOW_SECONDS - adjustment)
}

/// Nanoseconds on the linear TAI axis at which UTC day `mjd` begins. The day
/// argument is widened so that callers can probe past both ends of the `i64`
/// range.
pub(crate) fn day_start_nanos<R: UtcRules + ?Sized>(rules: &R, mjd: i128) -> i128 {
    let offset = if mjd > i64::MAX as i128 {
        rules.tai_offset(i64::MAX) + rules.leap_second_adjustment(i64::MAX)
    } else if mjd < i64::MIN as i128 {
        rules.tai_offset(i64::MIN)
    } else {
        rules.tai_offset(mjd as i64)
    };
    (mjd - MJD_TAI_EPOCH as i128) * NANOS_PER_DAY as i128
        + offset as i128 * NANOS_PER_SECOND as i128
}

/// Re-normalises a position on the linear TAI axis to the UTC day containing
/// it and the nanosecond-of-day within it.
///
/// The initial estimate ignores the TAI offset and is corrected by walking
/// day starts; since offsets are tiny compared to a day the walk terminates
/// after a step or two.
pub(crate) fn utc_at_linear_nanos<R: UtcRules + ?Sized>(
    rules: &R,
    position: i128,
) -> Result<UtcInstant, Overflow> {
    let mut mjd = position.div_euclid(NANOS_PER_DAY as i128) + MJD_TAI_EPOCH as i128;
    while position < day_start_nanos(rules, mjd) {
        mjd -= 1;
    }
    while position >= day_start_nanos(rules, mjd + 1) {
        mjd += 1;
    }
    let nano_of_day = (position - day_start_nanos(rules, mjd)) as i64;
    let mjd = i64::try_from(mjd).map_err(|_| Overflow)?;
    Ok(UtcInstant::from_parts(mjd, nano_of_day))
}

/// An immutable leap second table: three parallel arrays keyed by the days
/// bearing a leap second.
///
/// `LeapSecondTable` implements [UtcRules], so a parsed table can be used
/// directly as an alternative to the process-wide [SystemUtcRules] — for
/// example to model hypothetical negative leap seconds in tests or analyses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeapSecondTable {
    mjds: Vec<i64>,
    adjustments: Vec<i32>,
    tai_offsets_after: Vec<i32>,
}

impl LeapSecondTable {
    /// Parses a leap second table from its textual form: one `<mjd> <offset>`
    /// pair per line, where `mjd` is the first day on which the TAI offset
    /// `offset` is in force. `#` opens a comment line.
    ///
    /// The first pair anchors the scale at the base offset of 10; each
    /// subsequent pair derives one leap second borne by the preceding day.
    ///
    /// # Errors
    ///
    /// - [LeapSecondError::InvalidTableLine] if a line is not a `<mjd>
    ///   <offset>` pair.
    /// - [LeapSecondError::InvalidBaseOffset] if the first offset is not 10.
    /// - [LeapSecondError::OutOfOrder] if the days are not strictly
    ///   increasing.
    /// - [LeapSecondError::InvalidAdjustment] if consecutive offsets differ
    ///   by anything but one second.
    /// - [LeapSecondError::EmptyTable] if no pairs are present.
    pub fn from_data(data: &str) -> Result<Self, LeapSecondError> {
        let mut mjds = Vec::new();
        let mut adjustments = Vec::new();
        let mut tai_offsets_after = Vec::new();
        let mut previous: Option<(i64, i32)> = None;
        for line in data.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((mjd, offset)) = line.split_whitespace().collect_tuple() else {
                return Err(LeapSecondError::InvalidTableLine(line.to_owned()));
            };
            let mjd: i64 = mjd
                .parse()
                .map_err(|_| LeapSecondError::InvalidTableLine(line.to_owned()))?;
            let offset: i32 = offset
                .parse()
                .map_err(|_| LeapSecondError::InvalidTableLine(line.to_owned()))?;
            match previous {
                None => {
                    if offset as i64 != TAI_BASE_OFFSET {
                        return Err(LeapSecondError::InvalidBaseOffset(offset));
                    }
                }
                Some((previous_mjd, previous_offset)) => {
                    if mjd <= previous_mjd {
                        return Err(LeapSecondError::OutOfOrder {
                            mjd: mjd - 1,
                            latest: previous_mjd - 1,
                        });
                    }
                    let adjustment = offset - previous_offset;
                    if adjustment != 1 && adjustment != -1 {
                        return Err(LeapSecondError::InvalidAdjustment(adjustment));
                    }
                    mjds.push(mjd - 1);
                    adjustments.push(adjustment);
                    tai_offsets_after.push(offset);
                }
            }
            previous = Some((mjd, offset));
        }
        if previous.is_none() {
            return Err(LeapSecondError::EmptyTable);
        }
        Ok(Self {
            mjds,
            adjustments,
            tai_offsets_after,
        })
    }

    fn builtin() -> Self {
        const BUILTIN: &str = include_str!("../../data/leap_seconds.txt");
        Self::from_data(BUILTIN)
            .unwrap_or_else(|err| unreachable!("builtin leap second table should parse: {}", err))
    }

    fn adjustment(&self, mjd: i64) -> i32 {
        match self.mjds.binary_search(&mjd) {
            Ok(index) => self.adjustments[index],
            Err(_) => 0,
        }
    }

    fn offset(&self, mjd: i64) -> i32 {
        let index = self.mjds.partition_point(|&m| m < mjd);
        if index == 0 {
            TAI_BASE_OFFSET as i32
        } else {
            self.tai_offsets_after[index - 1]
        }
    }

    fn with_registered(
        &self,
        mjd: i64,
        adjustment: i32,
    ) -> Result<Option<Self>, LeapSecondError> {
        if adjustment != 1 && adjustment != -1 {
            return Err(LeapSecondError::InvalidAdjustment(adjustment));
        }
        if let Ok(index) = self.mjds.binary_search(&mjd) {
            let registered = self.adjustments[index];
            if registered == adjustment {
                return Ok(None);
            }
            return Err(LeapSecondError::AdjustmentConflict { mjd, registered });
        }
        if let Some(&latest) = self.mjds.last() {
            if mjd < latest {
                return Err(LeapSecondError::OutOfOrder { mjd, latest });
            }
        }
        let mut table = self.clone();
        table.mjds.push(mjd);
        table.adjustments.push(adjustment);
        let offset = table
            .tai_offsets_after
            .last()
            .copied()
            .unwrap_or(TAI_BASE_OFFSET as i32)
            + adjustment;
        table.tai_offsets_after.push(offset);
        Ok(Some(table))
    }
}

impl UtcRules for LeapSecondTable {
    fn leap_second_adjustment(&self, mjd: i64) -> i32 {
        self.adjustment(mjd)
    }

    fn tai_offset(&self, mjd: i64) -> i32 {
        self.offset(mjd)
    }

    fn leap_second_dates(&self) -> Vec<i64> {
        self.mjds.clone()
    }
}

fn table_lock() -> &'static RwLock<Arc<LeapSecondTable>> {
    static TABLE: OnceLock<RwLock<Arc<LeapSecondTable>>> = OnceLock::new();
    TABLE.get_or_init(|| RwLock::new(Arc::new(LeapSecondTable::builtin())))
}

/// The process-wide leap second rules, initialised from the table embedded at
/// build time and extensible at runtime via [SystemUtcRules::register].
///
/// `SystemUtcRules` is a handle: every copy reads the same table, and each
/// query or conversion operates on one consistent snapshot of it.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SystemUtcRules;

impl SystemUtcRules {
    pub(crate) fn snapshot(&self) -> Arc<LeapSecondTable> {
        table_lock()
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Registers a leap second borne by day `mjd`, extending the table for
    /// the whole process.
    ///
    /// Registering an entry identical to an existing one is a no-op.
    /// Registration is additive and forward-only; a failed registration
    /// leaves the table untouched.
    ///
    /// # Errors
    ///
    /// - [LeapSecondError::InvalidAdjustment] if `adjustment` is not ±1.
    /// - [LeapSecondError::AdjustmentConflict] if `mjd` is registered with a
    ///   different adjustment.
    /// - [LeapSecondError::OutOfOrder] if `mjd` is before the latest
    ///   registered day.
    pub fn register(&self, mjd: i64, adjustment: i32) -> Result<(), LeapSecondError> {
        let mut guard = table_lock().write().unwrap_or_else(PoisonError::into_inner);
        if let Some(table) = guard.with_registered(mjd, adjustment)? {
            *guard = Arc::new(table);
        }
        Ok(())
    }
}

impl UtcRules for SystemUtcRules {
    fn leap_second_adjustment(&self, mjd: i64) -> i32 {
        self.snapshot().adjustment(mjd)
    }

    fn tai_offset(&self, mjd: i64) -> i32 {
        self.snapshot().offset(mjd)
    }

    fn leap_second_dates(&self) -> Vec<i64> {
        self.snapshot().mjds.clone()
    }

    // The conversions are overridden to run against a single snapshot, so a
    // concurrent registration cannot be observed halfway through a
    // conversion.
    fn nanos_per_day(&self, mjd: i64) -> i64 {
        self.snapshot().nanos_per_day(mjd)
    }

    fn convert_utc_to_tai(&self, utc: UtcInstant) -> Result<TaiInstant, Overflow> {
        self.snapshot().convert_utc_to_tai(utc)
    }

    fn convert_tai_to_utc(&self, tai: TaiInstant) -> UtcInstant {
        self.snapshot().convert_tai_to_utc(tai)
    }

    fn convert_utc_to_instant(&self, utc: UtcInstant) -> Result<Instant, Overflow> {
        self.snapshot().convert_utc_to_instant(utc)
    }

    fn convert_instant_to_utc(&self, instant: Instant) -> UtcInstant {
        self.snapshot().convert_instant_to_utc(instant)
    }
}
