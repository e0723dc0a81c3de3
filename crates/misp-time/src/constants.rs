/*
 * Copyright (c) 2025. The misp-time contributors
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Module `constants` centralises the named integer constants shared by all
//! time scales in the crate.

pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

pub const SECONDS_PER_DAY: i64 = 86_400;

/// Length of a leap-second-free day in nanoseconds.
pub const NANOS_PER_DAY: i64 = SECONDS_PER_DAY * NANOS_PER_SECOND;

/// 1970-01-01 as a Modified Julian Day.
pub const MJD_UNIX_EPOCH: i64 = 40_587;

/// 1958-01-01, the TAI epoch, as a Modified Julian Day.
pub const MJD_TAI_EPOCH: i64 = 36_204;

/// TAI - UTC in force before the first entry of the leap second table.
pub const TAI_BASE_OFFSET: i64 = 10;

/// Whole days between the TAI epoch and the Unix epoch, in seconds.
pub const TAI_TO_UNIX_EPOCH_SECONDS: i64 = (MJD_UNIX_EPOCH - MJD_TAI_EPOCH) * SECONDS_PER_DAY;

/// TAI seconds at the Unix epoch on the leap-second-free bridge.
///
/// The bridge between [crate::TaiInstant] and [crate::Instant] is a constant
/// translation by this value. It never consults the leap second table; leap
/// seconds are absorbed on the [crate::UtcInstant] side of the conversion
/// graph.
pub const UNIX_EPOCH_TAI_SECONDS: i64 = TAI_TO_UNIX_EPOCH_SECONDS + TAI_BASE_OFFSET;

/// Whole seconds of the TAI instant representing MISP zero.
pub const MISP_EPOCH_TAI_SECONDS: i64 = 378_691_208;

/// Nanosecond-of-second of the TAI instant representing MISP zero.
pub const MISP_EPOCH_TAI_NANOS: u32 = 82_000;
