/*
 * Copyright (c) 2025. The misp-time contributors
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, you can obtain one at https://mozilla.org/MPL/2.0/.
 */

/*!
    `misp-time` models three monotonic time scales and the conversions
    between them with exact nanosecond arithmetic:

    - [TaiInstant], a point on International Atomic Time;
    - [UtcInstant], a point on civil UTC with full leap second support,
      represented as a Modified Julian Day and a nanosecond-of-day;
    - [MispInstant], a point on the mission scale, a constant offset from TAI.

    A fourth type, [Instant], is the bridge to external systems: a
    leap-second-free Unix-epoch point with nanosecond precision.

    # Conversion graph

    TAI is the hub. UTC reaches TAI through the leap second rules
    ([utc::leap_seconds::UtcRules]); the [Instant] bridge to TAI is a constant
    epoch translation; MISP is a constant offset from TAI. Converting between
    [Instant] and [UtcInstant] applies the Smoothed Leap Second mapping on
    leap-second-bearing days so that the leap-second-free scale stays
    continuous and monotone.

    # Arithmetic

    All instants are immutable values over `i64` seconds and a canonical
    nanosecond-of-second in `[0, 10^9)`. Every constructor and arithmetic
    operation normalises through the same carry/borrow primitive and reports
    [deltas::Overflow] instead of wrapping or saturating.

    # Leap second table

    The process-wide [utc::leap_seconds::SystemUtcRules] singleton is
    initialised from an embedded copy of the canonical leap second list and
    can be extended at runtime with
    [utc::leap_seconds::SystemUtcRules::register].
*/

pub mod calendar_dates;
#[cfg(feature = "chrono")]
pub mod chrono;
pub mod constants;
pub mod deltas;
pub mod instant;
pub mod misp;
pub mod prelude;
pub mod tai;
pub mod utc;

pub use deltas::TimeDelta;
pub use instant::Instant;
pub use misp::MispInstant;
pub use tai::TaiInstant;
pub use utc::UtcInstant;
