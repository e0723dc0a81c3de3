/*
 * Copyright (c) 2025. The misp-time contributors
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, you can obtain one at https://mozilla.org/MPL/2.0/.
 */

/*!
    Module `deltas` contains [TimeDelta], the signed duration consumed by the
    instant types, and the nanosecond normalisation primitive on which every
    constructor and arithmetic operation in the crate is built.
*/

use std::ops::Neg;

use thiserror::Error;

use crate::constants::NANOS_PER_SECOND;

/// Error type returned when arithmetic on whole seconds exceeds the range of
/// an `i64`.
#[derive(Debug, Copy, Clone, Error, PartialEq, Eq)]
#[error("seconds count exceeds the representable range of an i64")]
pub struct Overflow;

/// Error type returned when a nanosecond-of-second component is outside
/// `[0, 999999999]`.
#[derive(Debug, Copy, Clone, Error, PartialEq, Eq)]
#[error("nano must be in the range [0, 999999999] but was {0}")]
pub struct InvalidNano(pub i64);

/// Normalises a count of whole seconds and an arbitrary signed nanosecond
/// adjustment to canonical form, with the nanosecond component in `[0, 10^9)`.
///
/// The adjustment is split by floor division, so a negative adjustment borrows
/// from the seconds. Borrow and carry are applied with checked arithmetic.
pub(crate) fn normalize(seconds: i64, nanos: i64) -> Result<(i64, u32), Overflow> {
    let carry = nanos.div_euclid(NANOS_PER_SECOND);
    let nano = nanos.rem_euclid(NANOS_PER_SECOND);
    let seconds = seconds.checked_add(carry).ok_or(Overflow)?;
    Ok((seconds, nano as u32))
}

/// A signed, nanosecond-precision difference between two instants on the same
/// time scale.
///
/// The value is `seconds + nano / 10^9` with `nano` in `[0, 10^9)`; the sign
/// is carried by `seconds` alone. A delta of -2 ns is therefore represented
/// as -1 s and 999999998 ns.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "(i64, u32)", into = "(i64, u32)"))]
pub struct TimeDelta {
    seconds: i64,
    nano: u32,
}

impl TimeDelta {
    /// Constructs a [TimeDelta] from canonical components.
    ///
    /// # Errors
    ///
    /// - [InvalidNano] if `nano` is not in `[0, 10^9)`.
    pub fn new(seconds: i64, nano: u32) -> Result<Self, InvalidNano> {
        if nano as i64 >= NANOS_PER_SECOND {
            return Err(InvalidNano(nano as i64));
        }
        Ok(Self { seconds, nano })
    }

    /// Constructs a [TimeDelta] from an integral number of seconds.
    pub const fn from_seconds(seconds: i64) -> Self {
        Self { seconds, nano: 0 }
    }

    /// Constructs a [TimeDelta] from a count of seconds and an arbitrary
    /// signed nanosecond adjustment.
    ///
    /// # Errors
    ///
    /// - [Overflow] if applying the adjustment overflows the seconds count.
    pub fn normalized(seconds: i64, nanos: i64) -> Result<Self, Overflow> {
        let (seconds, nano) = normalize(seconds, nanos)?;
        Ok(Self { seconds, nano })
    }

    /// Returns the whole seconds of the delta, which carry its sign.
    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    /// Returns the nanoseconds since the last whole second, always in
    /// `[0, 10^9)`.
    pub fn nano(&self) -> u32 {
        self.nano
    }

    pub fn is_negative(&self) -> bool {
        self.seconds < 0
    }

    pub fn is_zero(&self) -> bool {
        self.seconds == 0 && self.nano == 0
    }

    pub fn is_positive(&self) -> bool {
        self.seconds > 0 || self.seconds == 0 && self.nano > 0
    }
}

impl Neg for TimeDelta {
    type Output = Self;

    /// # Panics
    ///
    /// Negating a whole-second delta of `i64::MIN` seconds is not
    /// representable and panics.
    fn neg(self) -> Self::Output {
        if self.nano == 0 {
            return Self {
                seconds: -self.seconds,
                nano: 0,
            };
        }

        // `-1 - s` is `-(s + 1)` without the intermediate overflow at i64::MAX.
        Self {
            seconds: -1 - self.seconds,
            nano: NANOS_PER_SECOND as u32 - self.nano,
        }
    }
}

impl From<TimeDelta> for (i64, u32) {
    fn from(delta: TimeDelta) -> Self {
        (delta.seconds, delta.nano)
    }
}

impl TryFrom<(i64, u32)> for TimeDelta {
    type Error = InvalidNano;

    fn try_from((seconds, nano): (i64, u32)) -> Result<Self, Self::Error> {
        Self::new(seconds, nano)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::canonical(2, 3, Ok(TimeDelta { seconds: 2, nano: 3 }))]
    #[case::positive_carry(1, 1_500_000_000, Ok(TimeDelta { seconds: 2, nano: 500_000_000 }))]
    #[case::negative_borrow(2, -1, Ok(TimeDelta { seconds: 1, nano: 999_999_999 }))]
    #[case::multi_second_borrow(0, -2_000_000_001, Ok(TimeDelta { seconds: -3, nano: 999_999_999 }))]
    #[case::exact_second(0, 1_000_000_000, Ok(TimeDelta { seconds: 1, nano: 0 }))]
    #[case::min_adjustment(0, i64::MIN, Ok(TimeDelta { seconds: -9_223_372_037, nano: 145_224_192 }))]
    #[case::overflow_positive(i64::MAX, 1_000_000_000, Err(Overflow))]
    #[case::overflow_negative(i64::MIN, -1, Err(Overflow))]
    fn test_time_delta_normalized(
        #[case] seconds: i64,
        #[case] nanos: i64,
        #[case] expected: Result<TimeDelta, Overflow>,
    ) {
        assert_eq!(expected, TimeDelta::normalized(seconds, nanos));
    }

    #[rstest]
    #[case::valid(0, 999_999_999, Ok(TimeDelta { seconds: 0, nano: 999_999_999 }))]
    #[case::invalid(0, 1_000_000_000, Err(InvalidNano(1_000_000_000)))]
    fn test_time_delta_new(
        #[case] seconds: i64,
        #[case] nano: u32,
        #[case] expected: Result<TimeDelta, InvalidNano>,
    ) {
        assert_eq!(expected, TimeDelta::new(seconds, nano));
    }

    #[rstest]
    #[case::positive(TimeDelta::from_seconds(1), false, true, false)]
    #[case::negative(TimeDelta::from_seconds(-1), true, false, false)]
    #[case::zero(TimeDelta::from_seconds(0), false, false, true)]
    #[case::subsecond(TimeDelta { seconds: 0, nano: 1 }, false, true, false)]
    #[case::minus_one_nano(TimeDelta { seconds: -1, nano: 999_999_999 }, true, false, false)]
    fn test_time_delta_sign(
        #[case] delta: TimeDelta,
        #[case] negative: bool,
        #[case] positive: bool,
        #[case] zero: bool,
    ) {
        assert_eq!(negative, delta.is_negative());
        assert_eq!(positive, delta.is_positive());
        assert_eq!(zero, delta.is_zero());
    }

    #[rstest]
    #[case::whole_seconds(TimeDelta::from_seconds(2), TimeDelta::from_seconds(-2))]
    #[case::subsecond(TimeDelta { seconds: 0, nano: 2 }, TimeDelta { seconds: -1, nano: 999_999_998 })]
    #[case::max(TimeDelta { seconds: i64::MAX, nano: 1 }, TimeDelta { seconds: i64::MIN, nano: 999_999_999 })]
    fn test_time_delta_neg(#[case] delta: TimeDelta, #[case] expected: TimeDelta) {
        assert_eq!(expected, -delta);
        assert_eq!(delta, -(-delta));
    }

    #[test]
    fn test_time_delta_ord_matches_value() {
        let deltas = [
            TimeDelta { seconds: -2, nano: 999_999_999 },
            TimeDelta::from_seconds(-1),
            TimeDelta { seconds: -1, nano: 999_999_998 },
            TimeDelta::from_seconds(0),
            TimeDelta { seconds: 0, nano: 1 },
            TimeDelta::from_seconds(1),
        ];
        assert!(deltas.windows(2).all(|pair| pair[0] < pair[1]));
    }

    proptest! {
        #[test]
        fn prop_normalize_canonical_range(seconds in any::<i64>(), nanos in any::<i64>()) {
            if let Ok(delta) = TimeDelta::normalized(seconds, nanos) {
                prop_assert!((delta.nano() as i64) < NANOS_PER_SECOND);
            }
        }

        #[test]
        fn prop_neg_is_involutive(seconds in -1_000_000_000i64..1_000_000_000, nanos in 0i64..1_000_000_000) {
            let delta = TimeDelta::normalized(seconds, nanos).unwrap();
            prop_assert_eq!(delta, -(-delta));
        }
    }
}
