/*
 * Copyright (c) 2026. The misp-time contributors
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Conversions between [Instant] and `chrono::DateTime<Utc>`.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::instant::Instant;

/// Error type returned when an [Instant] falls outside the range
/// representable by chrono.
#[derive(Debug, Copy, Clone, Error, PartialEq, Eq)]
#[error("`{0}` is outside the range representable by chrono")]
pub struct ChronoError(pub Instant);

impl TryFrom<Instant> for DateTime<Utc> {
    type Error = ChronoError;

    fn try_from(instant: Instant) -> Result<Self, Self::Error> {
        DateTime::from_timestamp(instant.unix_seconds(), instant.nano())
            .ok_or(ChronoError(instant))
    }
}

impl From<DateTime<Utc>> for Instant {
    fn from(datetime: DateTime<Utc>) -> Self {
        // chrono smears its leap second representation into a nanosecond
        // field that can reach 2 * 10^9; the normalising constructor folds
        // the excess into the seconds.
        Instant::from_unix_seconds(
            datetime.timestamp(),
            datetime.timestamp_subsec_nanos() as i64,
        )
        .unwrap_or_else(|_| unreachable!("chrono timestamps are always in range"))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::epoch(Instant::from_unix_seconds(0, 0).unwrap())]
    #[case::pre_epoch(Instant::from_unix_seconds(-1, 999_999_999).unwrap())]
    #[case::recent(Instant::from_unix_seconds(1_646_438_408, 82_000).unwrap())]
    fn test_chrono_roundtrip(#[case] instant: Instant) {
        let datetime: DateTime<Utc> = instant.try_into().unwrap();
        let roundtrip: Instant = datetime.into();
        assert_eq!(instant, roundtrip);
    }

    #[test]
    fn test_chrono_out_of_range() {
        let instant = Instant::from_unix_seconds(i64::MAX, 0).unwrap();
        let actual: Result<DateTime<Utc>, ChronoError> = instant.try_into();
        assert_eq!(actual, Err(ChronoError(instant)));
    }
}
