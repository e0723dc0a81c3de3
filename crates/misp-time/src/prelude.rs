/*
 * Copyright (c) 2025. The misp-time contributors
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, you can obtain one at https://mozilla.org/MPL/2.0/.
 */

pub use crate::calendar_dates::Date;
pub use crate::deltas::TimeDelta;
pub use crate::instant::Instant;
pub use crate::misp::MispInstant;
pub use crate::tai::TaiInstant;
pub use crate::utc::leap_seconds::{SystemUtcRules, UtcRules};
pub use crate::utc::UtcInstant;
