// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Resolves the many shapes an event time can arrive in to a single instant.
//!
//! Malformed timestamps must never block delivery, so anything unrecognized
//! resolves to the current time instead of failing.

use chrono::{DateTime, TimeZone, Utc};
use tracing::warn;

use crate::value::RawValue;

/// How a timestamp was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The value carried a usable instant.
    Parsed(DateTime<Utc>),
    /// The value was not understood; the caller's "now" was substituted.
    DefaultedToNow(DateTime<Utc>),
}

impl Resolution {
    pub fn instant(self) -> DateTime<Utc> {
        match self {
            Resolution::Parsed(ts) | Resolution::DefaultedToNow(ts) => ts,
        }
    }
}

/// Resolves `ts` against the wall clock.
pub fn resolve_timestamp(ts: &RawValue) -> DateTime<Utc> {
    let resolution = resolve_timestamp_at(ts, Utc::now());
    if let Resolution::DefaultedToNow(now) = resolution {
        warn!(
            "LOGS | Unknown timestamp format {}, defaulting to now: {}",
            ts.kind(),
            now
        );
    }
    resolution.instant()
}

/// Resolves `ts`, substituting `now` for anything unrecognized.
///
/// - an instant passes through
/// - an unsigned integer is POSIX seconds
/// - a sequence of two or more elements resolves its first element; the rest
///   (sub-second parts) are ignored
pub fn resolve_timestamp_at(ts: &RawValue, now: DateTime<Utc>) -> Resolution {
    match ts {
        RawValue::Instant(instant) => Resolution::Parsed(*instant),
        RawValue::UInt(secs) => i64::try_from(*secs)
            .ok()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .map_or(Resolution::DefaultedToNow(now), Resolution::Parsed),
        RawValue::Seq(items) if items.len() >= 2 => resolve_timestamp_at(&items[0], now),
        _ => Resolution::DefaultedToNow(now),
    }
}
