//! Target-time resolution and propagator epoch conversion.
//!
//! # Responsibility
//! - Resolve "now plus N minutes" into a UTC instant.
//! - Convert UTC instants into the two-part Julian date SGP4 consumes.
//!
//! # Invariants
//! - Conversions are pure and monotonic in the input instant.
//! - Sub-second precision is folded into the fractional-day part.

use chrono::{DateTime, Datelike, SecondsFormat, TimeDelta, Timelike, Utc};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

const SECONDS_PER_DAY: f64 = 86_400.0;
const MINUTES_PER_DAY: f64 = 1_440.0;
/// Julian date at 0h UTC of the day before 0001-01-01 (proleptic Gregorian),
/// so that adding `num_days_from_ce()` lands on the instant's own midnight.
const JULIAN_DATE_OF_CE_DAY_ZERO: f64 = 1_721_424.5;

pub type TimeResult<T> = Result<T, TimeError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    OffsetOutOfRange { offset_minutes: i64 },
}

impl Display for TimeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OffsetOutOfRange { offset_minutes } => write!(
                f,
                "offset of {offset_minutes} minutes is outside the representable time range"
            ),
        }
    }
}

impl Error for TimeError {}

/// Julian date split into midnight day number and fraction of day.
///
/// Keeping the parts separate preserves sub-millisecond resolution that a
/// single `f64` Julian date (~2.4e6) would lose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JulianEpoch {
    /// Julian date at 0h UTC, always ending in `.5`.
    pub days: f64,
    /// Elapsed fraction of the UTC day, in `[0, 1)`.
    pub fraction: f64,
}

impl JulianEpoch {
    /// Minutes elapsed from `earlier` to `self`.
    pub fn minutes_since(&self, earlier: &JulianEpoch) -> f64 {
        ((self.days - earlier.days) + (self.fraction - earlier.fraction)) * MINUTES_PER_DAY
    }

    /// Single-number Julian date. Loses precision; for display only.
    pub fn julian_date(&self) -> f64 {
        self.days + self.fraction
    }
}

/// Returns `now_utc` shifted by `offset_minutes`.
pub fn resolve(now_utc: DateTime<Utc>, offset_minutes: i64) -> TimeResult<DateTime<Utc>> {
    TimeDelta::try_minutes(offset_minutes)
        .and_then(|delta| now_utc.checked_add_signed(delta))
        .ok_or(TimeError::OffsetOutOfRange { offset_minutes })
}

/// Converts a UTC instant into the propagator's two-part epoch.
pub fn to_epoch(instant: DateTime<Utc>) -> JulianEpoch {
    let days = f64::from(instant.num_days_from_ce()) + JULIAN_DATE_OF_CE_DAY_ZERO;
    let seconds = f64::from(instant.num_seconds_from_midnight())
        + f64::from(instant.nanosecond()) / 1e9;
    JulianEpoch {
        days,
        fraction: seconds / SECONDS_PER_DAY,
    }
}

/// Formats an instant as RFC 3339 with a `Z` suffix.
pub fn format_utc(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
