//! Timestamp parsing for the `startDate` column.
//!
//! The column holds naive wall-clock times in a couple of layouts, and
//! occasionally ISO-8601 with an offset. Offsets are folded into UTC; naive
//! values stay naive, so comparisons are only meaningful within one source.

use crate::error::{ConvertError, Result};
use chrono::{DateTime, NaiveDateTime, TimeDelta, Timelike};
use std::fmt;
use std::ops::Sub;

const SPACED_FRACTIONAL: &str = "%Y-%m-%d %H:%M:%S%.f";
const SPACED: &str = "%Y-%m-%d %H:%M:%S";
const ISO_NAIVE: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A point in time as recorded by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    pub const fn new(dt: NaiveDateTime) -> Self {
        Self(dt)
    }

    /// Parse one of the layouts found in the metrics table.
    ///
    /// Fractions finer than a microsecond are rejected so that the rendered
    /// form always parses back to the same instant.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let malformed = || ConvertError::MalformedTimestamp {
            text: text.to_string(),
        };

        let dt = Self::parse_any(text).ok_or_else(malformed)?;
        if dt.nanosecond() % 1_000 != 0 {
            return Err(malformed());
        }
        Ok(Self(dt))
    }

    fn parse_any(text: &str) -> Option<NaiveDateTime> {
        for fmt in [SPACED_FRACTIONAL, SPACED] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
                return Some(dt);
            }
        }

        if text.contains('T') {
            let rewritten = match text.strip_suffix('Z') {
                Some(head) => format!("{head}+00:00"),
                None => text.to_string(),
            };
            if let Ok(dt) = DateTime::parse_from_rfc3339(&rewritten) {
                return Some(dt.naive_utc());
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(&rewritten, ISO_NAIVE) {
                return Some(dt);
            }
        }

        None
    }

    /// Absolute distance to another timestamp.
    pub fn abs_diff(self, other: Self) -> TimeDelta {
        (self.0 - other.0).abs()
    }
}

impl Sub for Timestamp {
    type Output = TimeDelta;

    fn sub(self, rhs: Self) -> TimeDelta {
        self.0 - rhs.0
    }
}

/// ISO-8601 with a `Z` suffix, microseconds only when present.
impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.nanosecond() == 0 {
            write!(f, "{}Z", self.0.format("%Y-%m-%dT%H:%M:%S"))
        } else {
            write!(f, "{}Z", self.0.format("%Y-%m-%dT%H:%M:%S%.6f"))
        }
    }
}
