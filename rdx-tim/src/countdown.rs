//! The countdown value type and the time option a timer is launched with.

use crate::common::SECONDS_IN_MINUTE;
use crate::error::DurationError;
use crate::quantize;
use chrono::{DateTime, Utc};
use std::fmt;

/// Signed time left until the target. Both parts share the sign of the total,
/// so an overdue countdown has non-positive minutes and seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    pub minutes: i64,
    pub seconds: i64,
}

impl Countdown {
    /// Splits a signed total into minutes and seconds, truncating toward zero.
    pub fn from_total_seconds(total: i64) -> Self {
        let per_minute = SECONDS_IN_MINUTE as i64;
        Self {
            minutes: total / per_minute,
            seconds: total % per_minute,
        }
    }

    /// Time left between `now` and `target`, in whole seconds.
    pub fn until(target: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self::from_total_seconds((target - now).num_seconds())
    }

    pub fn total_seconds(&self) -> i64 {
        self.minutes * SECONDS_IN_MINUTE as i64 + self.seconds
    }

    pub fn is_over_time(&self) -> bool {
        self.minutes <= 0 && self.seconds <= 0
    }

    /// The magnitude of an overdue countdown.
    pub fn flip_for_over_time(self) -> Self {
        Self {
            minutes: self.minutes.abs(),
            seconds: self.seconds.abs(),
        }
    }

    /// Quantized rendering of a non-negative countdown.
    pub fn display(&self) -> String {
        let total = u64::try_from(self.total_seconds()).unwrap_or(0);
        quantize::total_seconds_to_string(total)
    }
}

/// What a timer was launched with: an optional name and a fine target length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerSpec {
    pub name: Option<String>,
    pub total_seconds: u64,
}

impl TimerSpec {
    /// Parses the time option and snaps it forward to a fine total.
    pub fn from_args(duration: &str, name: Option<String>) -> Result<Self, DurationError> {
        let parsed = parse_duration(duration)?;
        Ok(Self {
            name: name.filter(|n| !n.trim().is_empty()),
            total_seconds: quantize::nearest_fine(parsed),
        })
    }
}

/// Reads `M`, `M,S` or `,S` into seconds. An empty part counts as zero.
pub fn parse_duration(input: &str) -> Result<u64, DurationError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(DurationError::Empty);
    }

    let (minutes, seconds) = input.split_once(',').unwrap_or((input, ""));
    if seconds.contains(',') {
        return Err(DurationError::TooManyParts(input.to_string()));
    }

    let minutes = parse_part(minutes)?;
    let seconds = parse_part(seconds)?;
    minutes
        .checked_mul(SECONDS_IN_MINUTE)
        .and_then(|m| m.checked_add(seconds))
        .ok_or_else(|| DurationError::Overflow(input.to_string()))
}

fn parse_part(part: &str) -> Result<u64, DurationError> {
    let part = part.trim();
    if part.is_empty() {
        return Ok(0);
    }
    if !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DurationError::InvalidNumber(part.to_string()));
    }
    part.parse::<u64>()
        .map_err(|_| DurationError::Overflow(part.to_string()))
}

/// An instantaneous reading, printed when a countdown is cancelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reading {
    Left(String),
    OverTime(String),
}

impl Reading {
    pub fn at(target: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let remaining = Countdown::until(target, now);
        if remaining.is_over_time() {
            Reading::OverTime(remaining.flip_for_over_time().display())
        } else {
            Reading::Left(remaining.display())
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Left(shown) => write!(f, "{shown} left..."),
            Reading::OverTime(shown) => write!(f, "{shown} over time..."),
        }
    }
}
