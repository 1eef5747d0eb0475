//! Worked-time arithmetic for a single shift.
//!
//! Times are clock readings, not instants: a shift whose end reads at or before its start is
//! taken to cross midnight. Hours 24-47 are also accepted (`25:00` is 01:00 the next day), in
//! which case the span is already unwrapped.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const MINUTES_PER_DAY: u32 = 1440;
const MAX_CLOCK_HOUR: u32 = 47;

/// A reading on the planning clock, stored as minutes past midnight of the shift date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime {
    minutes: u32,
}

impl ClockTime {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        if hour > MAX_CLOCK_HOUR || minute > 59 {
            return None;
        }
        Some(Self {
            minutes: hour * 60 + minute,
        })
    }

    pub fn from_minutes(minutes: u32) -> Option<Self> {
        Self::new(minutes / 60, minutes % 60)
    }

    pub const fn hour(self) -> u32 {
        self.minutes / 60
    }

    pub const fn minute(self) -> u32 {
        self.minutes % 60
    }

    pub const fn minutes_from_midnight(self) -> u32 {
        self.minutes
    }

    /// Hour on the 24 hour dial; `26:15` reads as 2.
    pub const fn dial_hour(self) -> u32 {
        self.hour() % 24
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{raw}' is not a valid HH:MM clock time")]
pub struct ClockParseError {
    pub raw: String,
}

impl FromStr for ClockTime {
    type Err = ClockParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || ClockParseError {
            raw: raw.to_string(),
        };

        let mut parts = raw.trim().split(':');
        let hour = parts
            .next()
            .and_then(|part| part.parse::<u32>().ok())
            .ok_or_else(invalid)?;
        let minute = parts
            .next()
            .and_then(|part| part.parse::<u32>().ok())
            .ok_or_else(invalid)?;
        // Seconds are accepted (database TIME columns render them) and dropped.
        if let Some(seconds) = parts.next() {
            seconds.parse::<u32>().map_err(|_| invalid())?;
        }
        if parts.next().is_some() {
            return Err(invalid());
        }

        Self::new(hour, minute).ok_or_else(invalid)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Raised when the break cannot fit inside the shift's span.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("break of {break_minutes} min exceeds the {span_minutes} min span {start}-{end}")]
pub struct InvalidShiftError {
    pub start: ClockTime,
    pub end: ClockTime,
    pub span_minutes: u32,
    pub break_minutes: u32,
}

/// Gross minutes between start and end, wrapping once past midnight when `end <= start`.
pub fn span_minutes(start: ClockTime, end: ClockTime) -> u32 {
    let start = start.minutes_from_midnight();
    let end = end.minutes_from_midnight();
    if end <= start {
        end + MINUTES_PER_DAY - start
    } else {
        end - start
    }
}

pub fn worked_minutes(
    start: ClockTime,
    end: ClockTime,
    break_minutes: u32,
) -> Result<u32, InvalidShiftError> {
    let span = span_minutes(start, end);
    span.checked_sub(break_minutes)
        .ok_or(InvalidShiftError {
            start,
            end,
            span_minutes: span,
            break_minutes,
        })
}

/// Night classification on raw clock hours with the default 22:00 / 05:00 boundaries.
pub fn is_night_shift(start: ClockTime, end: ClockTime) -> bool {
    NightWindow::default().matches(start, end)
}

/// Minutes to hours, rounded half-up to two places.
pub fn to_hours(minutes: u32) -> Decimal {
    (Decimal::from(minutes) / Decimal::from(60))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Hour boundaries of the night band. A shift is a night shift when it starts at or after
/// `start_hour` or ends at or before `end_hour`. Extended readings (`28:00`) are folded back
/// onto the 24 hour dial first, so `20:00-28:00` classifies like `20:00-04:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl NightWindow {
    pub fn matches(&self, start: ClockTime, end: ClockTime) -> bool {
        start.dial_hour() >= self.start_hour || end.dial_hour() <= self.end_hour
    }
}

impl Default for NightWindow {
    fn default() -> Self {
        Self {
            start_hour: 22,
            end_hour: 5,
        }
    }
}

/// Declared-availability buckets a shift falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftCategory {
    Morning,
    Afternoon,
    Night,
}

impl ShiftCategory {
    pub fn of(start: ClockTime, end: ClockTime, night: &NightWindow) -> Self {
        if night.matches(start, end) {
            Self::Night
        } else if start.dial_hour() < 12 {
            Self::Morning
        } else {
            Self::Afternoon
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Night => "night",
        }
    }
}

/// A dated shift pinned to absolute instants, end rolled into the next day when needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftWindow {
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
}

impl ShiftWindow {
    pub fn on(date: NaiveDate, start: ClockTime, end: ClockTime) -> Self {
        let midnight = date.and_time(NaiveTime::MIN);
        let starts_at = midnight + Duration::minutes(i64::from(start.minutes_from_midnight()));
        let ends_at = starts_at + Duration::minutes(i64::from(span_minutes(start, end)));
        Self { starts_at, ends_at }
    }

    pub fn covers(&self, instant: NaiveDateTime) -> bool {
        self.starts_at <= instant && instant < self.ends_at
    }

    /// Minutes from the end of `self` to the start of `next`; negative when they overlap.
    pub fn rest_until(&self, next: &ShiftWindow) -> i64 {
        (next.starts_at - self.ends_at).num_minutes()
    }
}
