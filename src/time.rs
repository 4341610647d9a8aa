//! `HH:MM` time-of-day values and their minute offsets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Minutes;

pub const MINUTES_PER_DAY: Minutes = 24 * 60;

/// A wall-clock time within a single day, stored as minutes after midnight.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);

    /// `hour` and `minute` are taken modulo 24 and 60.
    pub const fn from_hm(hour: u16, minute: u16) -> Self {
        TimeOfDay((hour % 24) * 60 + minute % 60)
    }

    /// Strict 24-hour `HH:MM`: two digit hour 00-23, two digit minute 00-59.
    pub fn parse(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 5 || bytes[2] != b':' {
            return None;
        }

        let digit = |b: u8| b.is_ascii_digit().then(|| (b - b'0') as u16);
        let hour = digit(bytes[0])? * 10 + digit(bytes[1])?;
        let minute = digit(bytes[3])? * 10 + digit(bytes[4])?;

        (hour < 24 && minute < 60).then_some(TimeOfDay(hour * 60 + minute))
    }

    /// Wraps around midnight in both directions.
    pub fn from_minutes(minutes: Minutes) -> Self {
        TimeOfDay(minutes.rem_euclid(MINUTES_PER_DAY) as u16)
    }

    pub fn minutes(self) -> Minutes {
        self.0 as Minutes
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }

    /// `delta` is reduced modulo a day first, so any span is accepted.
    pub fn shifted(self, delta: Minutes) -> Self {
        Self::from_minutes(self.minutes() + delta.rem_euclid(MINUTES_PER_DAY))
    }

    pub fn shifted_back(self, delta: Minutes) -> Self {
        Self::from_minutes(self.minutes() - delta.rem_euclid(MINUTES_PER_DAY))
    }

    /// Signed distance from `self` to `later`, not wrapped: a value earlier in the day gives a
    /// negative result.
    pub fn minutes_until(self, later: TimeOfDay) -> Minutes {
        later.minutes() - self.minutes()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl fmt::Debug for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimeOfDay({self})")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTimeError(pub String);

impl fmt::Display for ParseTimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} is not a HH:MM time", self.0)
    }
}

impl std::error::Error for ParseTimeError {}

impl FromStr for TimeOfDay {
    type Err = ParseTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ParseTimeError(s.to_string()))
    }
}

/// Renders an optional time the way the backup stores it: `""` when empty.
pub fn format_optional(time: Option<TimeOfDay>) -> String {
    time.map(|t| t.to_string()).unwrap_or_default()
}

/// Serde adapter for `Option<TimeOfDay>` fields that are written as `"HH:MM"` or `""`.
pub mod optional_hhmm {
    use super::*;

    pub fn serialize<S: Serializer>(time: &Option<TimeOfDay>, s: S) -> Result<S::Ok, S::Error> {
        format_optional(*time).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<TimeOfDay>, D::Error> {
        let raw = String::deserialize(d)?;
        if raw.is_empty() {
            return Ok(None);
        }

        TimeOfDay::parse(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(ParseTimeError(raw)))
    }
}
