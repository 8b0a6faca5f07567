use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

const MINUTES_PER_DAY: u16 = 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseTimeError {
    #[error("expected zero-padded HH:MM, got {0:?}")]
    Format(String),

    #[error("time of day out of range: {0:?}")]
    OutOfRange(String),
}

/// A same-day time of day with minute resolution.
///
/// Ordered by minutes since midnight. `24:00` is accepted so a slot can end at
/// the close of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes <= MINUTES_PER_DAY).then_some(TimeOfDay(minutes))
    }

    pub fn from_hm(hour: u8, minute: u8) -> Option<Self> {
        if minute >= 60 {
            return None;
        }
        Self::from_minutes(hour as u16 * 60 + minute as u16)
    }

    pub fn hour(self) -> u8 {
        (self.0 / 60) as u8
    }

    pub fn minute(self) -> u8 {
        (self.0 % 60) as u8
    }

    /// Shift forward, returning `None` past the end of the day.
    pub fn checked_add_minutes(self, minutes: u16) -> Option<Self> {
        self.0.checked_add(minutes).and_then(Self::from_minutes)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = ParseTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 5
            && bytes[2] == b':'
            && [0, 1, 3, 4].iter().all(|&i| bytes[i].is_ascii_digit());
        if !well_formed {
            return Err(ParseTimeError::Format(s.to_string()));
        }

        let digit = |i: usize| bytes[i] - b'0';
        let hour = digit(0) * 10 + digit(1);
        let minute = digit(3) * 10 + digit(4);

        TimeOfDay::from_hm(hour, minute).ok_or_else(|| ParseTimeError::OutOfRange(s.to_string()))
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Whether half-open spans `[start1, end1)` and `[start2, end2)` intersect.
///
/// Spans that merely touch (one ends exactly where the other starts) do not.
pub fn times_overlap(
    start1: TimeOfDay,
    end1: TimeOfDay,
    start2: TimeOfDay,
    end2: TimeOfDay,
) -> bool {
    !(end1 <= start2 || end2 <= start1)
}
