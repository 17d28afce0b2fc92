//! Conversions between time of day and the vertical timeline canvas.
//!
//! The canvas uses a fixed scale of one pixel per minute, so a whole day is
//! [`DAY_HEIGHT`] pixels tall. Pointer positions are continuous, plan blocks
//! are not: everything a click produces is snapped down to the
//! [`SNAP_MINUTES`] grid.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const MINUTES_PER_DAY: u16 = 1440;
/// Last addressable minute of the day (23:59).
pub const LAST_MINUTE: u16 = MINUTES_PER_DAY - 1;
pub const SNAP_MINUTES: u16 = 15;
pub const DEFAULT_SPAN_MINUTES: u16 = 60;
/// Canvas height in pixels.
pub const DAY_HEIGHT: f32 = MINUTES_PER_DAY as f32;

/// Wall-clock time with minute granularity, always within `00:00..=23:59`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeOfDay(u16);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeParseError {
    #[error("expected HH:MM, got '{0}'")]
    Format(String),
    #[error("time '{0}' is outside 00:00-23:59")]
    OutOfRange(String),
}

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);
    pub const END_OF_DAY: TimeOfDay = TimeOfDay(LAST_MINUTE);

    /// Build from hours and minutes. Returns `None` past 23:59.
    pub fn from_hm(hours: u16, minutes: u16) -> Option<Self> {
        if hours < 24 && minutes < 60 {
            Some(Self(hours * 60 + minutes))
        } else {
            None
        }
    }

    /// Build from a minute-of-day value, clamping into the day.
    pub fn from_minutes_clamped(minutes: i64) -> Self {
        Self(minutes.clamp(0, LAST_MINUTE as i64) as u16)
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hours(self) -> u16 {
        self.0 / 60
    }

    pub fn minute_of_hour(self) -> u16 {
        self.0 % 60
    }
}

impl From<chrono::NaiveTime> for TimeOfDay {
    fn from(time: chrono::NaiveTime) -> Self {
        use chrono::Timelike;
        Self((time.hour() * 60 + time.minute()) as u16)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hours(), self.minute_of_hour())
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (h, m) = trimmed
            .split_once(':')
            .ok_or_else(|| TimeParseError::Format(trimmed.to_string()))?;
        // Browsers' time inputs may send seconds ("09:00:00"); keep only HH:MM.
        let m = m.split(':').next().unwrap_or(m);
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(TimeParseError::Format(trimmed.to_string()));
        }
        let hours: u16 = h
            .parse()
            .map_err(|_| TimeParseError::Format(trimmed.to_string()))?;
        let minutes: u16 = m
            .parse()
            .map_err(|_| TimeParseError::Format(trimmed.to_string()))?;
        Self::from_hm(hours, minutes).ok_or_else(|| TimeParseError::OutOfRange(trimmed.to_string()))
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

/// Vertical offset of a time on the canvas.
pub fn position_of(time: TimeOfDay) -> u16 {
    time.minutes().min(LAST_MINUTE)
}

/// Time under a raw pointer offset: clamped into the day, then snapped down
/// to the 15-minute grid.
pub fn time_of_offset(raw_offset: f32) -> TimeOfDay {
    let clamped = if raw_offset.is_nan() {
        0.0
    } else {
        raw_offset.clamp(0.0, LAST_MINUTE as f32)
    };
    let minute = clamped.floor() as u16;
    TimeOfDay((minute / SNAP_MINUTES) * SNAP_MINUTES)
}

/// Block height for a time range. Never negative.
pub fn duration_height(start: TimeOfDay, end: TimeOfDay) -> u16 {
    position_of(end).saturating_sub(position_of(start))
}

/// Default one-hour span starting at `start`. The end stops at 23:59 instead
/// of wrapping into the next day.
pub fn default_range_from(start: TimeOfDay) -> (TimeOfDay, TimeOfDay) {
    let end = (start.minutes() + DEFAULT_SPAN_MINUTES).min(LAST_MINUTE);
    (start, TimeOfDay(end))
}

/// The 24 hour lines of the grid with their offsets.
pub fn hour_marks() -> impl Iterator<Item = (TimeOfDay, u16)> {
    (0..24u16).map(|h| {
        let time = TimeOfDay(h * 60);
        (time, position_of(time))
    })
}
