//! A single candidate meeting time and its canonical key.
//!
//! The key format is `YYYY-MM-DDTHH:MM-HH:MM`, e.g. `2024-01-01T09:00-10:00`.
//! It is what callers store and send back when they declare availability, so
//! formatting and parsing must round-trip exactly.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::window::{format_date, format_time, parse_date, parse_time, DurationMinutes};

/// A fixed-length candidate meeting time on one date.
///
/// Slots order by date, then start time, then end time. They serialize as
/// their slot key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Slot {
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
}

impl Slot {
    /// # Errors
    /// Returns `ScheduleError::InvalidWindow` if `start_time` is not before
    /// `end_time` or either carries seconds.
    pub fn new(date: NaiveDate, start_time: NaiveTime, end_time: NaiveTime) -> Result<Self> {
        if start_time.second() != 0
            || start_time.nanosecond() != 0
            || end_time.second() != 0
            || end_time.nanosecond() != 0
        {
            return Err(ScheduleError::InvalidWindow(
                "slot times must be whole minutes".to_string(),
            ));
        }
        if start_time >= end_time {
            return Err(ScheduleError::InvalidWindow(format!(
                "slot start {} is not before end {}",
                format_time(start_time),
                format_time(end_time)
            )));
        }
        Ok(Self {
            date,
            start_time,
            end_time,
        })
    }

    /// The slot of length `duration` beginning at `start_time` on `date`.
    ///
    /// # Errors
    /// Returns `ScheduleError::InvalidWindow` if the meeting would run past
    /// midnight.
    pub fn starting_at(
        date: NaiveDate,
        start_time: NaiveTime,
        duration: DurationMinutes,
    ) -> Result<Self> {
        let (end_time, wrapped) = start_time.overflowing_add_signed(duration.as_duration());
        if wrapped != 0 {
            return Err(ScheduleError::InvalidWindow(format!(
                "a {}-minute meeting starting at {} runs past midnight",
                duration.get(),
                format_time(start_time)
            )));
        }
        Self::new(date, start_time, end_time)
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn start_time(&self) -> NaiveTime {
        self.start_time
    }

    pub fn end_time(&self) -> NaiveTime {
        self.end_time
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    /// The canonical `YYYY-MM-DDTHH:MM-HH:MM` key.
    pub fn key(&self) -> String {
        self.to_string()
    }

    /// The slot as an absolute `[start, end)` pair, reading its wall-clock
    /// times as UTC.
    pub fn interval(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            self.date.and_time(self.start_time).and_utc(),
            self.date.and_time(self.end_time).and_utc(),
        )
    }

    /// The slot as an absolute `[start, end)` pair, reading its wall-clock
    /// times in the fixed zone `offset`.
    pub fn interval_at(&self, offset: FixedOffset) -> (DateTime<Utc>, DateTime<Utc>) {
        let shift = Duration::seconds(i64::from(offset.local_minus_utc()));
        (
            (self.date.and_time(self.start_time) - shift).and_utc(),
            (self.date.and_time(self.end_time) - shift).and_utc(),
        )
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}T{}-{}",
            format_date(self.date),
            format_time(self.start_time),
            format_time(self.end_time)
        )
    }
}

impl FromStr for Slot {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let (date, times) = trimmed
            .split_once('T')
            .ok_or_else(|| ScheduleError::malformed(s, "expected YYYY-MM-DDTHH:MM-HH:MM"))?;
        let (start, end) = times
            .split_once('-')
            .ok_or_else(|| ScheduleError::malformed(s, "expected a HH:MM-HH:MM time range"))?;

        let date = parse_date(date).map_err(|_| ScheduleError::malformed(s, "invalid date"))?;
        let start =
            parse_time(start).map_err(|_| ScheduleError::malformed(s, "invalid start time"))?;
        let end = parse_time(end).map_err(|_| ScheduleError::malformed(s, "invalid end time"))?;

        let slot = Slot::new(date, start, end)
            .map_err(|_| ScheduleError::malformed(s, "start time must be before end time"))?;

        // Only the canonical spelling parses.
        if slot.to_string() != trimmed {
            return Err(ScheduleError::malformed(
                s,
                "expected zero-padded YYYY-MM-DDTHH:MM-HH:MM",
            ));
        }
        Ok(slot)
    }
}

impl From<Slot> for String {
    fn from(slot: Slot) -> Self {
        slot.key()
    }
}

impl TryFrom<String> for Slot {
    type Error = ScheduleError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}
