//! Date, time-of-day and interval primitives shared by the generator, the
//! aggregator and the conflict filter.
//!
//! All times are wall-clock values in a single fixed zone. Interval overlap is
//! strict everywhere in this crate: two intervals that merely touch (one ends
//! exactly when the other starts) do not overlap.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// # Errors
    /// Returns `ScheduleError::InvalidRange` if `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(ScheduleError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parse a range from two `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every date in the range, ascending, both ends included.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + Clone {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

/// A daily time-of-day window, `[start_time, end_time]`.
///
/// Both bounds are minute-aligned so that every slot carved from the window
/// can be written as an `HH:MM` slot key without losing precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start_time: NaiveTime,
    end_time: NaiveTime,
}

impl TimeWindow {
    /// # Errors
    /// Returns `ScheduleError::InvalidWindow` if `start_time` is not strictly
    /// before `end_time`, or if either bound carries seconds.
    pub fn new(start_time: NaiveTime, end_time: NaiveTime) -> Result<Self> {
        for t in [start_time, end_time] {
            if !is_minute_aligned(t) {
                return Err(ScheduleError::InvalidWindow(format!(
                    "{} is not a whole minute",
                    t
                )));
            }
        }
        if start_time >= end_time {
            return Err(ScheduleError::InvalidWindow(format!(
                "start {} is not before end {}",
                format_time(start_time),
                format_time(end_time)
            )));
        }
        Ok(Self {
            start_time,
            end_time,
        })
    }

    /// Parse a window from two `HH:MM` strings.
    pub fn parse(start_time: &str, end_time: &str) -> Result<Self> {
        Self::new(parse_time(start_time)?, parse_time(end_time)?)
    }

    pub fn start_time(&self) -> NaiveTime {
        self.start_time
    }

    pub fn end_time(&self) -> NaiveTime {
        self.end_time
    }

    /// Length of the window in minutes.
    pub fn minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    /// Whether `[start, end]` lies entirely inside this window.
    pub fn contains(&self, start: NaiveTime, end: NaiveTime) -> bool {
        self.start_time <= start && end <= self.end_time
    }
}

/// Which calendar dates of a range are eligible for slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayFilter {
    #[default]
    AllDays,
    /// Monday through Friday.
    Weekdays,
    /// Saturday and Sunday.
    Weekends,
}

impl DayFilter {
    pub fn matches(self, date: NaiveDate) -> bool {
        let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
        match self {
            DayFilter::AllDays => true,
            DayFilter::Weekdays => !weekend,
            DayFilter::Weekends => weekend,
        }
    }

    /// Map a numeric day-filter code to a filter.
    ///
    /// `1` = weekdays, `2` = weekends, `3` = all days. The older codes `5`
    /// (a five-day week) and `7` (every day) are still accepted.
    ///
    /// # Errors
    /// Returns `ScheduleError::UnknownDayFilter` for any other code.
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            1 | 5 => Ok(DayFilter::Weekdays),
            2 => Ok(DayFilter::Weekends),
            3 | 7 => Ok(DayFilter::AllDays),
            other => Err(ScheduleError::UnknownDayFilter(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DayFilter::AllDays => "all_days",
            DayFilter::Weekdays => "weekdays",
            DayFilter::Weekends => "weekends",
        }
    }
}

impl fmt::Display for DayFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayFilter {
    type Err = ScheduleError;

    /// Accepts the filter names (`all_days`, `weekdays`, `weekends`, with `-`
    /// or `_`, any case), `all`, or a numeric code understood by
    /// [`DayFilter::from_code`].
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "all" | "all_days" | "alldays" => Ok(DayFilter::AllDays),
            "weekdays" => Ok(DayFilter::Weekdays),
            "weekends" => Ok(DayFilter::Weekends),
            other => match other.parse::<u8>() {
                Ok(code) => DayFilter::from_code(code),
                Err(_) => Err(ScheduleError::UnknownDayFilter(s.to_string())),
            },
        }
    }
}

/// Whether `date` is eligible under `filter`.
pub fn day_matches_filter(date: NaiveDate, filter: DayFilter) -> bool {
    filter.matches(date)
}

/// A strictly positive meeting length in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DurationMinutes(u32);

impl DurationMinutes {
    /// # Errors
    /// Returns `ScheduleError::InvalidWindow` for a zero duration.
    pub fn new(minutes: u32) -> Result<Self> {
        if minutes == 0 {
            return Err(ScheduleError::InvalidWindow(
                "meeting duration must be positive".to_string(),
            ));
        }
        Ok(Self(minutes))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn as_duration(self) -> Duration {
        Duration::minutes(i64::from(self.0))
    }
}

impl TryFrom<MeetingDuration> for DurationMinutes {
    type Error = ScheduleError;

    fn try_from(duration: MeetingDuration) -> Result<Self> {
        duration.to_minutes()
    }
}

/// A meeting length as the organizer declared it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingDuration {
    Minutes(u32),
    Hours(u32),
}

impl MeetingDuration {
    /// Reduce to minutes, rejecting zero and overflowing lengths.
    pub fn to_minutes(self) -> Result<DurationMinutes> {
        match self {
            MeetingDuration::Minutes(m) => DurationMinutes::new(m),
            MeetingDuration::Hours(h) => {
                let minutes = h.checked_mul(60).ok_or_else(|| {
                    ScheduleError::InvalidWindow(format!("{} hours is too long", h))
                })?;
                DurationMinutes::new(minutes)
            }
        }
    }
}

/// Strict interval overlap: `max(a_start, b_start) < min(a_end, b_end)`.
///
/// Nested intervals overlap; intervals that only share an endpoint do not.
pub fn overlaps<T: Ord + Copy>(a_start: T, a_end: T, b_start: T, b_end: T) -> bool {
    a_start.max(b_start) < a_end.min(b_end)
}

/// Length of the strict overlap between two instants ranges, in whole
/// minutes. Zero when they do not overlap.
pub fn overlap_minutes(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> i64 {
    let start = a_start.max(b_start);
    let end = a_end.min(b_end);
    if start < end {
        (end - start).num_minutes()
    } else {
        0
    }
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|e| ScheduleError::malformed(s, format!("invalid date: {}", e)))
}

/// Parse a 24-hour `HH:MM` time of day.
///
/// `HH:MM:SS` is accepted as long as the seconds are zero, which is how SQL
/// `TIME` columns hand values back.
pub fn parse_time(s: &str) -> Result<NaiveTime> {
    let trimmed = s.trim();
    let time = NaiveTime::parse_from_str(trimmed, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|e| ScheduleError::malformed(s, format!("invalid time: {}", e)))?;
    if !is_minute_aligned(time) {
        return Err(ScheduleError::malformed(s, "seconds are not supported"));
    }
    Ok(time)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Format a time of day as `HH:MM`.
pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

fn is_minute_aligned(time: NaiveTime) -> bool {
    time.second() == 0 && time.nanosecond() == 0
}
