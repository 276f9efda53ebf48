//! Drop or flag slots that collide with externally known busy intervals.
//!
//! Busy intervals come pre-fetched from a calendar; this module never talks to
//! one. A slot conflicts with a busy interval when they overlap strictly, so a
//! slot that starts exactly when an event ends is still free.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};
use serde::Serialize;

use crate::error::{Result, ScheduleError};
use crate::slot::Slot;
use crate::window::{overlap_minutes, overlaps};

/// An absolute time range during which someone is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BusyInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl BusyInterval {
    /// # Errors
    /// Returns `ScheduleError::InvalidInterval` if `end` is before `start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end < start {
            return Err(ScheduleError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parse a busy interval from two timestamp strings, reading bounds that
    /// carry no zone as UTC. See [`BusyInterval::parse_at`].
    ///
    /// # Errors
    /// Returns `ScheduleError::MalformedEntry` if a bound does not parse and
    /// `ScheduleError::InvalidInterval` if the end precedes the start.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::parse_at(start, end, Utc.fix())
    }

    /// Parse a busy interval from two timestamp strings.
    ///
    /// Each bound may be an instant with a zone (`2024-01-01T09:30:00Z`,
    /// `2024-01-01T09:30Z`, `2024-01-01T11:30+02:00`), a naive
    /// `YYYY-MM-DDTHH:MM[:SS[.fff]]` wall-clock time, or a bare date for
    /// all-day events. Naive times and dates are read in `offset`, the zone
    /// slots are placed in, so an all-day event covers that local date. Its
    /// end date is exclusive, so local midnight of that date is the end
    /// instant.
    ///
    /// # Errors
    /// Returns `ScheduleError::MalformedEntry` if a bound does not parse and
    /// `ScheduleError::InvalidInterval` if the end precedes the start.
    pub fn parse_at(start: &str, end: &str, offset: FixedOffset) -> Result<Self> {
        Self::new(parse_instant(start, offset)?, parse_instant(end, offset)?)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
}

fn parse_instant(s: &str, offset: FixedOffset) -> Result<DateTime<Utc>> {
    let trimmed = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Some(ndt) = trimmed.strip_suffix(['Z', 'z']).and_then(parse_naive) {
        return Ok(ndt.and_utc());
    }
    if let Ok(dt) = DateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M%:z") {
        return Ok(dt.with_timezone(&Utc));
    }

    let local = match parse_naive(trimmed) {
        Some(ndt) => ndt,
        None => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map(|date| date.and_time(NaiveTime::MIN))
            .map_err(|_| ScheduleError::malformed(s, "expected a timestamp or a date"))?,
    };
    let shift = Duration::seconds(i64::from(offset.local_minus_utc()));
    local
        .checked_sub_signed(shift)
        .map(|ndt| ndt.and_utc())
        .ok_or_else(|| ScheduleError::malformed(s, "timestamp out of range"))
}

/// A slot flagged against one busy interval it overlaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotConflict {
    pub slot: Slot,
    pub busy: BusyInterval,
    pub overlap_minutes: i64,
}

/// Busy intervals prepared for repeated slot lookups.
///
/// Intervals are sorted and merged once, so each slot check is a binary
/// search. Slots are placed on the timeline in a single fixed zone, UTC
/// unless built with [`BusyCalendar::with_offset`].
#[derive(Debug, Clone)]
pub struct BusyCalendar {
    intervals: Vec<BusyInterval>,
    merged: Vec<(DateTime<Utc>, DateTime<Utc>)>,
    offset: FixedOffset,
}

impl BusyCalendar {
    pub fn new(busy: &[BusyInterval]) -> Self {
        Self::with_offset(busy, Utc.fix())
    }

    /// Read slot wall-clock times in the fixed zone `offset`.
    pub fn with_offset(busy: &[BusyInterval], offset: FixedOffset) -> Self {
        Self {
            intervals: busy.to_vec(),
            merged: merge_busy_periods(busy),
            offset,
        }
    }

    /// Whether `[start, end)` overlaps any busy interval.
    pub fn is_busy(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        // Merged periods are disjoint and sorted, so their ends ascend too.
        let first_ending_after = self.merged.partition_point(|&(_, e)| e <= start);
        self.merged
            .get(first_ending_after)
            .is_some_and(|&(s, _)| s < end)
    }

    pub fn conflicts(&self, slot: &Slot) -> bool {
        let (start, end) = slot.interval_at(self.offset);
        self.is_busy(start, end)
    }

    /// The slots free of every busy interval, in input order.
    pub fn filter_conflicting(&self, slots: &[Slot]) -> Vec<Slot> {
        slots
            .iter()
            .filter(|slot| !self.conflicts(slot))
            .copied()
            .collect()
    }

    /// Split `slots` into `(free, conflicting)`, each in input order.
    pub fn partition(&self, slots: &[Slot]) -> (Vec<Slot>, Vec<Slot>) {
        slots.iter().copied().partition(|slot| !self.conflicts(slot))
    }

    /// Every (slot, busy interval) pair that overlaps, with the overlap
    /// length. Ordered by slot, then by busy interval, in input order.
    pub fn find_conflicts(&self, slots: &[Slot]) -> Vec<SlotConflict> {
        let mut conflicts = Vec::new();

        for slot in slots {
            if !self.conflicts(slot) {
                continue;
            }
            let (start, end) = slot.interval_at(self.offset);
            for busy in &self.intervals {
                if overlaps(start, end, busy.start, busy.end) {
                    conflicts.push(SlotConflict {
                        slot: *slot,
                        busy: *busy,
                        overlap_minutes: overlap_minutes(start, end, busy.start, busy.end),
                    });
                }
            }
        }

        conflicts
    }
}

/// Merge overlapping or touching busy periods into a sorted, disjoint list.
///
/// Zero-length intervals are dropped: under strict overlap they can never
/// conflict with anything.
fn merge_busy_periods(busy: &[BusyInterval]) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let mut intervals: Vec<(DateTime<Utc>, DateTime<Utc>)> = busy
        .iter()
        .filter(|b| b.start < b.end)
        .map(|b| (b.start, b.end))
        .collect();

    intervals.sort_by_key(|&(start, end)| (start, end));

    let mut merged: Vec<(DateTime<Utc>, DateTime<Utc>)> = Vec::with_capacity(intervals.len());
    for (start, end) in intervals {
        if let Some(last) = merged.last_mut() {
            if start <= last.1 {
                last.1 = last.1.max(end);
                continue;
            }
        }
        merged.push((start, end));
    }

    merged
}

/// The slots that overlap none of `busy`, in input order.
///
/// With no busy intervals every slot is returned; with no slots the result is
/// empty.
pub fn filter_conflicting(slots: &[Slot], busy: &[BusyInterval]) -> Vec<Slot> {
    BusyCalendar::new(busy).filter_conflicting(slots)
}

/// Split `slots` into `(free, conflicting)` against `busy`.
pub fn partition(slots: &[Slot], busy: &[BusyInterval]) -> (Vec<Slot>, Vec<Slot>) {
    BusyCalendar::new(busy).partition(slots)
}

/// Flag every overlapping (slot, busy interval) pair.
pub fn find_slot_conflicts(slots: &[Slot], busy: &[BusyInterval]) -> Vec<SlotConflict> {
    BusyCalendar::new(busy).find_conflicts(slots)
}
