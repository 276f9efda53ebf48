//! Enumerate the candidate slots of a meeting.
//!
//! Every eligible date of the range is tiled back to back with slots of the
//! meeting's length, starting at the window's opening time. A trailing period
//! shorter than the meeting is dropped rather than emitted as a partial slot.

use chrono::{NaiveDate, NaiveTime};

use crate::availability::{aggregate, RankedSlot, Submission};
use crate::error::Result;
use crate::slot::Slot;
use crate::window::{DateRange, DayFilter, DurationMinutes, MeetingDuration, TimeWindow};

/// The parameters that define a meeting's slot universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotPlan {
    pub range: DateRange,
    pub window: TimeWindow,
    pub duration: DurationMinutes,
    pub day_filter: DayFilter,
}

impl SlotPlan {
    /// Bundle meeting parameters, reducing `duration` to minutes.
    ///
    /// # Errors
    /// Returns `ScheduleError::InvalidWindow` for a zero duration.
    pub fn new(
        range: DateRange,
        window: TimeWindow,
        duration: MeetingDuration,
        day_filter: DayFilter,
    ) -> Result<Self> {
        Ok(Self {
            range,
            window,
            duration: duration.to_minutes()?,
            day_filter,
        })
    }

    /// A fresh iterator over the plan's slots. Each call starts over.
    pub fn slots(&self) -> SlotIter {
        generate_slots(&self.range, &self.window, self.duration, self.day_filter)
    }

    /// Rank the plan's slots against participant submissions, reading
    /// whole-day entries as the plan's daily window.
    pub fn rank(&self, submissions: &[Submission]) -> Vec<RankedSlot> {
        let universe: Vec<Slot> = self.slots().collect();
        aggregate(&universe, &self.window, submissions)
    }
}

/// Lazily enumerate every slot of `duration` within `window` on each date of
/// `range` that passes `day_filter`, ordered by date then start time.
pub fn generate_slots(
    range: &DateRange,
    window: &TimeWindow,
    duration: DurationMinutes,
    day_filter: DayFilter,
) -> SlotIter {
    SlotIter {
        next_date: Some(range.start()),
        last_date: range.end(),
        window: *window,
        duration,
        day_filter,
        cursor: None,
    }
}

/// Iterator returned by [`generate_slots`] and [`SlotPlan::slots`].
///
/// A clone resumes from the same position; call [`SlotPlan::slots`] again to
/// start over.
#[derive(Debug, Clone)]
pub struct SlotIter {
    next_date: Option<NaiveDate>,
    last_date: NaiveDate,
    window: TimeWindow,
    duration: DurationMinutes,
    day_filter: DayFilter,
    /// Date being tiled and the start of its next slot.
    cursor: Option<(NaiveDate, NaiveTime)>,
}

impl Iterator for SlotIter {
    type Item = Slot;

    fn next(&mut self) -> Option<Slot> {
        loop {
            if let Some((date, start)) = self.cursor {
                let (end, wrapped) = start.overflowing_add_signed(self.duration.as_duration());
                if wrapped == 0 && end <= self.window.end_time() {
                    self.cursor = Some((date, end));
                    if let Ok(slot) = Slot::new(date, start, end) {
                        return Some(slot);
                    }
                }
                self.cursor = None;
            }

            let date = self.next_date.filter(|d| *d <= self.last_date)?;
            self.next_date = date.succ_opt();
            if self.day_filter.matches(date) {
                self.cursor = Some((date, self.window.start_time()));
            }
        }
    }
}

impl std::iter::FusedIterator for SlotIter {}
