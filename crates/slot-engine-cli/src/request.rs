//! JSON request and response shapes for the `slotplan` commands.
//!
//! The engine has no wire format of its own; these DTOs translate between the
//! JSON a request layer would send and the engine's typed values.

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use slot_engine::{
    AvailabilityReport, BusyInterval, DateAvailability, DateRange, DayFilter, MeetingDuration,
    Participant, ParticipantId, RankedSlot, ScheduleError, Slot, SlotConflict, SlotPlan,
    Submission, TimeWindow,
};

/// Meeting parameters as organizers submit them.
#[derive(Debug, Deserialize)]
pub struct MeetingRequest {
    pub start_date: String,
    pub end_date: String,
    pub time_range: TimeRangeRequest,
    pub duration: u32,
    #[serde(default)]
    pub duration_unit: DurationUnit,
    /// A filter name (`weekdays`) or a numeric code (`1`). All days if absent.
    #[serde(default)]
    pub event_days: Option<DayFilterValue>,
}

#[derive(Debug, Deserialize)]
pub struct TimeRangeRequest {
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationUnit {
    #[default]
    Minutes,
    Hours,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DayFilterValue {
    Code(u8),
    Name(String),
}

impl DayFilterValue {
    fn to_filter(&self) -> Result<DayFilter, ScheduleError> {
        match self {
            DayFilterValue::Code(code) => DayFilter::from_code(*code),
            DayFilterValue::Name(name) => name.parse(),
        }
    }
}

impl MeetingRequest {
    pub fn to_plan(&self) -> Result<SlotPlan, ScheduleError> {
        let duration = match self.duration_unit {
            DurationUnit::Minutes => MeetingDuration::Minutes(self.duration),
            DurationUnit::Hours => MeetingDuration::Hours(self.duration),
        };
        let day_filter = match &self.event_days {
            Some(value) => value.to_filter()?,
            None => DayFilter::AllDays,
        };
        SlotPlan::new(
            DateRange::parse(&self.start_date, &self.end_date)?,
            TimeWindow::parse(&self.time_range.start_time, &self.time_range.end_time)?,
            duration,
            day_filter,
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct SlotsRequest {
    pub meeting: MeetingRequest,
}

#[derive(Debug, Deserialize)]
pub struct RankRequest {
    pub meeting: MeetingRequest,
    #[serde(default)]
    pub submissions: Vec<SubmissionRequest>,
}

#[derive(Debug, Deserialize)]
pub struct SubmissionRequest {
    /// `{"user": ".."}`, `{"email": ".."}` or `{"anonymous": ".."}`.
    pub participant: ParticipantId,
    #[serde(default)]
    pub name: Option<String>,
    /// Slot keys and/or bare dates.
    #[serde(default)]
    pub entries: Vec<String>,
}

impl SubmissionRequest {
    pub fn to_submission(&self) -> Result<Submission, ScheduleError> {
        let mut participant = Participant::new(self.participant.clone());
        if let Some(name) = &self.name {
            participant = participant.with_display_name(name.clone());
        }
        Submission::parse(participant, self.entries.as_slice())
    }
}

#[derive(Debug, Deserialize)]
pub struct FilterRequest {
    /// Used to generate candidate slots when `slots` is absent.
    #[serde(default)]
    pub meeting: Option<MeetingRequest>,
    /// Explicit slot keys to check. Take precedence over `meeting`.
    #[serde(default)]
    pub slots: Option<Vec<String>>,
    #[serde(default)]
    pub busy: Vec<BusyRequest>,
}

/// A calendar event's time span: instants, zone-less wall-clock times, or
/// dates for all-day events.
#[derive(Debug, Deserialize)]
pub struct BusyRequest {
    pub start: String,
    pub end: String,
}

impl BusyRequest {
    /// Zone-less bounds are read in `offset`, the zone slots are placed in.
    pub fn to_interval(&self, offset: FixedOffset) -> Result<BusyInterval, ScheduleError> {
        BusyInterval::parse_at(&self.start, &self.end, offset)
    }
}

#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    pub meeting: MeetingRequest,
    pub date: String,
    pub start_time: String,
}

#[derive(Debug, Serialize)]
pub struct RankResponse<'a> {
    pub respondents: usize,
    pub top: Vec<Slot>,
    pub ranked: &'a [RankedSlot],
    pub by_date: &'a [DateAvailability],
}

impl<'a> From<&'a AvailabilityReport> for RankResponse<'a> {
    fn from(report: &'a AvailabilityReport) -> Self {
        Self {
            respondents: report.respondents,
            top: report.top().iter().map(|r| r.slot).collect(),
            ranked: &report.ranked,
            by_date: &report.by_date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FilterResponse {
    pub free: Vec<Slot>,
    pub conflicting: Vec<Slot>,
    pub conflicts: Vec<SlotConflict>,
}

/// The booked slot and the instants a calendar event for it should carry.
#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    pub slot: Slot,
    pub start: String,
    pub end: String,
    /// Whether the slot is one of the meeting's generated candidates.
    pub in_plan: bool,
}

impl ScheduleResponse {
    pub fn new(slot: Slot, plan: &SlotPlan, offset: FixedOffset) -> Self {
        let (start, end) = slot.interval_at(offset);
        Self {
            slot,
            start: start.with_timezone(&offset).to_rfc3339(),
            end: end.with_timezone(&offset).to_rfc3339(),
            in_plan: plan.slots().any(|candidate| candidate == slot),
        }
    }
}
