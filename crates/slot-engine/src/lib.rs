//! # slot-engine
//!
//! Deterministic meeting-time arithmetic for group scheduling.
//!
//! Given a date range, a daily time window, a meeting length and a day filter,
//! the engine enumerates candidate slots, ranks them by how many participants
//! declared themselves available, and drops slots that collide with busy
//! intervals fetched from someone's calendar. Every operation is a pure
//! function of its inputs: nothing here does I/O or keeps state between calls.
//!
//! ## Quick start
//!
//! ```rust
//! use slot_engine::{
//!     filter_conflicting, BusyInterval, DateRange, DayFilter, MeetingDuration, Participant,
//!     ParticipantId, SlotPlan, Submission, TimeWindow,
//! };
//!
//! let plan = SlotPlan::new(
//!     DateRange::parse("2024-01-01", "2024-01-02").unwrap(),
//!     TimeWindow::parse("09:00", "11:00").unwrap(),
//!     MeetingDuration::Minutes(60),
//!     DayFilter::AllDays,
//! )
//! .unwrap();
//!
//! let slots: Vec<_> = plan.slots().collect();
//! assert_eq!(slots.len(), 4);
//! assert_eq!(slots[0].key(), "2024-01-01T09:00-10:00");
//!
//! let alice = Participant::new(ParticipantId::User("alice".into()));
//! let ranked = plan.rank(&[Submission::parse(alice, &["2024-01-01T10:00-11:00"]).unwrap()]);
//! assert_eq!(ranked[0].slot.key(), "2024-01-01T10:00-11:00");
//! assert_eq!(ranked[0].participant_count, 1);
//!
//! let busy = [BusyInterval::parse("2024-01-02T09:30:00Z", "2024-01-02T10:30:00Z").unwrap()];
//! let free = filter_conflicting(&slots, &busy);
//! assert_eq!(free.len(), 2);
//! ```
//!
//! ## Modules
//!
//! - [`window`]: Dates, times of day, day filters, durations, interval overlap
//! - [`slot`]: `Slot` and its canonical `YYYY-MM-DDTHH:MM-HH:MM` key
//! - [`generator`]: Enumerate a meeting's candidate slots
//! - [`availability`]: Fold participant availability onto slots and rank them
//! - [`conflict`]: Filter or flag slots that overlap busy intervals
//! - [`error`]: Error types

pub mod availability;
pub mod conflict;
pub mod error;
pub mod generator;
pub mod slot;
pub mod window;

pub use availability::{
    aggregate, summarize_by_date, top_slots, AvailabilityEntry, AvailabilityReport,
    DateAvailability, Participant, ParticipantId, RankedSlot, Submission,
};
pub use conflict::{
    filter_conflicting, find_slot_conflicts, partition, BusyCalendar, BusyInterval, SlotConflict,
};
pub use error::{Result, ScheduleError};
pub use generator::{generate_slots, SlotIter, SlotPlan};
pub use slot::Slot;
pub use window::{
    day_matches_filter, overlaps, DateRange, DayFilter, DurationMinutes, MeetingDuration,
    TimeWindow,
};
