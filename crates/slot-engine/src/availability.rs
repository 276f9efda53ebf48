//! Fold participant availability onto a slot universe and rank by consensus.
//!
//! Each participant declares availability as a list of entries: specific slot
//! keys, or bare dates meaning "any time that day within the meeting window".
//! A participant's latest submission replaces their earlier ones, so running
//! the same submissions through [`aggregate`] twice never double-counts.
//!
//! Entries naming slots outside the universe are ignored.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::slot::Slot;
use crate::window::{format_date, parse_date, TimeWindow};

/// Who a submission belongs to. Exactly one kind of identity per submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantId {
    /// An authenticated user id.
    User(String),
    /// An invited participant known only by email address.
    Email(String),
    /// An anonymous participant holding an invitation token.
    Anonymous(String),
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticipantId::User(id) => write!(f, "user:{}", id),
            ParticipantId::Email(email) => write!(f, "email:{}", email),
            ParticipantId::Anonymous(token) => write!(f, "anonymous:{}", token),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Participant {
    pub fn new(id: ParticipantId) -> Self {
        Self {
            id,
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// One declared piece of availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum AvailabilityEntry {
    /// Available for exactly this slot.
    Slot(Slot),
    /// Available for the whole meeting window on this date.
    Day(NaiveDate),
}

impl fmt::Display for AvailabilityEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvailabilityEntry::Slot(slot) => write!(f, "{}", slot),
            AvailabilityEntry::Day(date) => f.write_str(&format_date(*date)),
        }
    }
}

impl FromStr for AvailabilityEntry {
    type Err = ScheduleError;

    /// Parse a slot key (`2024-01-01T09:00-10:00`) or a bare date
    /// (`2024-01-01`).
    fn from_str(s: &str) -> Result<Self> {
        if s.contains('T') {
            s.parse().map(AvailabilityEntry::Slot)
        } else {
            parse_date(s).map(AvailabilityEntry::Day)
        }
    }
}

impl From<AvailabilityEntry> for String {
    fn from(entry: AvailabilityEntry) -> Self {
        entry.to_string()
    }
}

impl TryFrom<String> for AvailabilityEntry {
    type Error = ScheduleError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// A participant's complete availability declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub participant: Participant,
    pub entries: Vec<AvailabilityEntry>,
}

impl Submission {
    pub fn new(participant: Participant, entries: Vec<AvailabilityEntry>) -> Self {
        Self {
            participant,
            entries,
        }
    }

    /// Build a submission from raw slot-key or date strings.
    ///
    /// # Errors
    /// Returns `ScheduleError::MalformedEntry` for the first string that is
    /// neither a slot key nor a date.
    pub fn parse<S: AsRef<str>>(participant: Participant, entries: &[S]) -> Result<Self> {
        let entries = entries
            .iter()
            .map(|e| e.as_ref().parse())
            .collect::<Result<Vec<AvailabilityEntry>>>()?;
        Ok(Self::new(participant, entries))
    }
}

/// A slot annotated with who declared it available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedSlot {
    pub slot: Slot,
    pub participant_count: usize,
    /// Available participants, ordered by identity.
    pub participants: Vec<Participant>,
}

/// Rank `universe` by how many participants are available for each slot.
///
/// Submissions are reduced in two passes: first grouped by identity, keeping
/// only each identity's last submission; then each surviving submission adds
/// its participant once to every universe slot it covers. A `Day` entry
/// covers the universe slots on that date that lie within `window`.
///
/// The result holds every universe slot (duplicates collapsed), sorted by
/// participant count descending; ties keep universe order.
pub fn aggregate(
    universe: &[Slot],
    window: &TimeWindow,
    submissions: &[Submission],
) -> Vec<RankedSlot> {
    let mut ranked: Vec<RankedSlot> = Vec::with_capacity(universe.len());
    let mut index: HashMap<Slot, usize> = HashMap::with_capacity(universe.len());
    let mut by_date: HashMap<NaiveDate, Vec<usize>> = HashMap::new();

    for slot in universe {
        if index.contains_key(slot) {
            continue;
        }
        let position = ranked.len();
        index.insert(*slot, position);
        if window.contains(slot.start_time(), slot.end_time()) {
            by_date.entry(slot.date()).or_default().push(position);
        }
        ranked.push(RankedSlot {
            slot: *slot,
            participant_count: 0,
            participants: Vec::new(),
        });
    }

    // Last submission per identity wins.
    let mut latest: BTreeMap<&ParticipantId, &Submission> = BTreeMap::new();
    for submission in submissions {
        latest.insert(&submission.participant.id, submission);
    }

    for submission in latest.values() {
        let mut covered: BTreeSet<usize> = BTreeSet::new();
        for entry in &submission.entries {
            match entry {
                AvailabilityEntry::Slot(slot) => {
                    if let Some(&position) = index.get(slot) {
                        covered.insert(position);
                    }
                }
                AvailabilityEntry::Day(date) => {
                    if let Some(positions) = by_date.get(date) {
                        covered.extend(positions.iter().copied());
                    }
                }
            }
        }

        for position in covered {
            let target = &mut ranked[position];
            target.participant_count += 1;
            target.participants.push(submission.participant.clone());
        }
    }

    // `sort_by` is stable, so equal counts keep universe order.
    ranked.sort_by(|a, b| b.participant_count.cmp(&a.participant_count));
    ranked
}

/// The leading run of slots tied for the highest non-zero count.
///
/// Expects `ranked` in [`aggregate`] order. Empty when nobody is available
/// for any slot.
pub fn top_slots(ranked: &[RankedSlot]) -> &[RankedSlot] {
    let best = match ranked.first() {
        Some(first) if first.participant_count > 0 => first.participant_count,
        _ => return &[],
    };
    let tied = ranked
        .iter()
        .take_while(|r| r.participant_count == best)
        .count();
    &ranked[..tied]
}

/// Availability rolled up to one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateAvailability {
    pub date: NaiveDate,
    /// Distinct participants available for at least one slot that day.
    pub participant_count: usize,
    /// Candidate slots on that date.
    pub slot_count: usize,
}

/// Per-date rollup of a ranked list, ascending by date.
pub fn summarize_by_date(ranked: &[RankedSlot]) -> Vec<DateAvailability> {
    let mut days: BTreeMap<NaiveDate, (BTreeSet<&ParticipantId>, usize)> = BTreeMap::new();
    for entry in ranked {
        let (people, slots) = days.entry(entry.slot.date()).or_default();
        *slots += 1;
        people.extend(entry.participants.iter().map(|p| &p.id));
    }

    days.into_iter()
        .map(|(date, (people, slot_count))| DateAvailability {
            date,
            participant_count: people.len(),
            slot_count,
        })
        .collect()
}

/// Everything a caller typically shows for a meeting's availability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityReport {
    pub ranked: Vec<RankedSlot>,
    /// Distinct identities that submitted, including empty submissions.
    pub respondents: usize,
    pub by_date: Vec<DateAvailability>,
}

impl AvailabilityReport {
    pub fn build(universe: &[Slot], window: &TimeWindow, submissions: &[Submission]) -> Self {
        let ranked = aggregate(universe, window, submissions);
        let respondents = submissions
            .iter()
            .map(|s| &s.participant.id)
            .collect::<BTreeSet<_>>()
            .len();
        let by_date = summarize_by_date(&ranked);
        Self {
            ranked,
            respondents,
            by_date,
        }
    }

    /// See [`top_slots`].
    pub fn top(&self) -> &[RankedSlot] {
        top_slots(&self.ranked)
    }
}
