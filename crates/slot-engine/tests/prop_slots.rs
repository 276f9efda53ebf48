//! Property-based tests for slot generation, ranking and conflict filtering.
//!
//! These check invariants that must hold for *any* valid meeting parameters,
//! not just the fixed scenarios in the other test files.

use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use proptest::prelude::*;
use slot_engine::{
    filter_conflicting, overlaps, partition, BusyInterval, DateRange, DayFilter,
    MeetingDuration, Participant, ParticipantId, RankedSlot, Slot, SlotPlan, Submission,
    TimeWindow,
};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_filter() -> impl Strategy<Value = DayFilter> {
    prop_oneof![
        Just(DayFilter::AllDays),
        Just(DayFilter::Weekdays),
        Just(DayFilter::Weekends),
    ]
}

fn minutes_to_time(m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(m / 60, m % 60, 0).unwrap()
}

/// A valid plan in 2024-2026 spanning up to three weeks.
fn arb_plan() -> impl Strategy<Value = SlotPlan> {
    (
        2024i32..=2026,
        1u32..=12,
        1u32..=28,
        0i64..=20,
        0u32..1380,
        1u32..=600,
        5u32..=180,
        arb_filter(),
    )
        .prop_map(|(y, m, d, span, from, len, dur, filter)| {
            let start = NaiveDate::from_ymd_opt(y, m, d).unwrap();
            let end = start + Duration::days(span);
            let to = (from + len).min(1439);
            SlotPlan::new(
                DateRange::new(start, end).unwrap(),
                TimeWindow::new(minutes_to_time(from), minutes_to_time(to)).unwrap(),
                MeetingDuration::Minutes(dur),
                filter,
            )
            .unwrap()
        })
}

/// Raw submissions: (participant number, [(is_day, index)]). Indices are
/// mapped onto the plan's universe or date range inside each test.
fn arb_raw_submissions() -> impl Strategy<Value = Vec<(u8, Vec<(bool, usize)>)>> {
    prop::collection::vec(
        (0u8..6, prop::collection::vec((any::<bool>(), 0usize..500), 0..6)),
        0..12,
    )
}

fn build_submissions(
    plan: &SlotPlan,
    universe: &[Slot],
    raw: &[(u8, Vec<(bool, usize)>)],
) -> Vec<Submission> {
    let days: Vec<NaiveDate> = plan.range.days().collect();
    raw.iter()
        .map(|(who, picks)| {
            let entries = picks
                .iter()
                .filter_map(|&(is_day, index)| {
                    if is_day {
                        Some(days[index % days.len()].to_string())
                    } else if universe.is_empty() {
                        None
                    } else {
                        Some(universe[index % universe.len()].key())
                    }
                })
                .collect::<Vec<_>>();
            Submission::parse(
                Participant::new(ParticipantId::User(format!("p{}", who))),
                &entries,
            )
            .unwrap()
        })
        .collect()
}

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Property 1: Every slot lies inside the window on an eligible date
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn slots_stay_inside_the_plan(plan in arb_plan()) {
        for slot in plan.slots() {
            prop_assert!(plan.range.contains(slot.date()), "{} outside range", slot);
            prop_assert!(plan.day_filter.matches(slot.date()), "{} fails filter", slot);
            prop_assert!(
                plan.window.contains(slot.start_time(), slot.end_time()),
                "{} outside window",
                slot
            );
            prop_assert_eq!(slot.duration_minutes(), i64::from(plan.duration.get()));
        }
    }
}

// ---------------------------------------------------------------------------
// Property 2: Slots on one date are sorted, contiguous and non-overlapping
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn slots_tile_each_day(plan in arb_plan()) {
        let slots: Vec<Slot> = plan.slots().collect();
        for pair in slots.windows(2) {
            prop_assert!(pair[0] < pair[1], "not sorted: {} then {}", pair[0], pair[1]);
            if pair[0].date() == pair[1].date() {
                prop_assert_eq!(pair[0].end_time(), pair[1].start_time());
                prop_assert!(!overlaps(
                    pair[0].start_time(),
                    pair[0].end_time(),
                    pair[1].start_time(),
                    pair[1].end_time()
                ));
            }
        }
        // Each date with slots starts at the window opening.
        let mut previous_date = None;
        for slot in &slots {
            if previous_date != Some(slot.date()) {
                prop_assert_eq!(slot.start_time(), plan.window.start_time());
                previous_date = Some(slot.date());
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Property 3: Generation is deterministic and keys round-trip
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn generation_is_deterministic(plan in arb_plan()) {
        let first: Vec<Slot> = plan.slots().collect();
        let second: Vec<Slot> = plan.slots().collect();
        prop_assert_eq!(&first, &second);
        for slot in &first {
            prop_assert_eq!(slot.key().parse::<Slot>().unwrap(), *slot);
        }
    }
}

// ---------------------------------------------------------------------------
// Property 4: Aggregating a duplicated submission set changes nothing
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn aggregation_is_idempotent(plan in arb_plan(), raw in arb_raw_submissions()) {
        let universe: Vec<Slot> = plan.slots().collect();
        let submissions = build_submissions(&plan, &universe, &raw);
        let mut doubled = submissions.clone();
        doubled.extend(submissions.iter().cloned());

        let once = plan.rank(&submissions);
        prop_assert_eq!(&once, &plan.rank(&doubled));
        prop_assert_eq!(once.len(), universe.len());

        // No slot counts more people than there are distinct identities.
        let people = raw
            .iter()
            .map(|(who, _)| *who)
            .collect::<std::collections::BTreeSet<_>>()
            .len();
        prop_assert!(once.iter().all(|r| r.participant_count <= people));
        prop_assert!(once.iter().all(|r| r.participant_count == r.participants.len()));
        for pair in once.windows(2) {
            prop_assert!(pair[0].participant_count >= pair[1].participant_count);
        }
    }
}

// ---------------------------------------------------------------------------
// Property 5: One more available participant never lowers a slot's rank
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn extra_availability_is_monotone(
        plan in arb_plan(),
        raw in arb_raw_submissions(),
        pick in 0usize..500,
    ) {
        let universe: Vec<Slot> = plan.slots().collect();
        prop_assume!(!universe.is_empty());
        let submissions = build_submissions(&plan, &universe, &raw);
        let target = universe[pick % universe.len()];

        let position = |ranked: &[RankedSlot]| {
            ranked.iter().position(|r| r.slot == target).unwrap()
        };
        let before = plan.rank(&submissions);

        let mut more = submissions.clone();
        more.push(
            Submission::parse(
                Participant::new(ParticipantId::Anonymous("newcomer".into())),
                &[target.key()],
            )
            .unwrap(),
        );
        let after = plan.rank(&more);

        prop_assert!(position(&after) <= position(&before));
        let count = |ranked: &[RankedSlot]| ranked[position(ranked)].participant_count;
        prop_assert_eq!(count(&after), count(&before) + 1);
    }
}

// ---------------------------------------------------------------------------
// Property 6: Conflict filter identity laws and partition soundness
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn conflict_filter_laws(
        plan in arb_plan(),
        raw_busy in prop::collection::vec((0i64..30 * 24 * 60, 0i64..600), 0..8),
    ) {
        let slots: Vec<Slot> = plan.slots().collect();
        let origin = Utc
            .from_utc_datetime(&plan.range.start().and_hms_opt(0, 0, 0).unwrap());
        let busy: Vec<BusyInterval> = raw_busy
            .iter()
            .map(|&(offset, len)| {
                let start = origin + Duration::minutes(offset);
                BusyInterval::new(start, start + Duration::minutes(len)).unwrap()
            })
            .collect();

        prop_assert_eq!(filter_conflicting(&slots, &[]), slots.clone());
        prop_assert!(filter_conflicting(&[], &busy).is_empty());

        let (free, conflicting) = partition(&slots, &busy);
        prop_assert_eq!(free.len() + conflicting.len(), slots.len());
        prop_assert_eq!(&free, &filter_conflicting(&slots, &busy));

        for slot in &free {
            let (start, end) = slot.interval();
            prop_assert!(busy.iter().all(|b| !overlaps(start, end, b.start(), b.end())));
        }
        for slot in &conflicting {
            let (start, end) = slot.interval();
            prop_assert!(busy.iter().any(|b| overlaps(start, end, b.start(), b.end())));
        }
    }
}
