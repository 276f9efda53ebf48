//! Tests for candidate slot generation.

use slot_engine::{
    generate_slots, DateRange, DayFilter, DurationMinutes, MeetingDuration, ScheduleError, SlotPlan,
    TimeWindow,
};

fn plan(
    start: &str,
    end: &str,
    from: &str,
    to: &str,
    duration: MeetingDuration,
    filter: DayFilter,
) -> SlotPlan {
    SlotPlan::new(
        DateRange::parse(start, end).unwrap(),
        TimeWindow::parse(from, to).unwrap(),
        duration,
        filter,
    )
    .unwrap()
}

fn keys(plan: &SlotPlan) -> Vec<String> {
    plan.slots().map(|s| s.key()).collect()
}

#[test]
fn two_days_of_hourly_slots() {
    let plan = plan(
        "2024-01-01",
        "2024-01-02",
        "09:00",
        "11:00",
        MeetingDuration::Minutes(60),
        DayFilter::AllDays,
    );

    assert_eq!(
        keys(&plan),
        vec![
            "2024-01-01T09:00-10:00",
            "2024-01-01T10:00-11:00",
            "2024-01-02T09:00-10:00",
            "2024-01-02T10:00-11:00",
        ]
    );
}

#[test]
fn trailing_partial_period_is_dropped() {
    // 09:00-11:30 with 60-minute meetings: 09-10, 10-11, and 30 minutes left over.
    let plan = plan(
        "2024-01-01",
        "2024-01-01",
        "09:00",
        "11:30",
        MeetingDuration::Minutes(60),
        DayFilter::AllDays,
    );
    assert_eq!(
        keys(&plan),
        vec!["2024-01-01T09:00-10:00", "2024-01-01T10:00-11:00"]
    );
}

#[test]
fn window_shorter_than_meeting_yields_nothing() {
    let plan = plan(
        "2024-01-01",
        "2024-01-07",
        "09:00",
        "09:45",
        MeetingDuration::Hours(1),
        DayFilter::AllDays,
    );
    assert_eq!(plan.slots().count(), 0);
}

#[test]
fn window_exactly_one_meeting_long() {
    let plan = plan(
        "2024-01-01",
        "2024-01-01",
        "13:00",
        "14:30",
        MeetingDuration::Minutes(90),
        DayFilter::AllDays,
    );
    assert_eq!(keys(&plan), vec!["2024-01-01T13:00-14:30"]);
}

#[test]
fn weekday_filter_skips_the_weekend() {
    // 2024-01-05 is a Friday; 01-06/01-07 are the weekend; 01-08 is Monday.
    let plan = plan(
        "2024-01-05",
        "2024-01-08",
        "09:00",
        "10:00",
        MeetingDuration::Minutes(60),
        DayFilter::Weekdays,
    );
    assert_eq!(
        keys(&plan),
        vec!["2024-01-05T09:00-10:00", "2024-01-08T09:00-10:00"]
    );
}

#[test]
fn weekend_filter_keeps_only_the_weekend() {
    let plan = plan(
        "2024-01-05",
        "2024-01-08",
        "09:00",
        "10:00",
        MeetingDuration::Minutes(60),
        DayFilter::Weekends,
    );
    assert_eq!(
        keys(&plan),
        vec!["2024-01-06T09:00-10:00", "2024-01-07T09:00-10:00"]
    );
}

#[test]
fn weekend_filter_over_weekdays_only_is_empty() {
    let plan = plan(
        "2024-01-01",
        "2024-01-05",
        "09:00",
        "17:00",
        MeetingDuration::Minutes(30),
        DayFilter::Weekends,
    );
    assert!(plan.slots().next().is_none());
}

#[test]
fn window_ending_at_last_minute_of_day_does_not_wrap() {
    let plan = plan(
        "2024-01-01",
        "2024-01-01",
        "22:00",
        "23:59",
        MeetingDuration::Minutes(60),
        DayFilter::AllDays,
    );
    assert_eq!(keys(&plan), vec!["2024-01-01T22:00-23:00"]);
}

#[test]
fn odd_durations_tile_back_to_back() {
    let plan = plan(
        "2024-01-01",
        "2024-01-01",
        "09:00",
        "10:00",
        MeetingDuration::Minutes(25),
        DayFilter::AllDays,
    );
    assert_eq!(
        keys(&plan),
        vec!["2024-01-01T09:00-09:25", "2024-01-01T09:25-09:50"]
    );
}

#[test]
fn generation_is_restartable_and_deterministic() {
    let plan = plan(
        "2024-01-01",
        "2024-01-14",
        "08:00",
        "18:00",
        MeetingDuration::Minutes(45),
        DayFilter::Weekdays,
    );
    let first: Vec<_> = plan.slots().collect();
    let second: Vec<_> = plan.slots().collect();
    assert_eq!(first, second);
    // 10 weekdays * 13 slots of 45 minutes in a 10-hour window.
    assert_eq!(first.len(), 130);
}

#[test]
fn iterator_is_lazy_and_fused() {
    let plan = plan(
        "2024-01-01",
        "2024-12-31",
        "00:00",
        "23:00",
        MeetingDuration::Minutes(15),
        DayFilter::AllDays,
    );
    let mut iter = plan.slots();
    let first_three: Vec<_> = iter.by_ref().take(3).map(|s| s.key()).collect();
    assert_eq!(
        first_three,
        vec![
            "2024-01-01T00:00-00:15",
            "2024-01-01T00:15-00:30",
            "2024-01-01T00:30-00:45",
        ]
    );
    assert_eq!(iter.next().unwrap().key(), "2024-01-01T00:45-01:00");

    let mut short = generate_slots(
        &DateRange::parse("2024-01-01", "2024-01-01").unwrap(),
        &TimeWindow::parse("09:00", "10:00").unwrap(),
        DurationMinutes::new(60).unwrap(),
        DayFilter::AllDays,
    );
    assert!(short.next().is_some());
    assert!(short.next().is_none());
    assert!(short.next().is_none());
}

#[test]
fn zero_duration_plan_is_rejected() {
    let result = SlotPlan::new(
        DateRange::parse("2024-01-01", "2024-01-02").unwrap(),
        TimeWindow::parse("09:00", "11:00").unwrap(),
        MeetingDuration::Minutes(0),
        DayFilter::AllDays,
    );
    assert!(matches!(result, Err(ScheduleError::InvalidWindow(_))));
}
