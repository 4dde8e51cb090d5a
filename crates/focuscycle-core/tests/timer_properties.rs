//! Behavioural tests for the timer engine.
//!
//! Drives the engine through its public API with explicit instants, covering
//! drift, pause, suspend catch-up, abort and daily rollover.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use focuscycle_core::{
    DurationConfig, Event, FocusKind, RecordingSink, TimerEngine, TimerState, Zone,
};
use proptest::prelude::*;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 8, 0, 0).unwrap()
}

fn secs(n: i64) -> Duration {
    Duration::seconds(n)
}

fn engine_with(durations: DurationConfig) -> (TimerEngine, RecordingSink) {
    let sink = RecordingSink::new();
    let engine = TimerEngine::new(durations, Zone::utc(), t0()).with_sink(sink.clone());
    (engine, sink)
}

fn default_engine() -> (TimerEngine, RecordingSink) {
    engine_with(DurationConfig::default())
}

proptest! {
    #[test]
    fn remaining_never_exceeds_total(steps in prop::collection::vec(0i64..400, 1..60)) {
        let (mut engine, _) = default_engine();
        let mut now = t0();
        engine.start(None, now);
        for step in steps {
            now += secs(step);
            engine.tick(now);
            prop_assert!(engine.remaining_seconds() <= engine.total_seconds());
            prop_assert!(engine.remaining_at(now) <= engine.total_seconds());
        }
    }

    #[test]
    fn skipped_ticks_fire_exactly_once_at_deadline(
        duration in 1u32..3000,
        steps in prop::collection::vec(1i64..250, 1..200),
    ) {
        let (mut engine, sink) = engine_with(DurationConfig {
            focus_seconds: duration,
            ..DurationConfig::default()
        });
        let deadline = t0() + secs(i64::from(duration));
        let mut now = t0();
        engine.start(Some(FocusKind::Focusing), now);

        let mut fired_at = None;
        for step in steps {
            now += secs(step);
            if let Some(Event::FocusCompleted { .. }) = engine.tick(now) {
                prop_assert!(fired_at.is_none());
                fired_at = Some(now);
            }
        }

        prop_assert!(sink.focus_completions() <= 1);
        match fired_at {
            Some(at) => prop_assert!(at >= deadline),
            None => prop_assert!(now < deadline),
        }
    }
}

#[test]
fn pause_freezes_remaining() {
    let (mut engine, _) = default_engine();
    engine.start(None, t0());
    engine.tick(t0() + secs(42));
    engine.pause(t0() + secs(42));
    let frozen = engine.remaining_seconds();

    engine.start(None, t0() + secs(42 + 3600));
    assert_eq!(engine.remaining_seconds(), frozen);
    assert_eq!(engine.remaining_at(t0() + secs(42 + 3600)), frozen);
}

#[test]
fn suspend_catch_up_fires_once() {
    let (mut engine, sink) = default_engine();
    engine.start(None, t0());
    let suspend_at = t0() + secs(1450);
    engine.tick(suspend_at);
    assert_eq!(engine.remaining_seconds(), 50);

    engine.on_suspend(suspend_at);
    engine.on_resume(suspend_at + secs(100));
    assert_eq!(engine.state(), TimerState::Idle);
    assert_eq!(sink.focus_completions(), 1);

    assert!(engine.on_resume(suspend_at + secs(100)).is_none());
    assert_eq!(sink.focus_completions(), 1);
}

#[test]
fn stop_before_completion_gives_no_credit() {
    let (mut engine, sink) = default_engine();
    engine.start(Some(FocusKind::Focusing), t0());
    engine.tick(t0() + secs(1499));
    engine.stop(t0() + secs(1499));
    engine.tick(t0() + secs(5000));

    assert_eq!(engine.completed_focus_sessions_total(), 0);
    assert_eq!(engine.daily_stats().sessions_completed_today, 0);
    assert_eq!(sink.focus_completions(), 0);
}

#[test]
fn daily_rollover_happens_once_per_day() {
    let (mut engine, sink) = default_engine();
    engine.start(None, t0());
    engine.tick(t0() + secs(1500));
    let after = t0() + secs(1500);

    for i in 0..100 {
        assert!(!engine.ensure_current_day(after + secs(i)));
        assert_eq!(engine.daily_stats().sessions_completed_today, 1);
        assert_eq!(engine.daily_stats().focus_seconds_today, 1500);
    }

    assert!(engine.ensure_current_day(after + Duration::days(1)));
    assert_eq!(engine.daily_stats().sessions_completed_today, 0);
    assert_eq!(engine.daily_stats().focus_seconds_today, 0);
    assert_eq!(engine.completed_focus_sessions_total(), 1);

    let rollovers = sink
        .events()
        .iter()
        .filter(|e| matches!(e, Event::DayRolledOver { .. }))
        .count();
    assert_eq!(rollovers, 1);
}

#[test]
fn full_focus_interval_one_tick_per_second() {
    let (mut engine, _) = default_engine();
    engine.start(Some(FocusKind::Focusing), t0());
    for i in 1..=1499 {
        assert!(engine.tick(t0() + secs(i)).is_none());
        assert!(engine.remaining_seconds() > 0);
    }
    assert!(engine.tick(t0() + secs(1500)).is_some());
    assert_eq!(engine.state(), TimerState::Idle);
    assert_eq!(engine.completed_focus_sessions_total(), 1);
}

#[test]
fn resume_after_pause_keeps_exact_remaining() {
    let (mut engine, _) = default_engine();
    engine.start(None, t0());
    engine.tick(t0() + secs(600));
    engine.pause(t0() + secs(600));
    assert_eq!(engine.remaining_seconds(), 900);

    engine.start(None, t0() + secs(601));
    assert_eq!(engine.remaining_seconds(), 900);
    assert_eq!(engine.end_at(), Some(t0() + secs(1501)));
}

#[test]
fn applying_durations_while_focusing_restarts_the_interval() {
    let (mut engine, sink) = default_engine();
    engine.start(None, t0());
    engine.tick(t0() + secs(300));
    let old_end = engine.end_at();

    engine.apply(
        DurationConfig {
            focus_seconds: 3000,
            ..DurationConfig::default()
        },
        t0() + secs(300),
    );
    assert_eq!(engine.state(), TimerState::Focusing);
    assert_eq!(engine.completed_focus_sessions_total(), 0);
    assert_eq!(engine.remaining_seconds(), 3000);
    assert_ne!(engine.end_at(), old_end);
    assert_eq!(engine.end_at(), Some(t0() + secs(3300)));

    // The old deadline no longer completes anything.
    assert!(engine.tick(t0() + secs(1500)).is_none());
    assert!(sink
        .events()
        .iter()
        .any(|e| matches!(e, Event::SessionStopped { .. })));
    assert!(sink
        .events()
        .iter()
        .any(|e| matches!(e, Event::ConfigApplied { .. })));
}

#[test]
fn cadence_suggests_long_break_every_fourth_session() {
    let (mut engine, _) = default_engine();
    let mut now = t0();
    let mut suggested = Vec::new();
    for _ in 0..8 {
        engine.start(Some(FocusKind::Focusing), now);
        now += secs(1500);
        engine.tick(now);
        suggested.push(engine.next_break_kind());
    }
    assert_eq!(
        suggested,
        vec![
            FocusKind::ShortBreak,
            FocusKind::ShortBreak,
            FocusKind::ShortBreak,
            FocusKind::LongBreak,
            FocusKind::ShortBreak,
            FocusKind::ShortBreak,
            FocusKind::ShortBreak,
            FocusKind::LongBreak,
        ]
    );
}

#[test]
fn fixed_offset_zone_decides_the_calendar_day() {
    let tokyo = Zone::Fixed(chrono::FixedOffset::east_opt(9 * 3600).unwrap());
    // 14:30 UTC is 23:30 in UTC+9.
    let start = Utc.with_ymd_and_hms(2026, 3, 10, 14, 30, 0).unwrap();
    let mut engine = TimerEngine::new(DurationConfig::default(), tokyo, start);
    assert_eq!(
        engine.daily_stats().day_key,
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    );

    engine.start(None, start);
    let done = start + secs(1500);
    match engine.tick(done) {
        Some(Event::FocusCompleted { metrics, .. }) => assert_eq!(metrics.local_hour, 23),
        other => panic!("expected completion, got {other:?}"),
    }

    assert!(engine.ensure_current_day(start + secs(1800)));
    assert_eq!(
        engine.daily_stats().day_key,
        NaiveDate::from_ymd_opt(2026, 3, 11).unwrap()
    );
}
