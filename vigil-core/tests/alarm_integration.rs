//! Integration tests for the alarm decision path
//!
//! Drives the engine the way the application does: readings ingested as
//! they arrive, the clock advancing between evaluations, configuration
//! and snooze state supplied fresh on every call.

use core::cell::Cell;

use vigil_core::{
    AlarmConfiguration, AlarmEngine, AlarmReason, Reading, ReadingStore, SnoozeController,
    Timestamp,
};

const BASE: Timestamp = 1_700_000_000_000;
const MINUTE: u64 = 60_000;

fn at(minute: u64) -> Timestamp {
    BASE + minute * MINUTE
}

/// Ingest a reading and evaluate at its arrival time
fn step(
    engine: &mut AlarmEngine<&Cell<Timestamp>>,
    clock: &Cell<Timestamp>,
    store: &mut ReadingStore,
    config: &AlarmConfiguration,
    snooze: &SnoozeController,
    minute: u64,
    value: f32,
) -> Option<AlarmReason> {
    clock.set(at(minute));
    store.ingest(Reading::new(value, at(minute)));
    engine.evaluate(store.as_slice(), config, snooze, false)
}

#[test]
fn day_with_a_high_excursion() {
    let clock = Cell::new(at(0));
    let mut engine = AlarmEngine::with_clock(&clock);
    let mut store: ReadingStore = ReadingStore::new();
    let config = AlarmConfiguration::default();
    let mut snooze = SnoozeController::new();

    // Quiet morning in range
    for (minute, value) in [(0, 110.0), (5, 112.0), (10, 115.0)] {
        assert_eq!(
            step(&mut engine, &clock, &mut store, &config, &snooze, minute, value),
            None
        );
    }

    // Climbing through the threshold
    assert_eq!(
        step(&mut engine, &clock, &mut store, &config, &snooze, 15, 150.0),
        None
    );
    assert_eq!(
        step(&mut engine, &clock, &mut store, &config, &snooze, 20, 185.0),
        Some(AlarmReason::HighGlucose)
    );

    // User snoozes for half an hour
    snooze.snooze(30, clock.get());
    assert_eq!(
        step(&mut engine, &clock, &mut store, &config, &snooze, 25, 195.0),
        None
    );
    // The UI badge still sees the condition
    assert_eq!(
        engine.evaluate(store.as_slice(), &config, &snooze, true),
        Some(AlarmReason::HighGlucose)
    );

    // Sensor drops out; snooze expires; data is now stale
    clock.set(at(25 + 35));
    assert_eq!(
        engine.evaluate(store.as_slice(), &config, &snooze, false),
        Some(AlarmReason::MissedReadings)
    );

    // Data returns, still high
    assert_eq!(
        step(&mut engine, &clock, &mut store, &config, &snooze, 65, 200.0),
        Some(AlarmReason::HighGlucose)
    );
}

#[test]
fn stale_data_without_no_data_alarm_is_silent() {
    let clock = Cell::new(at(0));
    let mut engine = AlarmEngine::with_clock(&clock);
    let mut store: ReadingStore = ReadingStore::new();
    let config = AlarmConfiguration {
        no_data_alarm: false,
        ..AlarmConfiguration::default()
    };
    let snooze = SnoozeController::new();

    step(&mut engine, &clock, &mut store, &config, &snooze, 0, 300.0);

    // 20 minutes idle with minutes_without_values = 15: even the extreme
    // high is suppressed, because nothing derived from stale data counts
    clock.set(at(20));
    assert_eq!(engine.evaluate(store.as_slice(), &config, &snooze, false), None);
}

#[test]
fn predicted_low_becomes_a_real_low() {
    let clock = Cell::new(at(0));
    let mut engine = AlarmEngine::with_clock(&clock);
    let mut store: ReadingStore = ReadingStore::new();
    let config = AlarmConfiguration::default();
    let snooze = SnoozeController::new();

    assert_eq!(
        step(&mut engine, &clock, &mut store, &config, &snooze, 0, 120.0),
        None
    );
    assert_eq!(
        step(&mut engine, &clock, &mut store, &config, &snooze, 5, 110.0),
        None
    );

    // Still in range, but the fitted slope reaches 80 inside the lead time
    match step(&mut engine, &clock, &mut store, &config, &snooze, 10, 100.0) {
        Some(AlarmReason::LowPredicted(minutes)) => {
            assert!(minutes <= config.minutes_to_predict_low, "got {minutes}")
        }
        other => panic!("expected LowPredicted, got {other:?}"),
    }

    // The drop keeps accelerating
    assert!(matches!(
        step(&mut engine, &clock, &mut store, &config, &snooze, 15, 85.0),
        Some(AlarmReason::LowPredicted(_))
    ));

    // And lands below the threshold
    assert_eq!(
        step(&mut engine, &clock, &mut store, &config, &snooze, 20, 75.0),
        Some(AlarmReason::LowGlucose)
    );
}

#[test]
fn smart_snooze_holds_fire_while_recovering() {
    let clock = Cell::new(at(0));
    let mut engine = AlarmEngine::with_clock(&clock);
    let mut store: ReadingStore = ReadingStore::new();
    let smart = AlarmConfiguration {
        smart_snooze: true,
        ..AlarmConfiguration::default()
    };
    let snooze = SnoozeController::new();

    step(&mut engine, &clock, &mut store, &smart, &snooze, 0, 230.0);
    step(&mut engine, &clock, &mut store, &smart, &snooze, 5, 220.0);

    // High but clearly descending: suppressed
    assert_eq!(
        step(&mut engine, &clock, &mut store, &smart, &snooze, 10, 210.0),
        None
    );

    // The same instant without smart snooze alarms
    let plain = AlarmConfiguration::default();
    assert_eq!(
        engine.evaluate(store.as_slice(), &plain, &snooze, false),
        Some(AlarmReason::HighGlucose)
    );
}

#[test]
fn alerts_disabled_is_absolute() {
    let clock = Cell::new(at(20));
    let mut engine = AlarmEngine::with_clock(&clock);
    let config = AlarmConfiguration {
        alerts_disabled: true,
        ..AlarmConfiguration::default()
    };
    let snooze = SnoozeController::new();

    let empty: [Reading; 0] = [];
    let extreme_high = [Reading::new(400.0, at(20))];
    let low_and_stale = [Reading::new(40.0, at(0))];

    for readings in [&empty[..], &extreme_high[..], &low_and_stale[..]] {
        assert_eq!(engine.evaluate(readings, &config, &snooze, false), None);
    }
}

#[test]
fn remote_snooze_sync_suppresses_and_releases() {
    let clock = Cell::new(at(10));
    let mut engine = AlarmEngine::with_clock(&clock);
    let mut store: ReadingStore = ReadingStore::new();
    let config = AlarmConfiguration::default();
    let mut snooze = SnoozeController::new();

    for (minute, value) in [(0, 250.0), (5, 252.0), (10, 251.0)] {
        store.ingest(Reading::new(value, at(minute)));
    }

    // Another device snoozed on the user's behalf
    let g0 = snooze.generation();
    snooze.set_until(at(40));
    assert_ne!(snooze.generation(), g0);
    assert_eq!(engine.evaluate(store.as_slice(), &config, &snooze, false), None);

    // Sync cleared it again
    snooze.disable();
    assert_eq!(
        engine.evaluate(store.as_slice(), &config, &snooze, false),
        Some(AlarmReason::HighGlucose)
    );
}

#[test]
fn session_start_transient_snooze_expires() {
    let clock = Cell::new(at(10));
    let mut engine = AlarmEngine::with_clock(&clock);
    let mut store: ReadingStore = ReadingStore::new();
    let config = AlarmConfiguration::default();
    let mut snooze = SnoozeController::new();

    for (minute, value) in [(0, 200.0), (5, 205.0), (10, 210.0)] {
        store.ingest(Reading::new(value, at(minute)));
    }

    // App start: 15 seconds of grace while data refreshes
    snooze.snooze_seconds(15, clock.get());
    assert_eq!(engine.evaluate(store.as_slice(), &config, &snooze, false), None);

    clock.set(clock.get() + 15_000);
    assert_eq!(
        engine.evaluate(store.as_slice(), &config, &snooze, false),
        Some(AlarmReason::HighGlucose)
    );
}

#[test]
fn verdicts_are_idempotent_and_notifier_ready() {
    let clock = Cell::new(at(10));
    let mut engine = AlarmEngine::with_clock(&clock);
    let mut store: ReadingStore = ReadingStore::new();
    let config = AlarmConfiguration::default();
    let snooze = SnoozeController::new();

    for (minute, value) in [(0, 190.0), (5, 192.0), (10, 191.0)] {
        store.ingest(Reading::new(value, at(minute)));
    }

    let first = engine.verdict(store.as_slice(), &config, &snooze, false);
    let second = engine.verdict(store.as_slice(), &config, &snooze, false);
    assert_eq!(first, second);

    assert!(first.active);
    let reason = first.reason.expect("active verdict carries a reason");
    assert_eq!(reason.to_string(), "High BG");
}
