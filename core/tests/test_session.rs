// core/tests/test_session.rs
use runtrack_core::{
    FixVerdict, GeoSample, LifecyclePhase, ManualPlatform, MotionSample, PositionFault,
    RunnerProfile, SensorEvent, SessionController, TrackerConfig, TrackerError,
};

const DEG_PER_M: f64 = 1.0 / 111_194.93;

fn fix(north_m: f64, t_ms: i64) -> GeoSample {
    GeoSample::new(59.91 + north_m * DEG_PER_M, 10.75, t_ms).with_accuracy(5.0)
}

fn peak(t_ms: i64) -> MotionSample {
    MotionSample { accel_x: 0.0, accel_y: 0.0, accel_z: 14.0, timestamp_ms: t_ms }
}

fn controller(platform: &ManualPlatform) -> SessionController<ManualPlatform> {
    SessionController::new(platform.clone(), RunnerProfile::with_mass(70.0), TrackerConfig::default())
}

/// Runs `secs` seconds at 3 m/s starting at `t0_s`, one fix + tick per second.
fn run_for(c: &mut SessionController<ManualPlatform>, t0_s: i64, secs: i64, start_m: f64) -> f64 {
    let mut north = start_m;
    for i in 0..secs {
        let t = t0_s + i;
        c.on_position(fix(north, t * 1000));
        c.on_tick();
        north += 3.0;
    }
    north
}

#[test]
fn start_acquires_every_sensor_and_stop_releases_them() {
    let platform = ManualPlatform::new();
    let mut c = controller(&platform);
    assert_eq!(c.phase(), LifecyclePhase::Idle);

    c.start().unwrap();
    let l = platform.ledger();
    assert_eq!((l.position_live, l.motion_live, l.ticker_live), (1, 1, 1));

    c.stop().unwrap();
    let l = platform.ledger();
    assert_eq!(l.live(), 0);
    assert_eq!(l.acquired, l.released);
}

#[test]
fn repeated_pause_resume_cycles_do_not_leak() {
    let platform = ManualPlatform::new();
    let mut c = controller(&platform);
    c.start().unwrap();
    c.start().unwrap(); // already running: no double subscription
    assert_eq!(platform.ledger().live(), 3);

    for _ in 0..5 {
        c.pause().unwrap();
        let l = platform.ledger();
        // clock stops, streams stay subscribed
        assert_eq!((l.position_live, l.motion_live, l.ticker_live), (1, 1, 0));
        c.resume().unwrap();
        assert_eq!(platform.ledger().live(), 3);
    }
    // position + motion once, ticker 1 + 5 re-arms
    assert_eq!(platform.ledger().acquired, 8);

    c.stop().unwrap();
    let l = platform.ledger();
    assert_eq!(l.live(), 0);
    assert_eq!(l.released, 8);
}

#[test]
fn permission_denied_keeps_controller_idle_and_retryable() {
    let mut platform = ManualPlatform::new();
    platform.motion_permission = false;
    let mut c = controller(&platform);

    assert_eq!(c.start(), Err(TrackerError::PermissionDenied));
    assert_eq!(c.phase(), LifecyclePhase::Idle);
    assert_eq!(platform.ledger().live(), 0);
    assert_eq!(c.snapshot().issues, vec![TrackerError::PermissionDenied]);
}

#[test]
fn unsupported_geolocation_releases_partial_subscriptions() {
    let platform = ManualPlatform { position_supported: false, ..ManualPlatform::new() };
    let mut c = controller(&platform);

    assert!(matches!(c.start(), Err(TrackerError::PositionUnavailable(_))));
    assert_eq!(c.phase(), LifecyclePhase::Idle);
    assert_eq!(platform.ledger().live(), 0);
    assert_eq!(c.pause(), Err(TrackerError::NotStarted));
    assert!(matches!(c.stop(), Err(TrackerError::NotStarted)));
}

#[test]
fn location_is_live_but_recording_is_gated() {
    let platform = ManualPlatform::new();
    let mut c = controller(&platform);

    // before start: location only
    assert_eq!(c.on_position(fix(0.0, 0)), None);
    assert_eq!(c.snapshot().current_location, Some(fix(0.0, 0)));
    assert_eq!(c.snapshot().path_points, 0);

    c.start().unwrap();
    let end = run_for(&mut c, 1, 10, 0.0);
    let before = c.snapshot();
    assert_eq!(before.path_points, 10);

    c.pause().unwrap();
    // late events while paused: location moves, nothing else does
    assert_eq!(c.on_position(fix(end + 50.0, 20_000)), None);
    assert!(!c.on_motion(&peak(20_000)));
    c.on_tick();

    let paused = c.snapshot();
    assert_eq!(paused.phase, LifecyclePhase::Paused);
    assert_eq!(paused.current_location, Some(fix(end + 50.0, 20_000)));
    assert_eq!(paused.distance_m, before.distance_m);
    assert_eq!(paused.path_points, before.path_points);
    assert_eq!(paused.elapsed_seconds, before.elapsed_seconds);
    assert_eq!(paused.step_count, 0);
}

#[test]
fn pause_twice_equals_pause_once() {
    let platform = ManualPlatform::new();
    let mut c = controller(&platform);
    c.start().unwrap();
    run_for(&mut c, 0, 5, 0.0);

    c.pause().unwrap();
    let once = c.snapshot();
    c.pause().unwrap();
    assert_eq!(c.snapshot(), once);
    assert_eq!(platform.ledger().ticker_live, 0);
}

#[test]
fn stop_twice_returns_the_same_frozen_summary() {
    let platform = ManualPlatform::new();
    let mut c = controller(&platform);
    c.start().unwrap();
    run_for(&mut c, 0, 150, 0.0);

    let first = c.stop().unwrap().clone();
    // late callbacks after stop are ignored
    c.on_position(fix(10_000.0, 999_000));
    c.on_tick();
    let second = c.stop().unwrap().clone();

    assert_eq!(first, second);
    assert_eq!(c.start(), Err(TrackerError::AlreadyStopped));
    assert_eq!(c.elapsed_seconds(), 150);
    assert_eq!(c.path().len(), 150);
}

#[test]
fn freezing_preserves_live_values_exactly() {
    let platform = ManualPlatform::new();
    let mut c = controller(&platform);
    c.start().unwrap();
    run_for(&mut c, 0, 200, 0.0);
    for i in 0..20 {
        c.on_motion(&peak(190_000 + i * 300));
    }

    let live = c.snapshot();
    let live_path = c.path().to_vec();
    let summary = c.stop().unwrap().clone();

    assert_eq!(summary.distance_m, live.distance_m);
    assert_eq!(summary.path, live_path);
    assert_eq!(summary.calories, live.calories);
    assert_eq!(summary.step_count, live.step_count);
    assert_eq!(summary.cadence_spm, live.cadence_spm);
    assert_eq!(summary.elapsed_seconds, live.elapsed_seconds);
    assert_eq!(summary.average_pace_sec_per_km, live.average_pace_sec_per_km);
    assert_eq!(summary.current_pace_sec_per_km, live.current_pace_sec_per_km);
}

#[test]
fn distance_is_monotonic_and_average_pace_follows_formula() {
    let platform = ManualPlatform::new();
    let mut c = controller(&platform);
    c.start().unwrap();

    let mut last = 0.0;
    let mut north = 0.0;
    for t in 0..300i64 {
        // mix of movement, jitter and a spike every 50 s
        let step = if t % 50 == 49 { 400.0 } else if (100..130).contains(&t) { 0.2 } else { 3.0 };
        north += step;
        c.on_position(fix(north, t * 1000));
        if step > 100.0 {
            north -= step; // spike was a glitch, runner did not move
        }
        c.on_tick();

        let s = c.snapshot();
        assert!(s.distance_m >= last);
        last = s.distance_m;
        if s.distance_m > 0.0 {
            let expected = (s.elapsed_seconds as f64 / (s.distance_m / 1000.0)).min(3599.0);
            assert!((s.average_pace_sec_per_km - expected).abs() < 1e-9);
        }
    }
    assert!(c.snapshot().filter.rejected_implausible > 0);
}

#[test]
fn signal_loss_is_a_warning_not_a_termination() {
    let platform = ManualPlatform::new();
    let mut c = controller(&platform);
    c.start().unwrap();
    run_for(&mut c, 0, 5, 0.0);

    c.handle_event(&SensorEvent::PositionError { fault: PositionFault::SignalLost, message: None });
    let s = c.snapshot();
    assert_eq!(s.phase, LifecyclePhase::Running);
    assert!(s.signal_lost);
    assert_eq!(s.issues, vec![TrackerError::SignalLost]);

    // signal returns, recording continues
    let v = c.on_position(fix(15.0 + 9.0, 8_000));
    assert!(matches!(v, Some(FixVerdict::Accepted { .. })));
    assert!(!c.snapshot().signal_lost);
    assert_eq!(c.take_issues().len(), 1);
    assert!(c.snapshot().issues.is_empty());
}

#[test]
fn stationary_jitter_decays_pace_toward_stopped() {
    let platform = ManualPlatform::new();
    let mut c = controller(&platform);
    c.start().unwrap();
    let end = run_for(&mut c, 0, 10, 0.0);
    let moving = c.snapshot().current_pace_sec_per_km;
    assert!((moving - 1000.0 / 3.0).abs() < 1.0);

    // standing at the last accepted fix, jitter 0.5 m
    let last = end - 3.0;
    let v = c.on_position(fix(last + 0.5, 11_000)).unwrap();
    assert!(v.is_near_stationary());
    let decayed = c.snapshot().current_pace_sec_per_km;
    assert!((decayed - moving * 1.2).abs() < 1e-9);

    for i in 0..30 {
        c.on_position(fix(last + 0.3, 12_000 + i * 1000));
    }
    assert_eq!(c.snapshot().current_pace_sec_per_km, 3599.0);
}

#[test]
fn motion_events_drive_steps_and_cadence() {
    let platform = ManualPlatform::new();
    let mut c = controller(&platform);
    c.start().unwrap();
    for i in 0..8 {
        c.handle_event(&SensorEvent::Motion(peak(i * 500)));
    }
    let s = c.snapshot();
    assert_eq!(s.step_count, 8);
    assert_eq!(s.cadence_spm, 96);
    assert_eq!(c.metrics().map(|m| m.steps()), Some(8));
}

#[test]
fn abandon_discards_and_allows_a_fresh_start() {
    let platform = ManualPlatform::new();
    let mut c = controller(&platform);
    c.start().unwrap();
    run_for(&mut c, 0, 30, 0.0);

    c.abandon();
    assert_eq!(c.phase(), LifecyclePhase::Idle);
    assert!(c.summary().is_none());
    assert_eq!(platform.ledger().live(), 0);

    c.start().unwrap();
    assert_eq!(c.snapshot().distance_m, 0.0);
    assert_eq!(c.snapshot().elapsed_seconds, 0);
}

#[test]
fn metrics_text_lists_fix_verdicts() {
    let platform = ManualPlatform::new();
    let mut c = controller(&platform);
    c.start().unwrap();
    run_for(&mut c, 0, 3, 0.0);
    c.on_position(fix(0.0, 10_000).with_accuracy(60.0));

    let txt = c.metrics_text().unwrap();
    assert!(txt.contains("runtrack_fixes_total{verdict=\"accepted\"} 3"));
    assert!(txt.contains("runtrack_fixes_total{verdict=\"rejected_noisy\"} 1"));
}

#[test]
fn movement_while_paused_is_not_recorded() {
    let platform = ManualPlatform::new();
    let mut c = controller(&platform);
    c.start().unwrap();
    let end = run_for(&mut c, 0, 10, 0.0); // last accepted fix at 27 m, t = 9 s
    let before = c.snapshot().distance_m;

    c.pause().unwrap();
    // walk 200 m in 100 s while paused
    for i in 1..=100 {
        c.on_position(fix(end - 3.0 + i as f64 * 2.0, 9_000 + i * 1_000));
    }
    c.resume().unwrap();

    // first fix after resume opens a new segment
    let v = c.on_position(fix(end + 200.0, 110_000));
    assert!(matches!(v, Some(FixVerdict::Accepted { .. })));
    assert!((c.snapshot().distance_m - before).abs() < 1e-9);

    c.on_position(fix(end + 203.0, 111_000));
    assert!((c.snapshot().distance_m - before - 3.0).abs() < 0.01);

    let summary = c.stop().unwrap().clone();
    assert_eq!(summary.segment_starts, vec![10]);
    assert_eq!(summary.path.len(), 12);
    assert!((summary.distance_m - summary.path_length_m()).abs() < 1e-6);
}

#[test]
fn fast_travel_while_paused_does_not_block_recording() {
    let platform = ManualPlatform::new();
    let mut c = controller(&platform);
    c.start().unwrap();
    let end = run_for(&mut c, 0, 10, 0.0);

    c.pause().unwrap();
    // 5 km in 300 s by car
    c.on_position(fix(end + 5_000.0, 310_000));
    c.resume().unwrap();

    // poor first fix: rejected, still waiting for a new origin
    let v = c.on_position(fix(end + 5_000.0, 311_000).with_accuracy(60.0));
    assert!(matches!(v, Some(FixVerdict::RejectedNoisy { .. })));

    run_for(&mut c, 312, 20, end + 5_003.0);
    let s = c.snapshot();
    assert_eq!(s.filter.rejected_implausible, 0);
    assert_eq!(s.path_points, 30);
    // 9 segments before the pause, 19 after
    assert!((s.distance_m - 28.0 * 3.0).abs() < 0.05, "distance {}", s.distance_m);
    // pace window restarted with the new segment
    assert!((s.current_pace_sec_per_km - 1000.0 / 3.0).abs() < 1.0);
}

#[test]
fn fresh_session_after_abandon_starts_clean() {
    let platform = ManualPlatform::new();
    let mut c = controller(&platform);
    c.start().unwrap();
    run_for(&mut c, 0, 30, 0.0);
    c.on_position_error(PositionFault::SignalLost, None);
    assert!(c.snapshot().signal_lost);

    c.abandon();
    c.start().unwrap();

    let s = c.snapshot();
    assert!(s.issues.is_empty());
    assert!(!s.signal_lost);
    let txt = c.metrics_text().unwrap();
    assert!(txt.contains("runtrack_distance_meters 0"));
    assert!(!txt.contains("verdict=\"accepted\""));
    assert!(!txt.contains("kind=\"signal_lost\""));
}
