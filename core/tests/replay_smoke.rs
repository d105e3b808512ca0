use runtrack_core::replay::parse_event_log;
use runtrack_core::*;
use serde_json::json;

const DEG_PER_M: f64 = 1.0 / 111_194.93;

#[test]
fn smoke_steady_run() {
    // 200 s, 1 Hz fixes north at 3 m/s, a step every 350 ms
    let mut events = Vec::new();
    for s in 0..200i64 {
        events.push(json!({
            "kind": "position",
            "lat": 59.91 + (s as f64 * 3.0) * DEG_PER_M,
            "lon": 10.75,
            "accuracy": 6.0,
            "t": s * 1000
        }));
        let mut t = (s * 1000 + 349) / 350 * 350;
        while t < (s + 1) * 1000 {
            events.push(json!({"kind": "motion", "x": 0.5, "y": 1.0, "z": 14.0, "t": t}));
            t += 350;
        }
        events.push(json!({"kind": "tick"}));
    }

    let parsed = parse_event_log(&serde_json::to_string(&events).unwrap()).unwrap();
    let out = replay_events(&parsed, RunnerProfile::default(), TrackerConfig::default()).unwrap();

    assert!(out.rejected.is_none());
    assert!(out.issues.is_empty());
    assert_eq!(out.filter.accepted, 200);
    assert_eq!(out.summary.elapsed_seconds, 200);
    assert!((out.summary.distance_m - 597.0).abs() < 0.5);
    assert_eq!(out.summary.step_count, 572);
    assert_eq!(out.summary.cadence_spm, 180);
    assert_eq!(out.summary.calories, 43);

    let v: serde_json::Value = serde_json::to_value(&out).unwrap();
    assert_eq!(v["summary"]["path"].as_array().unwrap().len(), 200);
    let pace = v["summary"]["current_pace_sec_per_km"].as_f64().unwrap();
    assert!(pace > 320.0 && pace < 345.0);
}

#[test]
fn smoke_bad_event_reports_path() {
    let txt = r#"[{"kind": "tick"}, {"kind": "motion", "x": "oops", "y": 0, "z": 0, "t": 0}]"#;
    assert!(matches!(parse_event_log(txt), Err(StorageError::Json(_))));
}
