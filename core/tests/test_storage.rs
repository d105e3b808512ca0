use chrono::Utc;
use runtrack_core::config::SessionConfig;
use runtrack_core::{
    load_profile, save_profile, validate_for_save, GeoSample, JsonDirStore, MemoryStore,
    RunSummary, RunStore, RunnerProfile, StorageError, ValidationError,
};

fn summary(elapsed_seconds: u64, points: usize) -> RunSummary {
    let path: Vec<GeoSample> = (0..points)
        .map(|i| GeoSample::new(59.91 + i as f64 * 0.0001, 10.75, i as i64 * 5_000))
        .collect();
    let distance_m = path.windows(2).map(|w| runtrack_core::haversine_m(&w[0], &w[1])).sum();
    RunSummary {
        started_at: Utc::now(),
        distance_m,
        elapsed_seconds,
        path,
        calories: 42,
        average_pace_sec_per_km: 360.0,
        current_pace_sec_per_km: 355.0,
        cadence_spm: 168,
        step_count: 900,
        segment_starts: Vec::new(),
    }
}

#[test]
fn test_save_and_load_profile() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profile.json");

    let profile = RunnerProfile { name: Some("morning".to_string()), mass_kg: 82.5 };
    save_profile(&profile, &path).expect("could not save profile");

    let loaded = load_profile(&path).expect("could not load profile");
    assert_eq!(loaded, profile);
}

#[test]
fn missing_profile_falls_back_to_default_mass() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = load_profile(dir.path().join("nope.json")).unwrap();
    assert_eq!(loaded.mass_kg, 70.0);
}

#[test]
fn profile_accepts_weight_alias() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("p.json");
    std::fs::write(&path, r#"{"weight_kg": 64.0}"#).unwrap();
    assert_eq!(load_profile(&path).unwrap().mass_kg, 64.0);
}

#[test]
fn ninety_second_run_is_not_saved() {
    let cfg = SessionConfig::default();
    let err = validate_for_save(&summary(90, 2), &cfg).unwrap_err();
    assert_eq!(err, ValidationError::TooShort { elapsed_seconds: 90, minimum: 120 });

    let mut store = MemoryStore::new();
    assert!(matches!(
        store.save("short", &summary(90, 2), &cfg),
        Err(StorageError::Validation(ValidationError::TooShort { .. }))
    ));
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn single_point_run_is_not_saved() {
    let cfg = SessionConfig::default();
    let err = validate_for_save(&summary(600, 1), &cfg).unwrap_err();
    assert_eq!(err, ValidationError::TooFewPoints { points: 1, minimum: 2 });
    assert!(validate_for_save(&summary(120, 2), &cfg).is_ok());
}

#[test]
fn json_dir_store_roundtrip_and_listing() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonDirStore::open(dir.path().join("runs")).unwrap();
    let cfg = SessionConfig::default();

    let a = summary(1800, 40);
    let b = summary(600, 10);
    store.save("2026-10-02", &a, &cfg).unwrap();
    store.save("2026-10-01", &b, &cfg).unwrap();
    std::fs::write(dir.path().join("runs").join("notes.txt"), "ignored").unwrap();

    assert_eq!(store.list().unwrap(), vec!["2026-10-01", "2026-10-02"]);
    let loaded = store.load("2026-10-02").unwrap();
    assert_eq!(loaded.started_at, a.started_at);
    assert_eq!(loaded.elapsed_seconds, 1800);
    assert_eq!(loaded.path.len(), 40);
    assert_eq!((loaded.calories, loaded.cadence_spm, loaded.step_count), (42, 168, 900));
    assert!((loaded.distance_m - loaded.path_length_m()).abs() < 1e-6);

    assert!(matches!(store.load("missing"), Err(StorageError::NotFound(id)) if id == "missing"));
}

#[test]
fn memory_store_overwrites_by_id() {
    let mut store = MemoryStore::new();
    store.put("run", &summary(300, 3)).unwrap();
    store.put("run", &summary(400, 4)).unwrap();
    assert_eq!(store.list().unwrap(), vec!["run"]);
    assert_eq!(store.load("run").unwrap().elapsed_seconds, 400);
}
