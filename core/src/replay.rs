// core/src/replay.rs
use std::path::Path;

use serde::Serialize;
use serde_json as json;
use serde_path_to_error as spte;

use crate::config::TrackerConfig;
use crate::error::{StorageError, TrackerError};
use crate::filter::FilterStats;
use crate::models::RunnerProfile;
use crate::sensors::ManualPlatform;
use crate::session::SessionController;
use crate::storage::validate_for_save;
use crate::types::{RunSummary, SensorEvent};

#[derive(Debug, Clone, Serialize)]
pub struct ReplayOutcome {
    pub summary: RunSummary,
    pub filter: FilterStats,
    pub issues: Vec<String>,
    /// Why the save boundary would refuse this run, if it would.
    pub rejected: Option<String>,
    /// Prometheus text of the replayed session.
    #[serde(skip)]
    pub metrics: Option<String>,
}

/// Parse a JSON array of sensor events.
pub fn parse_event_log(txt: &str) -> Result<Vec<SensorEvent>, StorageError> {
    let mut de = json::Deserializer::from_str(txt);
    spte::deserialize(&mut de).map_err(|e| {
        log::warn!("event log parse error at {}", e.path());
        StorageError::Json(e.into_inner())
    })
}

pub fn load_event_log(path: impl AsRef<Path>) -> Result<Vec<SensorEvent>, StorageError> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    let events = parse_event_log(&contents)?;
    log::info!("{} events read from {}", events.len(), path.as_ref().display());
    Ok(events)
}

/// Drive a fresh session through start, every event in order, and stop.
pub fn replay_events(
    events: &[SensorEvent],
    profile: RunnerProfile,
    cfg: TrackerConfig,
) -> Result<ReplayOutcome, TrackerError> {
    let save_cfg = cfg.session.clone();
    let mut controller = SessionController::new(ManualPlatform::new(), profile, cfg);
    controller.start()?;

    for ev in events {
        controller.handle_event(ev);
    }

    let filter = controller.snapshot().filter;
    let issues = controller.take_issues().iter().map(|e| e.to_string()).collect();
    let summary = controller.stop()?.clone();
    let rejected = validate_for_save(&summary, &save_cfg).err().map(|e| e.to_string());
    let metrics = controller.metrics_text();

    Ok(ReplayOutcome { summary, filter, issues, rejected, metrics })
}
