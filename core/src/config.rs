// core/src/config.rs
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json as json;
use serde_path_to_error as spte;

use crate::cadence::CadenceConfig;
use crate::calories::CalorieConfig;
use crate::error::ConfigError;
use crate::filter::FilterConfig;
use crate::pace::PaceConfig;

pub const TICK_MS: u64 = 1_000;
pub const MIN_SAVE_SECONDS: u64 = 120;
pub const MIN_SAVE_POINTS: usize = 2;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    pub tick_ms: u64,
    pub min_save_seconds: u64,
    pub min_save_points: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_ms: TICK_MS,
            min_save_seconds: MIN_SAVE_SECONDS,
            min_save_points: MIN_SAVE_POINTS,
        }
    }
}

// --- top-level config ---

/// All tunables of the tracking engine. Partial JSON only overrides what it names.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackerConfig {
    pub filter: FilterConfig,
    pub pace: PaceConfig,
    pub cadence: CadenceConfig,
    pub calories: CalorieConfig,
    pub session: SessionConfig,
}

impl TrackerConfig {
    pub fn from_json_str(txt: &str) -> Result<Self, ConfigError> {
        let mut de = json::Deserializer::from_str(txt);
        let cfg: TrackerConfig = spte::deserialize(&mut de).map_err(|e| ConfigError::Parse {
            path: e.path().to_string(),
            message: e.inner().to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let f = &self.filter;
        if !(f.max_accuracy_m > 0.0) {
            return Err(ConfigError::Invalid("filter.max_accuracy_m must be > 0".into()));
        }
        if f.min_speed_ms >= f.max_speed_ms {
            return Err(ConfigError::Invalid(format!(
                "filter.min_speed_ms ({}) must be below filter.max_speed_ms ({})",
                f.min_speed_ms, f.max_speed_ms
            )));
        }

        let p = &self.pace;
        if p.window_ms <= 0 {
            return Err(ConfigError::Invalid("pace.window_ms must be > 0".into()));
        }
        if p.min_samples < 2 {
            return Err(ConfigError::Invalid("pace.min_samples must be >= 2".into()));
        }
        if p.stopped_speed_ms >= p.max_speed_ms {
            return Err(ConfigError::Invalid(
                "pace.stopped_speed_ms must be below pace.max_speed_ms".into(),
            ));
        }
        for (name, w) in [("pace.smooth_previous", p.smooth_previous), ("pace.smooth_computed", p.smooth_computed)] {
            if !(0.0..=1.0).contains(&w) {
                return Err(ConfigError::Invalid(format!("{name} must be within [0, 1], got {w}")));
            }
        }
        if p.stationary_decay < 1.0 {
            return Err(ConfigError::Invalid("pace.stationary_decay must be >= 1".into()));
        }

        let c = &self.cadence;
        if c.window_ms <= 0 || c.debounce_ms < 0 {
            return Err(ConfigError::Invalid("cadence windows must be positive".into()));
        }

        if self.session.tick_ms == 0 {
            return Err(ConfigError::Invalid("session.tick_ms must be > 0".into()));
        }
        Ok(())
    }
}

// --- file loading ---

/// Reads config from disk (JSON). A missing file yields the defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<TrackerConfig, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        log::info!("no config at {}, using defaults", path.display());
        return Ok(TrackerConfig::default());
    }
    let contents = std::fs::read_to_string(path)?;
    let cfg = TrackerConfig::from_json_str(&contents)?;
    log::info!("config loaded from {}", path.display());
    Ok(cfg)
}
