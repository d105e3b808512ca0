// core/src/lib.rs
//! Runtrack core: turns raw position fixes and accelerometer samples into a live,
//! trustworthy record of a run (distance, pace, cadence, calories, path).
//!
//! Hosts own the event loop. They push sensor events into a [`SessionController`],
//! which owns all mutable session state and every sensor subscription.

pub mod cadence;
pub mod calories;
pub mod config;
pub mod distance;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod models;
pub mod pace;
pub mod replay;
pub mod sensors;
pub mod session;
pub mod storage;
pub mod types;

#[cfg(feature = "python")]
mod py;

pub use cadence::StepCadenceDetector;
pub use calories::estimate_calories;
pub use config::{load_config, TrackerConfig};
pub use distance::DistanceAccumulator;
pub use error::{ConfigError, StorageError, TrackerError, ValidationError};
pub use filter::{haversine_m, FixVerdict, GeoSampleFilter, NoiseKind};
pub use models::RunnerProfile;
pub use pace::{average_pace, PaceEstimator};
pub use replay::{load_event_log, replay_events, ReplayOutcome};
pub use sensors::{ManualPlatform, SensorHandle, SensorKind, SensorPlatform};
pub use session::SessionController;
pub use storage::{load_profile, save_profile, validate_for_save, JsonDirStore, MemoryStore, RunStore};
pub use types::{
    GeoSample, LifecyclePhase, MotionSample, PositionFault, RunSummary, SensorEvent,
    SessionSnapshot,
};
