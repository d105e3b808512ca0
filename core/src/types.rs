// core/src/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TrackerError;
use crate::filter::{haversine_m, FilterStats};

/// One raw position fix as delivered by the platform location stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoSample {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lon", alias = "lng")]
    pub longitude: f64,
    #[serde(default, alias = "alt")]
    pub altitude: Option<f64>,            // meter
    #[serde(default)]
    pub speed: Option<f64>,               // m/s, sensor-reported
    #[serde(default, alias = "accuracy")]
    pub accuracy_m: Option<f64>,          // horizontal accuracy, meter
    #[serde(alias = "t", alias = "timestamp")]
    pub timestamp_ms: i64,
}

impl GeoSample {
    pub fn new(latitude: f64, longitude: f64, timestamp_ms: i64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
            speed: None,
            accuracy_m: None,
            timestamp_ms,
        }
    }

    pub fn with_accuracy(mut self, accuracy_m: f64) -> Self {
        self.accuracy_m = Some(accuracy_m);
        self
    }
}

/// Accelerometer reading including gravity (m/s²).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    #[serde(alias = "x")]
    pub accel_x: f64,
    #[serde(alias = "y")]
    pub accel_y: f64,
    #[serde(alias = "z")]
    pub accel_z: f64,
    #[serde(alias = "t", alias = "timestamp")]
    pub timestamp_ms: i64,
}

impl MotionSample {
    pub fn magnitude(&self) -> f64 {
        (self.accel_x * self.accel_x + self.accel_y * self.accel_y + self.accel_z * self.accel_z)
            .sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePhase {
    Idle,
    Running,
    Paused,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionFault {
    SignalLost,
    Unavailable,
}

/// Everything a host can push into a session, in arrival order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SensorEvent {
    Position(GeoSample),
    PositionError {
        fault: PositionFault,
        #[serde(default)]
        message: Option<String>,
    },
    Motion(MotionSample),
    Tick,
}

/// Frozen result of a finished session. Handed to the save/upload boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub distance_m: f64,
    pub elapsed_seconds: u64,
    pub path: Vec<GeoSample>,
    pub calories: u32,
    pub average_pace_sec_per_km: f64,
    pub current_pace_sec_per_km: f64,
    pub cadence_spm: u32,
    pub step_count: u64,
    /// Path indices where recording resumed after a pause.
    #[serde(default)]
    pub segment_starts: Vec<usize>,
}

impl RunSummary {
    /// Haversine length of the path, summed from scratch. Gaps between
    /// segments (movement while paused) are not counted.
    pub fn path_length_m(&self) -> f64 {
        self.path
            .windows(2)
            .enumerate()
            .filter(|(i, _)| !self.segment_starts.contains(&(i + 1)))
            .map(|(_, w)| haversine_m(&w[0], &w[1]))
            .sum()
    }
}

/// Read-only view of the live session for the UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub phase: LifecyclePhase,
    pub elapsed_seconds: u64,
    pub distance_m: f64,
    pub current_pace_sec_per_km: f64,
    pub average_pace_sec_per_km: f64,
    pub cadence_spm: u32,
    pub step_count: u64,
    pub calories: u32,
    pub path_points: usize,
    pub current_location: Option<GeoSample>,
    pub last_accepted: Option<GeoSample>,
    pub filter: FilterStats,
    pub signal_lost: bool,
    #[serde(serialize_with = "serialize_issues")]
    pub issues: Vec<TrackerError>,
}

fn serialize_issues<S>(issues: &[TrackerError], s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.collect_seq(issues.iter().map(|e| e.to_string()))
}
