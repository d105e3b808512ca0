// core/src/filter.rs
use serde::{Deserialize, Serialize};

use crate::types::GeoSample;

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;
pub const MAX_ACCURACY_M: f64 = 25.0;      // poor fix (tree cover / urban canyon)
pub const MIN_DISTANCE_M: f64 = 3.0;       // below this: stationary jitter
pub const MIN_SPEED_MS: f64 = 0.6;         // m/s
pub const MAX_SPEED_MS: f64 = 12.0;        // m/s, teleport after tunnel etc.

/// Great-circle distance in meters.
pub fn haversine_m(a: &GeoSample, b: &GeoSample) -> f64 {
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();
    let h = (dlat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FilterConfig {
    pub max_accuracy_m: f64,
    pub min_distance_m: f64,
    pub min_speed_ms: f64,
    pub max_speed_ms: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_accuracy_m: MAX_ACCURACY_M,
            min_distance_m: MIN_DISTANCE_M,
            min_speed_ms: MIN_SPEED_MS,
            max_speed_ms: MAX_SPEED_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    /// Reported horizontal accuracy worse than the limit.
    PoorAccuracy,
    /// Too little movement: drift while standing still.
    NearStationary,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum FixVerdict {
    Accepted { distance_m: f64, speed_ms: f64 },
    RejectedNoisy { kind: NoiseKind },
    RejectedImplausible { distance_m: f64, speed_ms: f64 },
}

impl FixVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, FixVerdict::Accepted { .. })
    }

    /// Rejections that should decay the displayed pace.
    pub fn is_near_stationary(&self) -> bool {
        matches!(
            self,
            FixVerdict::RejectedNoisy { kind: NoiseKind::NearStationary }
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            FixVerdict::Accepted { .. } => "accepted",
            FixVerdict::RejectedNoisy { .. } => "rejected_noisy",
            FixVerdict::RejectedImplausible { .. } => "rejected_implausible",
        }
    }
}

/// Verdict counters, kept so rejections stay discoverable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterStats {
    pub accepted: u64,
    pub rejected_noisy: u64,
    pub rejected_implausible: u64,
    pub last_verdict: Option<FixVerdict>,
}

impl FilterStats {
    pub fn record(&mut self, verdict: FixVerdict) {
        match verdict {
            FixVerdict::Accepted { .. } => self.accepted += 1,
            FixVerdict::RejectedNoisy { .. } => self.rejected_noisy += 1,
            FixVerdict::RejectedImplausible { .. } => self.rejected_implausible += 1,
        }
        self.last_verdict = Some(verdict);
    }
}

/// Stateless noise / plausibility gate for raw fixes.
#[derive(Debug, Clone, Default)]
pub struct GeoSampleFilter {
    cfg: FilterConfig,
}

impl GeoSampleFilter {
    pub fn new(cfg: FilterConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.cfg
    }

    pub fn accept(&self, candidate: &GeoSample, previous: Option<&GeoSample>) -> FixVerdict {
        // 1) poor fix
        if let Some(acc) = candidate.accuracy_m {
            if acc > self.cfg.max_accuracy_m {
                return FixVerdict::RejectedNoisy { kind: NoiseKind::PoorAccuracy };
            }
        }

        // 2) path origin
        let prev = match previous {
            Some(p) => p,
            None => return FixVerdict::Accepted { distance_m: 0.0, speed_ms: 0.0 },
        };

        // 3) implied speed
        let d = haversine_m(prev, candidate);
        let dt_s = candidate.timestamp_ms.saturating_sub(prev.timestamp_ms) as f64 / 1000.0;
        let v = if dt_s > 0.0 { d / dt_s } else { 0.0 };

        self.judge(d, v)
    }

    /// Rules 4-5 on an already measured segment (meters, m/s).
    pub fn judge(&self, distance_m: f64, speed_ms: f64) -> FixVerdict {
        // 4) moving, but not teleporting
        if speed_ms >= self.cfg.max_speed_ms {
            return FixVerdict::RejectedImplausible { distance_m, speed_ms };
        }
        if distance_m > self.cfg.min_distance_m || speed_ms > self.cfg.min_speed_ms {
            return FixVerdict::Accepted { distance_m, speed_ms };
        }

        // 5) jitter
        FixVerdict::RejectedNoisy { kind: NoiseKind::NearStationary }
    }
}
