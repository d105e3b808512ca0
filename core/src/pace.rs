// core/src/pace.rs
//! Smoothed instantaneous pace over a time-weighted sliding window.
//!
//! Two independent paths move the displayed pace:
//! - `update` blends a freshly computed pace into the previous value (tracking while moving),
//! - `decay` stretches the current pace on near-stationary rejections (fast "stopping" feedback).

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::types::GeoSample;

pub const PACE_WINDOW_MS: i64 = 30_000;
pub const MIN_WINDOW_SAMPLES: usize = 3;
pub const SPIKE_SPEED_MS: f64 = 15.0;     // per segment, coarser than the fix filter
pub const WEIGHT_OLDEST: f64 = 1.0;
pub const WEIGHT_NEWEST: f64 = 2.0;
pub const STOPPED_SPEED_MS: f64 = 0.5;    // at or below: stopped
pub const MAX_PACE_SPEED_MS: f64 = 10.0;  // at or above: ignored
pub const SMOOTH_PREVIOUS: f64 = 0.8;
pub const SMOOTH_COMPUTED: f64 = 0.2;
pub const STATIONARY_DECAY: f64 = 1.2;
/// "Effectively infinite" pace, sec/km.
pub const PACE_CAP_SEC_PER_KM: f64 = 3599.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PaceConfig {
    pub window_ms: i64,
    pub min_samples: usize,
    pub spike_speed_ms: f64,
    pub weight_oldest: f64,
    pub weight_newest: f64,
    pub stopped_speed_ms: f64,
    pub max_speed_ms: f64,
    pub smooth_previous: f64,
    pub smooth_computed: f64,
    pub stationary_decay: f64,
    pub pace_cap_sec_per_km: f64,
}

impl Default for PaceConfig {
    fn default() -> Self {
        Self {
            window_ms: PACE_WINDOW_MS,
            min_samples: MIN_WINDOW_SAMPLES,
            spike_speed_ms: SPIKE_SPEED_MS,
            weight_oldest: WEIGHT_OLDEST,
            weight_newest: WEIGHT_NEWEST,
            stopped_speed_ms: STOPPED_SPEED_MS,
            max_speed_ms: MAX_PACE_SPEED_MS,
            smooth_previous: SMOOTH_PREVIOUS,
            smooth_computed: SMOOTH_COMPUTED,
            stationary_decay: STATIONARY_DECAY,
            pace_cap_sec_per_km: PACE_CAP_SEC_PER_KM,
        }
    }
}

/// Average pace in sec/km from elapsed time and distance, capped.
/// Zero distance gives 0 (no pace yet).
pub fn average_pace(elapsed_seconds: u64, distance_m: f64, cap_sec_per_km: f64) -> f64 {
    if !(distance_m > 0.0) {
        return 0.0;
    }
    let pace = elapsed_seconds as f64 / (distance_m / 1000.0);
    pace.min(cap_sec_per_km)
}

#[derive(Debug, Clone, Default)]
pub struct PaceEstimator {
    cfg: PaceConfig,
    window: VecDeque<GeoSample>,
    current: f64, // sec/km, 0 = stopped / unknown
}

impl PaceEstimator {
    pub fn new(cfg: PaceConfig) -> Self {
        Self { cfg, window: VecDeque::new(), current: 0.0 }
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    pub fn reset(&mut self) {
        self.window.clear();
        self.current = 0.0;
    }

    /// Feed an accepted fix; returns the displayed pace (sec/km).
    pub fn update(&mut self, accepted: &GeoSample) -> f64 {
        self.window.push_back(*accepted);
        let cutoff = accepted.timestamp_ms.saturating_sub(self.cfg.window_ms);
        while self.window.front().map_or(false, |s| s.timestamp_ms < cutoff) {
            self.window.pop_front();
        }

        if self.window.len() < self.cfg.min_samples {
            return self.current;
        }

        let speed = match self.weighted_speed() {
            Some(v) => v,
            None => return self.current,
        };

        if speed <= self.cfg.stopped_speed_ms {
            self.current = 0.0;
        } else if speed < self.cfg.max_speed_ms {
            let computed = 1000.0 / speed;
            self.current = if self.current > 0.0 {
                self.current * self.cfg.smooth_previous + computed * self.cfg.smooth_computed
            } else {
                computed
            };
        }
        self.current
    }

    /// Near-stationary rejection: push pace toward "slow".
    pub fn decay(&mut self) -> f64 {
        if self.current > 0.0 {
            self.current = (self.current * self.cfg.stationary_decay).min(self.cfg.pace_cap_sec_per_km);
        }
        self.current
    }

    /// Time-weighted mean segment speed over the window; None if no usable segment.
    ///
    /// A segment's weight grows linearly with where its end falls in the window:
    /// `weight_oldest` at the oldest fix, `weight_newest` at the newest.
    fn weighted_speed(&self) -> Option<f64> {
        let (oldest, newest) = match (self.window.front(), self.window.back()) {
            (Some(o), Some(n)) if self.window.len() >= 2 => (o.timestamp_ms, n.timestamp_ms),
            _ => return None,
        };
        let span_ms = newest.saturating_sub(oldest) as f64;

        let mut weighted = 0.0;
        let mut weights = 0.0;
        for (a, b) in self.window.iter().zip(self.window.iter().skip(1)) {
            let dt_s = b.timestamp_ms.saturating_sub(a.timestamp_ms) as f64 / 1000.0;
            if dt_s <= 0.0 {
                continue;
            }
            let v = crate::filter::haversine_m(a, b) / dt_s;
            if v >= self.cfg.spike_speed_ms {
                continue;
            }
            let pos = if span_ms > 0.0 {
                (b.timestamp_ms.saturating_sub(oldest) as f64 / span_ms).clamp(0.0, 1.0)
            } else {
                1.0
            };
            let w = self.cfg.weight_oldest + (self.cfg.weight_newest - self.cfg.weight_oldest) * pos;
            weighted += v * w;
            weights += w;
        }

        if weights > 0.0 { Some(weighted / weights) } else { None }
    }
}
