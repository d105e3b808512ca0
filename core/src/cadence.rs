// core/src/cadence.rs
use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::types::MotionSample;

pub const STEP_THRESHOLD_MS2: f64 = 12.5;  // above gravity (~9.8) to skip standing jitter
pub const STEP_DEBOUNCE_MS: i64 = 250;     // caps cadence at 240 spm
pub const STEP_WINDOW_MS: i64 = 5_000;
pub const WINDOW_TO_MINUTE: u32 = 12;      // 60 s / 5 s
pub const MIN_CADENCE_SPM: u32 = 40;       // at or below: noise

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CadenceConfig {
    pub threshold_ms2: f64,
    pub debounce_ms: i64,
    pub window_ms: i64,
    pub window_to_minute: u32,
    pub min_cadence_spm: u32,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            threshold_ms2: STEP_THRESHOLD_MS2,
            debounce_ms: STEP_DEBOUNCE_MS,
            window_ms: STEP_WINDOW_MS,
            window_to_minute: WINDOW_TO_MINUTE,
            min_cadence_spm: MIN_CADENCE_SPM,
        }
    }
}

/// Peak-threshold footstrike detector.
#[derive(Debug, Clone, Default)]
pub struct StepCadenceDetector {
    cfg: CadenceConfig,
    steps: VecDeque<i64>,
    last_step_ms: Option<i64>,
    step_count: u64,
    cadence_spm: u32,
}

impl StepCadenceDetector {
    pub fn new(cfg: CadenceConfig) -> Self {
        Self { cfg, ..Default::default() }
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn cadence_spm(&self) -> u32 {
        self.cadence_spm
    }

    /// Returns true when the sample registered a step.
    pub fn on_motion_sample(&mut self, sample: &MotionSample) -> bool {
        let now = sample.timestamp_ms;
        let debounced = self
            .last_step_ms
            .map_or(true, |last| now.saturating_sub(last) >= self.cfg.debounce_ms);

        let is_step = sample.magnitude() > self.cfg.threshold_ms2 && debounced;
        if is_step {
            self.step_count += 1;
            self.last_step_ms = Some(now);
            self.steps.push_back(now);
            log::debug!("step #{} at {} ms (|a|={:.2})", self.step_count, now, sample.magnitude());
        }

        // window is evaluated on every sample so cadence falls to 0 once steps stop
        let cutoff = now.saturating_sub(self.cfg.window_ms);
        while self.steps.front().map_or(false, |&t| t < cutoff) {
            self.steps.pop_front();
        }
        let cadence = self.steps.len() as u32 * self.cfg.window_to_minute;
        self.cadence_spm = if cadence <= self.cfg.min_cadence_spm { 0 } else { cadence };

        is_step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accel(mag_z: f64, t_ms: i64) -> MotionSample {
        MotionSample { accel_x: 0.0, accel_y: 0.0, accel_z: mag_z, timestamp_ms: t_ms }
    }

    #[test]
    fn eight_peaks_in_five_seconds() {
        let mut d = StepCadenceDetector::default();
        for i in 0..8 {
            assert!(d.on_motion_sample(&accel(14.0, i * 500)));
        }
        assert_eq!(d.step_count(), 8);
        assert_eq!(d.cadence_spm(), 96);
    }

    #[test]
    fn debounce_swallows_double_peaks() {
        let mut d = StepCadenceDetector::default();
        assert!(d.on_motion_sample(&accel(14.0, 0)));
        assert!(!d.on_motion_sample(&accel(14.0, 100)));
        assert!(!d.on_motion_sample(&accel(14.0, 249)));
        assert!(d.on_motion_sample(&accel(14.0, 250)));
        assert_eq!(d.step_count(), 2);
    }

    #[test]
    fn gravity_alone_is_not_a_step() {
        let mut d = StepCadenceDetector::default();
        for i in 0..50 {
            assert!(!d.on_motion_sample(&accel(9.81, i * 20)));
        }
        assert_eq!(d.step_count(), 0);
        assert_eq!(d.cadence_spm(), 0);
    }

    #[test]
    fn few_steps_read_as_noise() {
        let mut d = StepCadenceDetector::default();
        for i in 0..3 {
            d.on_motion_sample(&accel(13.0, i * 1_000));
        }
        // 3 * 12 = 36 <= 40
        assert_eq!(d.step_count(), 3);
        assert_eq!(d.cadence_spm(), 0);
    }

    #[test]
    fn cadence_drops_once_window_empties() {
        let mut d = StepCadenceDetector::default();
        for i in 0..10 {
            d.on_motion_sample(&accel(15.0, i * 300));
        }
        assert!(d.cadence_spm() > 0);
        d.on_motion_sample(&accel(9.8, 10_000));
        assert_eq!(d.cadence_spm(), 0);
        assert_eq!(d.step_count(), 10);
    }

    #[test]
    fn extreme_timestamps_do_not_overflow() {
        let mut d = StepCadenceDetector::default();
        assert!(d.on_motion_sample(&accel(14.0, i64::MIN)));
        assert!(d.on_motion_sample(&accel(14.0, i64::MAX)));
        // clock went backwards: inside the debounce, not a step
        assert!(!d.on_motion_sample(&accel(14.0, i64::MIN)));
        assert_eq!(d.step_count(), 2);
    }

    #[test]
    fn magnitude_uses_all_axes() {
        // |(8, 8, 5)| ≈ 12.4 < 12.5
        let mut d = StepCadenceDetector::default();
        let s = MotionSample { accel_x: 8.0, accel_y: 8.0, accel_z: 5.0, timestamp_ms: 0 };
        assert!(!d.on_motion_sample(&s));
        let s = MotionSample { accel_x: 8.0, accel_y: 8.0, accel_z: 6.0, timestamp_ms: 10 };
        assert!(d.on_motion_sample(&s));
    }
}
