// core/src/session.rs
//! Session lifecycle: `Idle → Running ⇄ Paused → Stopped`.
//!
//! The controller is the single writer of session state. Host callbacks always go
//! through `&mut self` and read the live phase on every call, so an event that
//! arrives after `pause()`/`stop()` can never mutate the recorded effort.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::cadence::StepCadenceDetector;
use crate::calories::estimate_calories_with;
use crate::config::TrackerConfig;
use crate::distance::DistanceAccumulator;
use crate::error::TrackerError;
use crate::filter::{FilterStats, FixVerdict, GeoSampleFilter};
use crate::metrics::TrackerMetrics;
use crate::models::RunnerProfile;
use crate::pace::{average_pace, PaceEstimator};
use crate::sensors::{SensorHandle, SensorPlatform};
use crate::types::{
    GeoSample, LifecyclePhase, MotionSample, PositionFault, RunSummary, SensorEvent,
    SessionSnapshot,
};

/// Mutable aggregate of a live session.
#[derive(Debug, Clone)]
struct SessionState {
    started_at: DateTime<Utc>,
    elapsed_ms: u64,
    distance: DistanceAccumulator,
    pace: PaceEstimator,
    cadence: StepCadenceDetector,
    average_pace: f64,
    calories: u32,
    stats: FilterStats,
    // next accepted fix opens a new path segment instead of bridging the pause
    resume_anchor: bool,
}

impl SessionState {
    fn new(cfg: &TrackerConfig) -> Self {
        Self {
            started_at: Utc::now(),
            elapsed_ms: 0,
            distance: DistanceAccumulator::new(),
            pace: PaceEstimator::new(cfg.pace.clone()),
            cadence: StepCadenceDetector::new(cfg.cadence.clone()),
            average_pace: 0.0,
            calories: 0,
            stats: FilterStats::default(),
            resume_anchor: false,
        }
    }

    fn elapsed_seconds(&self) -> u64 {
        self.elapsed_ms / 1000
    }
}

pub struct SessionController<P: SensorPlatform> {
    platform: P,
    cfg: TrackerConfig,
    profile: RunnerProfile,
    filter: GeoSampleFilter,
    phase: LifecyclePhase,
    state: Option<SessionState>,
    summary: Option<RunSummary>,
    // owned subscriptions; `Some` means live
    position: Option<SensorHandle>,
    motion: Option<SensorHandle>,
    ticker: Option<SensorHandle>,
    current_location: Option<GeoSample>,
    signal_lost: bool,
    issues: Vec<TrackerError>,
    metrics: Option<TrackerMetrics>,
}

impl<P: SensorPlatform> SessionController<P> {
    pub fn new(platform: P, profile: RunnerProfile, cfg: TrackerConfig) -> Self {
        let metrics = fresh_metrics();
        Self {
            platform,
            filter: GeoSampleFilter::new(cfg.filter.clone()),
            cfg,
            profile,
            phase: LifecyclePhase::Idle,
            state: None,
            summary: None,
            position: None,
            motion: None,
            ticker: None,
            current_location: None,
            signal_lost: false,
            issues: Vec::new(),
            metrics,
        }
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == LifecyclePhase::Running
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.cfg
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    // --- lifecycle ---

    /// Start a new session, or resume a paused one.
    pub fn start(&mut self) -> Result<(), TrackerError> {
        match self.phase {
            LifecyclePhase::Running => Ok(()),
            LifecyclePhase::Stopped => Err(TrackerError::AlreadyStopped),
            LifecyclePhase::Paused => {
                if let Err(e) = self.arm() {
                    self.record_issue(e.clone());
                    return Err(e);
                }
                if let Some(state) = self.state.as_mut() {
                    state.resume_anchor = true;
                }
                self.phase = LifecyclePhase::Running;
                log::info!("session resumed");
                Ok(())
            }
            LifecyclePhase::Idle => {
                // a fresh session does not inherit warnings of an abandoned one
                self.issues.clear();
                self.signal_lost = false;
                let armed = self
                    .platform
                    .request_motion_permission()
                    .and_then(|_| self.arm());
                if let Err(e) = armed {
                    // partial acquisitions go back immediately; stay Idle so start() can be retried
                    self.release_all();
                    self.record_issue(e.clone());
                    return Err(e);
                }
                self.state = Some(SessionState::new(&self.cfg));
                self.phase = LifecyclePhase::Running;
                log::info!("session started (mass_kg={})", self.profile.effective_mass_kg());
                Ok(())
            }
        }
    }

    pub fn resume(&mut self) -> Result<(), TrackerError> {
        self.start()
    }

    /// Stop the clock. Sensor streams stay subscribed; their events are ignored until resume.
    pub fn pause(&mut self) -> Result<(), TrackerError> {
        match self.phase {
            LifecyclePhase::Idle => Err(TrackerError::NotStarted),
            LifecyclePhase::Stopped => Err(TrackerError::AlreadyStopped),
            LifecyclePhase::Paused => Ok(()),
            LifecyclePhase::Running => {
                self.ticker = None;
                self.phase = LifecyclePhase::Paused;
                log::info!("session paused at {} s", self.elapsed_seconds());
                Ok(())
            }
        }
    }

    /// Release every sensor and freeze the session. Calling it again returns the same summary.
    pub fn stop(&mut self) -> Result<&RunSummary, TrackerError> {
        match self.phase {
            LifecyclePhase::Idle => Err(TrackerError::NotStarted),
            LifecyclePhase::Stopped => self.summary.as_ref().ok_or(TrackerError::AlreadyStopped),
            LifecyclePhase::Running | LifecyclePhase::Paused => {
                self.release_all();
                let state = self.state.take().ok_or(TrackerError::NotStarted)?;
                let summary = self.freeze(state);
                log::info!(
                    "session stopped: {:.0} m in {} s, {} points, {} kcal",
                    summary.distance_m,
                    summary.elapsed_seconds,
                    summary.path.len(),
                    summary.calories
                );
                self.phase = LifecyclePhase::Stopped;
                let frozen: &RunSummary = self.summary.insert(summary);
                Ok(frozen)
            }
        }
    }

    /// Discard the session without producing a summary; the controller returns to Idle.
    pub fn abandon(&mut self) {
        self.release_all();
        self.state = None;
        self.summary = None;
        self.issues.clear();
        self.signal_lost = false;
        self.metrics = fresh_metrics();
        self.phase = LifecyclePhase::Idle;
        log::info!("session abandoned");
    }

    pub fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }

    // --- sensor callbacks ---

    pub fn handle_event(&mut self, event: &SensorEvent) {
        match event {
            SensorEvent::Position(sample) => {
                self.on_position(*sample);
            }
            SensorEvent::PositionError { fault, message } => {
                self.on_position_error(*fault, message.as_deref());
            }
            SensorEvent::Motion(sample) => {
                self.on_motion(sample);
            }
            SensorEvent::Tick => self.on_tick(),
        }
    }

    /// Position callback. Always updates the live location; only a running session records it.
    pub fn on_position(&mut self, sample: GeoSample) -> Option<FixVerdict> {
        self.current_location = Some(sample);
        self.signal_lost = false;

        if self.phase != LifecyclePhase::Running {
            return None;
        }
        let state = self.state.as_mut()?;

        // after a resume the first fix is a new origin: movement while paused is not recorded
        let previous = if state.resume_anchor { None } else { state.distance.last() };
        let verdict = self.filter.accept(&sample, previous);
        state.stats.record(verdict);
        if let Some(m) = &self.metrics {
            m.fix(verdict.label());
        }

        match verdict {
            FixVerdict::Accepted { distance_m, .. } => {
                if state.resume_anchor {
                    state.resume_anchor = false;
                    state.distance.push_segment_start(sample);
                    state.pace.reset();
                    log::debug!("new path segment at {} ms", sample.timestamp_ms);
                } else {
                    state.distance.push(sample, distance_m);
                }
                state.pace.update(&sample);
                state.calories = estimate_calories_with(
                    state.distance.distance_m(),
                    self.profile.effective_mass_kg(),
                    self.cfg.calories.kcal_per_kg_km,
                );
                if let Some(m) = &self.metrics {
                    m.set_distance(state.distance.distance_m());
                }
            }
            v if v.is_near_stationary() => {
                state.pace.decay();
                log::debug!("fix at {} ms rejected: near stationary", sample.timestamp_ms);
            }
            other => {
                log::debug!("fix at {} ms rejected: {:?}", sample.timestamp_ms, other);
            }
        }
        Some(verdict)
    }

    pub fn on_position_error(&mut self, fault: PositionFault, message: Option<&str>) {
        let err = match fault {
            PositionFault::SignalLost => {
                self.signal_lost = true;
                TrackerError::SignalLost
            }
            PositionFault::Unavailable => TrackerError::PositionUnavailable(
                message.unwrap_or("location unavailable").to_owned(),
            ),
        };
        self.record_issue(err);
    }

    /// Motion callback; returns true when a step was registered.
    pub fn on_motion(&mut self, sample: &MotionSample) -> bool {
        if self.phase != LifecyclePhase::Running {
            return false;
        }
        let Some(state) = self.state.as_mut() else {
            return false;
        };
        let step = state.cadence.on_motion_sample(sample);
        if step {
            if let Some(m) = &self.metrics {
                m.step();
            }
        }
        step
    }

    /// Clock callback: one tick of `session.tick_ms`.
    pub fn on_tick(&mut self) {
        if self.phase != LifecyclePhase::Running {
            return;
        }
        let Some(state) = self.state.as_mut() else {
            return;
        };
        state.elapsed_ms += self.cfg.session.tick_ms;
        state.average_pace = average_pace(
            state.elapsed_seconds(),
            state.distance.distance_m(),
            self.cfg.pace.pace_cap_sec_per_km,
        );
    }

    // --- read side ---

    pub fn elapsed_seconds(&self) -> u64 {
        self.state.as_ref().map_or_else(
            || self.summary.as_ref().map_or(0, |s| s.elapsed_seconds),
            SessionState::elapsed_seconds,
        )
    }

    /// Recorded path of the live session, or of the frozen summary once stopped.
    pub fn path(&self) -> &[GeoSample] {
        match (&self.state, &self.summary) {
            (Some(state), _) => state.distance.path(),
            (None, Some(summary)) => &summary.path,
            (None, None) => &[],
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let mut snap = SessionSnapshot {
            phase: self.phase,
            elapsed_seconds: 0,
            distance_m: 0.0,
            current_pace_sec_per_km: 0.0,
            average_pace_sec_per_km: 0.0,
            cadence_spm: 0,
            step_count: 0,
            calories: 0,
            path_points: 0,
            current_location: self.current_location,
            last_accepted: None,
            filter: FilterStats::default(),
            signal_lost: self.signal_lost,
            issues: self.issues.clone(),
        };

        if let Some(state) = &self.state {
            snap.elapsed_seconds = state.elapsed_seconds();
            snap.distance_m = state.distance.distance_m();
            snap.current_pace_sec_per_km = state.pace.current();
            snap.average_pace_sec_per_km = state.average_pace;
            snap.cadence_spm = state.cadence.cadence_spm();
            snap.step_count = state.cadence.step_count();
            snap.calories = state.calories;
            snap.path_points = state.distance.len();
            snap.last_accepted = state.distance.last().copied();
            snap.filter = state.stats.clone();
        } else if let Some(s) = &self.summary {
            snap.elapsed_seconds = s.elapsed_seconds;
            snap.distance_m = s.distance_m;
            snap.current_pace_sec_per_km = s.current_pace_sec_per_km;
            snap.average_pace_sec_per_km = s.average_pace_sec_per_km;
            snap.cadence_spm = s.cadence_spm;
            snap.step_count = s.step_count;
            snap.calories = s.calories;
            snap.path_points = s.path.len();
            snap.last_accepted = s.path.last().copied();
        }
        snap
    }

    /// Drain the sensor issues recorded since the last call.
    pub fn take_issues(&mut self) -> Vec<TrackerError> {
        std::mem::take(&mut self.issues)
    }

    pub fn metrics(&self) -> Option<&TrackerMetrics> {
        self.metrics.as_ref()
    }

    pub fn metrics_text(&self) -> Option<String> {
        self.metrics.as_ref().and_then(|m| m.render().ok())
    }

    // --- internals ---

    /// Subscribe whatever is not live yet. Ownership, not phase, decides.
    fn arm(&mut self) -> Result<(), TrackerError> {
        if self.position.is_none() {
            self.position = Some(self.platform.watch_position()?);
        }
        if self.motion.is_none() {
            self.motion = Some(self.platform.watch_motion()?);
        }
        if self.ticker.is_none() {
            let period = Duration::from_millis(self.cfg.session.tick_ms);
            self.ticker = Some(self.platform.start_ticker(period)?);
        }
        Ok(())
    }

    fn release_all(&mut self) {
        self.ticker = None;
        self.motion = None;
        self.position = None;
    }

    fn record_issue(&mut self, err: TrackerError) {
        log::warn!("session issue: {err}");
        if let Some(m) = &self.metrics {
            m.sensor_error(err.kind());
        }
        self.issues.push(err);
    }

    fn freeze(&self, state: SessionState) -> RunSummary {
        let elapsed_seconds = state.elapsed_seconds();
        let distance_m = state.distance.distance_m();
        RunSummary {
            started_at: state.started_at,
            distance_m,
            elapsed_seconds,
            average_pace_sec_per_km: average_pace(
                elapsed_seconds,
                distance_m,
                self.cfg.pace.pace_cap_sec_per_km,
            ),
            current_pace_sec_per_km: state.pace.current(),
            cadence_spm: state.cadence.cadence_spm(),
            step_count: state.cadence.step_count(),
            calories: state.calories,
            path: state.distance.path().to_vec(),
            segment_starts: state.distance.segment_starts().to_vec(),
        }
    }
}

fn fresh_metrics() -> Option<TrackerMetrics> {
    match TrackerMetrics::new() {
        Ok(m) => Some(m),
        Err(e) => {
            log::warn!("metrics disabled: {e}");
            None
        }
    }
}
