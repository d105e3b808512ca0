// core/src/metrics.rs
use prometheus::{Encoder, Gauge, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Per-session Prometheus counters (own registry, so sessions never collide).
#[derive(Clone)]
pub struct TrackerMetrics {
    registry: Registry,
    fixes_total: IntCounterVec,
    steps_total: IntCounter,
    sensor_errors_total: IntCounterVec,
    distance_meters: Gauge,
}

impl TrackerMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let fixes_total = IntCounterVec::new(
            Opts::new("runtrack_fixes_total", "Position fixes by filter verdict"),
            &["verdict"],
        )?;
        let steps_total = IntCounter::new("runtrack_steps_total", "Detected footstrikes")?;
        let sensor_errors_total = IntCounterVec::new(
            Opts::new("runtrack_sensor_errors_total", "Sensor-level errors by kind"),
            &["kind"],
        )?;
        let distance_meters = Gauge::new("runtrack_distance_meters", "Cumulative session distance")?;

        registry.register(Box::new(fixes_total.clone()))?;
        registry.register(Box::new(steps_total.clone()))?;
        registry.register(Box::new(sensor_errors_total.clone()))?;
        registry.register(Box::new(distance_meters.clone()))?;

        Ok(Self { registry, fixes_total, steps_total, sensor_errors_total, distance_meters })
    }

    pub fn fix(&self, verdict: &str) {
        self.fixes_total.with_label_values(&[verdict]).inc();
    }

    pub fn fixes(&self, verdict: &str) -> u64 {
        self.fixes_total.with_label_values(&[verdict]).get()
    }

    pub fn step(&self) {
        self.steps_total.inc();
    }

    pub fn steps(&self) -> u64 {
        self.steps_total.get()
    }

    pub fn sensor_error(&self, kind: &str) {
        self.sensor_errors_total.with_label_values(&[kind]).inc();
    }

    pub fn set_distance(&self, meters: f64) {
        self.distance_meters.set(meters);
    }

    /// Prometheus text exposition of all counters.
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
