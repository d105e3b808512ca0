// ──────────────────────────────────────────────────────────────────────────────
// Python surface: a push-driven RunSession plus a one-shot replay helper.
// The Python host owns the event loop and forwards platform callbacks here.
// ──────────────────────────────────────────────────────────────────────────────

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::wrap_pyfunction;

use serde_json as json;
use serde_path_to_error as spte;

use crate::config::TrackerConfig;
use crate::models::RunnerProfile;
use crate::replay::{parse_event_log, replay_events};
use crate::sensors::ManualPlatform;
use crate::session::SessionController;
use crate::types::{GeoSample, MotionSample, SensorEvent};

fn to_py_err<E: std::fmt::Display>(e: E) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn parse_config(config_json: Option<&str>) -> PyResult<TrackerConfig> {
    match config_json {
        Some(txt) => TrackerConfig::from_json_str(txt).map_err(to_py_err),
        None => Ok(TrackerConfig::default()),
    }
}

#[pyclass(unsendable, name = "RunSession")]
struct PyRunSession {
    inner: SessionController<ManualPlatform>,
}

#[pymethods]
impl PyRunSession {
    #[new]
    #[pyo3(signature = (mass_kg, config_json = None))]
    fn new(mass_kg: f64, config_json: Option<&str>) -> PyResult<Self> {
        let cfg = parse_config(config_json)?;
        Ok(Self {
            inner: SessionController::new(ManualPlatform::new(), RunnerProfile::with_mass(mass_kg), cfg),
        })
    }

    fn start(&mut self) -> PyResult<()> {
        self.inner.start().map_err(to_py_err)
    }

    fn pause(&mut self) -> PyResult<()> {
        self.inner.pause().map_err(to_py_err)
    }

    fn resume(&mut self) -> PyResult<()> {
        self.inner.resume().map_err(to_py_err)
    }

    /// Returns the frozen RunSummary as JSON.
    fn stop(&mut self) -> PyResult<String> {
        let summary = self.inner.stop().map_err(to_py_err)?;
        json::to_string(summary).map_err(to_py_err)
    }

    /// Returns the filter verdict label, or None when the session is not running.
    #[pyo3(signature = (lat, lon, timestamp_ms, accuracy_m = None, altitude = None, speed = None))]
    fn push_position(
        &mut self,
        lat: f64,
        lon: f64,
        timestamp_ms: i64,
        accuracy_m: Option<f64>,
        altitude: Option<f64>,
        speed: Option<f64>,
    ) -> Option<&'static str> {
        let sample = GeoSample { latitude: lat, longitude: lon, altitude, speed, accuracy_m, timestamp_ms };
        self.inner.on_position(sample).map(|v| v.label())
    }

    fn push_motion(&mut self, x: f64, y: f64, z: f64, timestamp_ms: i64) -> bool {
        self.inner.on_motion(&MotionSample { accel_x: x, accel_y: y, accel_z: z, timestamp_ms })
    }

    fn push_event_json(&mut self, event_json: &str) -> PyResult<()> {
        let mut de = json::Deserializer::from_str(event_json);
        let event: SensorEvent = spte::deserialize(&mut de)
            .map_err(|e| PyValueError::new_err(format!("event parse at {}: {}", e.path(), e)))?;
        self.inner.handle_event(&event);
        Ok(())
    }

    fn tick(&mut self) {
        self.inner.on_tick();
    }

    fn snapshot_json(&self) -> PyResult<String> {
        json::to_string(&self.inner.snapshot()).map_err(to_py_err)
    }

    fn metrics_text(&self) -> Option<String> {
        self.inner.metrics_text()
    }
}

#[pyfunction]
#[pyo3(signature = (events_json, mass_kg, config_json = None))]
fn replay_json(events_json: &str, mass_kg: f64, config_json: Option<&str>) -> PyResult<String> {
    let cfg = parse_config(config_json)?;
    let events = parse_event_log(events_json).map_err(to_py_err)?;
    let outcome = replay_events(&events, RunnerProfile::with_mass(mass_kg), cfg).map_err(to_py_err)?;
    json::to_string(&outcome).map_err(to_py_err)
}

// ──────────────────────────────────────────────────────────────────────────────
// PyO3 module
// ──────────────────────────────────────────────────────────────────────────────

#[pymodule]
fn runtrack_core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<PyRunSession>()?;
    m.add_function(wrap_pyfunction!(replay_json, m)?)?;
    Ok(())
}
