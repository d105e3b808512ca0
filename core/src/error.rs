// core/src/error.rs
use thiserror::Error;

/// Sensor and lifecycle errors of a tracking session.
///
/// None of these terminate a running session on their own; sensor faults are
/// recorded on the session and surfaced through the next snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    #[error("motion sensor permission denied")]
    PermissionDenied,

    #[error("position unavailable: {0}")]
    PositionUnavailable(String),

    #[error("GPS signal lost")]
    SignalLost,

    #[error("session has not been started")]
    NotStarted,

    #[error("session already stopped")]
    AlreadyStopped,

    #[error("sensor error: {0}")]
    Sensor(String),
}

impl TrackerError {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            TrackerError::PermissionDenied => "permission_denied",
            TrackerError::PositionUnavailable(_) => "position_unavailable",
            TrackerError::SignalLost => "signal_lost",
            TrackerError::NotStarted => "not_started",
            TrackerError::AlreadyStopped => "already_stopped",
            TrackerError::Sensor(_) => "sensor",
        }
    }
}

/// Raised by the save boundary, never by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("session too short: {elapsed_seconds}s (minimum {minimum}s)")]
    TooShort { elapsed_seconds: u64, minimum: u64 },

    #[error("too few path points: {points} (minimum {minimum})")]
    TooFewPoints { points: usize, minimum: usize },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rejected: {0}")]
    Validation(#[from] ValidationError),

    #[error("run not found: {0}")]
    NotFound(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse at {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid config: {0}")]
    Invalid(String),
}
