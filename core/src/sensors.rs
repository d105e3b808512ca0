// core/src/sensors.rs
//! Platform sensor seam.
//!
//! Every subscription is an owned [`SensorHandle`]; dropping the handle releases the
//! underlying listener / timer exactly once.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::error::TrackerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Position,
    Motion,
    Ticker,
}

pub struct SensorHandle {
    kind: SensorKind,
    release: Option<Box<dyn FnOnce()>>,
}

impl SensorHandle {
    pub fn new(kind: SensorKind, release: impl FnOnce() + 'static) -> Self {
        Self { kind, release: Some(Box::new(release)) }
    }

    /// Handle with nothing to release (platforms without explicit unsubscribe).
    pub fn detached(kind: SensorKind) -> Self {
        Self { kind, release: None }
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }
}

impl Drop for SensorHandle {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            log::debug!("releasing {:?} subscription", self.kind);
            release();
        }
    }
}

impl fmt::Debug for SensorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SensorHandle")
            .field("kind", &self.kind)
            .field("armed", &self.release.is_some())
            .finish()
    }
}

/// What the host platform must provide. Events themselves are pushed into the
/// controller by the host's event loop.
pub trait SensorPlatform {
    fn request_motion_permission(&mut self) -> Result<(), TrackerError>;
    fn watch_position(&mut self) -> Result<SensorHandle, TrackerError>;
    fn watch_motion(&mut self) -> Result<SensorHandle, TrackerError>;
    fn start_ticker(&mut self, period: Duration) -> Result<SensorHandle, TrackerError>;
}

/// Live / cumulative subscription counts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SensorLedger {
    pub position_live: u32,
    pub motion_live: u32,
    pub ticker_live: u32,
    pub acquired: u32,
    pub released: u32,
}

impl SensorLedger {
    pub fn live(&self) -> u32 {
        self.position_live + self.motion_live + self.ticker_live
    }

    fn slot(&mut self, kind: SensorKind) -> &mut u32 {
        match kind {
            SensorKind::Position => &mut self.position_live,
            SensorKind::Motion => &mut self.motion_live,
            SensorKind::Ticker => &mut self.ticker_live,
        }
    }
}

/// Platform for hosts that push events themselves (bindings, replay, tests).
#[derive(Debug, Clone)]
pub struct ManualPlatform {
    pub motion_permission: bool,
    pub position_supported: bool,
    pub ledger: Rc<RefCell<SensorLedger>>,
}

impl Default for ManualPlatform {
    fn default() -> Self {
        Self {
            motion_permission: true,
            position_supported: true,
            ledger: Rc::new(RefCell::new(SensorLedger::default())),
        }
    }
}

impl ManualPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ledger(&self) -> SensorLedger {
        *self.ledger.borrow()
    }

    fn acquire(&self, kind: SensorKind) -> SensorHandle {
        {
            let mut l = self.ledger.borrow_mut();
            *l.slot(kind) += 1;
            l.acquired += 1;
        }
        let ledger = Rc::clone(&self.ledger);
        SensorHandle::new(kind, move || {
            let mut l = ledger.borrow_mut();
            *l.slot(kind) -= 1;
            l.released += 1;
        })
    }
}

impl SensorPlatform for ManualPlatform {
    fn request_motion_permission(&mut self) -> Result<(), TrackerError> {
        if self.motion_permission { Ok(()) } else { Err(TrackerError::PermissionDenied) }
    }

    fn watch_position(&mut self) -> Result<SensorHandle, TrackerError> {
        if !self.position_supported {
            return Err(TrackerError::PositionUnavailable("geolocation unsupported".into()));
        }
        Ok(self.acquire(SensorKind::Position))
    }

    fn watch_motion(&mut self) -> Result<SensorHandle, TrackerError> {
        Ok(self.acquire(SensorKind::Motion))
    }

    fn start_ticker(&mut self, _period: Duration) -> Result<SensorHandle, TrackerError> {
        Ok(self.acquire(SensorKind::Ticker))
    }
}
