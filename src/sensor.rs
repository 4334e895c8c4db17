//! # Sensor Interface Module
//!
//! Push interface between the host's sensor sources and the session engine.
//!
//! ## Key Types
//! - `SensorListener`: what a sensor source calls for each reading
//! - `SensorUpdate`: one reading from either stream, as delivered over a channel or file
//! - `SessionHandle`: cloneable, mutex-guarded session every event source writes through
//! - `SensorRegistration`: a listener registration; once unregistered, deliveries are dropped
//! - `Clock`: source of millisecond timestamps for lifecycle calls and timer ticks
//!
//! The host owns sensor registration. Motion callbacks, heart-rate callbacks and
//! the window timer may fire from different threads; all of them serialize on
//! the handle's mutex.

use crate::detector::DetectorConfig;
use crate::error::SessionError;
use crate::session::{LiveStats, SessionPhase, SessionRecorder, SessionSummary};
use crate::timeseries::{HeartRateSample, MotionSample};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

pub trait SensorListener: Send + Sync {
    fn on_motion_sample(&self, sample: MotionSample);
    fn on_heart_rate_sample(&self, sample: HeartRateSample);
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SensorUpdate {
    Motion(MotionSample),
    HeartRate(HeartRateSample),
}

impl SensorUpdate {
    pub fn timestamp(&self) -> i64 {
        match self {
            SensorUpdate::Motion(sample) => sample.timestamp,
            SensorUpdate::HeartRate(sample) => sample.timestamp,
        }
    }

    pub fn dispatch(self, listener: &dyn SensorListener) {
        match self {
            SensorUpdate::Motion(sample) => listener.on_motion_sample(sample),
            SensorUpdate::HeartRate(sample) => listener.on_heart_rate_sample(sample),
        }
    }
}

pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall-clock milliseconds since the Unix epoch
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Shared handle to one session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<SessionRecorder>>,
}

impl SessionHandle {
    pub fn new(detector_config: DetectorConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionRecorder::new(detector_config))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionRecorder> {
        // Every mutation completes under the lock, so a poisoned guard still holds consistent state
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn start(&self, now_ms: i64) -> Result<(), SessionError> {
        self.lock().start(now_ms)
    }

    pub fn stop(&self, now_ms: i64) -> Result<SessionSummary, SessionError> {
        self.lock().stop(now_ms)
    }

    pub fn flush_window(&self, now_ms: i64) -> Option<f64> {
        self.lock().flush_window(now_ms)
    }

    pub fn live_stats(&self, now_ms: i64) -> Option<LiveStats> {
        self.lock().live_stats(now_ms)
    }

    pub fn phase(&self) -> SessionPhase {
        self.lock().phase()
    }
}

impl SensorListener for SessionHandle {
    fn on_motion_sample(&self, sample: MotionSample) {
        if let Some(event) = self.lock().on_motion_sample(&sample) {
            log::trace!("Cycle at {}", event.timestamp);
        }
    }

    fn on_heart_rate_sample(&self, sample: HeartRateSample) {
        self.lock().on_heart_rate_sample(sample);
    }
}

/// A listener registered with a sensor source
pub struct SensorRegistration<L> {
    listener: L,
    registered: Arc<AtomicBool>,
}

impl<L: SensorListener> SensorRegistration<L> {
    pub fn new(listener: L) -> Self {
        Self {
            listener,
            registered: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Hard stop: every delivery after this returns is dropped
    pub fn unregister(&self) {
        if self.registered.swap(false, Ordering::SeqCst) {
            log::debug!("Sensor listener unregistered");
        }
    }

    pub fn is_registered(&self) -> bool {
        self.registered.load(Ordering::SeqCst)
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }
}

impl<L: SensorListener> SensorListener for SensorRegistration<L> {
    fn on_motion_sample(&self, sample: MotionSample) {
        if self.is_registered() {
            self.listener.on_motion_sample(sample);
        }
    }

    fn on_heart_rate_sample(&self, sample: HeartRateSample) {
        if self.is_registered() {
            self.listener.on_heart_rate_sample(sample);
        }
    }
}
