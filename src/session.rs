//! # Session Recording Module
//!
//! Orchestrates cycle detection, frequency tracking and heart-rate aggregation
//! across one recording session and produces the immutable `SessionSummary`.
//!
//! ## Lifecycle
//! ```text
//! Idle --start--> Running --stop--> Stopped (terminal)
//! ```
//! Samples and timer ticks are only routed while Running. Anything delivered
//! before `start` or after `stop` is dropped, never buffered.

use crate::detector::{CycleDetector, DetectorConfig};
use crate::error::SessionError;
use crate::frequency::FrequencyTracker;
use crate::heart_rate::HeartRateAggregator;
use crate::timeseries::{CycleEvent, HeartRateSample, MotionSample};
use serde::{Deserialize, Serialize};

/// One finished session, the unit persisted in the history.
///
/// Field names follow the stored history format, so existing histories keep
/// loading. Missing numeric fields decode as 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionSummary {
    #[serde(rename = "duration")]
    pub duration_ms: i64,
    pub average_frequency: f64,
    pub max_frequency: f64,
    pub cycle_count: u32,
    pub start_time: i64,
    pub end_time: i64,
    pub average_heart_rate: f64,
    pub max_heart_rate: f64,
}

/// Values a display refreshes while the session runs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveStats {
    pub elapsed_ms: i64,
    pub cycle_count: u32,
    /// Cycles in the most recently completed window
    pub frequency: f64,
    /// Latest heart-rate reading, zero and invalid readings included
    pub heart_rate: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Running,
    Stopped,
}

/// Mutable state of a running session, consumed by `stop`
#[derive(Debug)]
struct SessionState {
    start_time: i64,
    detector: CycleDetector,
    frequency: FrequencyTracker,
    heart_rate: HeartRateAggregator,
    latest_heart_rate: Option<HeartRateSample>,
}

impl SessionState {
    fn new(start_time: i64, detector_config: DetectorConfig) -> Self {
        Self {
            start_time,
            detector: CycleDetector::new(detector_config),
            frequency: FrequencyTracker::new(start_time),
            heart_rate: HeartRateAggregator::new(),
            latest_heart_rate: None,
        }
    }

    fn into_summary(self, now_ms: i64) -> SessionSummary {
        let end_time = if now_ms < self.start_time {
            log::warn!(
                "Session stopped at {} before its start {}, clamping duration to zero",
                now_ms,
                self.start_time
            );
            self.start_time
        } else {
            now_ms
        };

        let duration_ms = end_time.saturating_sub(self.start_time);
        let cycle_count = self.detector.cycle_count();
        let average_frequency = if duration_ms > 0 {
            f64::from(cycle_count) / (duration_ms as f64 / 1000.0)
        } else {
            0.0
        };
        let (average_heart_rate, max_heart_rate) = self.heart_rate.finalize(end_time);

        SessionSummary {
            duration_ms,
            average_frequency,
            max_frequency: self.frequency.max_frequency(),
            cycle_count,
            start_time: self.start_time,
            end_time,
            average_heart_rate,
            max_heart_rate,
        }
    }
}

#[derive(Debug)]
enum Phase {
    Idle,
    Running(SessionState),
    Stopped,
}

/// State machine for a single recording session
#[derive(Debug)]
pub struct SessionRecorder {
    detector_config: DetectorConfig,
    phase: Phase,
}

impl SessionRecorder {
    pub fn new(detector_config: DetectorConfig) -> Self {
        Self {
            detector_config,
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        match self.phase {
            Phase::Idle => SessionPhase::Idle,
            Phase::Running(_) => SessionPhase::Running,
            Phase::Stopped => SessionPhase::Stopped,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running(_))
    }

    /// Begin recording at `now_ms` with fresh detector, tracker and aggregator
    pub fn start(&mut self, now_ms: i64) -> Result<(), SessionError> {
        if !matches!(self.phase, Phase::Idle) {
            return Err(SessionError::AlreadyStarted);
        }

        log::info!("Session started at {}", now_ms);
        self.phase = Phase::Running(SessionState::new(now_ms, self.detector_config));
        Ok(())
    }

    pub fn on_motion_sample(&mut self, sample: &MotionSample) -> Option<CycleEvent> {
        let Phase::Running(state) = &mut self.phase else {
            log::trace!("Dropping motion sample at {}: session not running", sample.timestamp);
            return None;
        };

        let event = state.detector.on_motion_sample(sample)?;
        state.frequency.on_cycle_event(&event);
        Some(event)
    }

    pub fn on_heart_rate_sample(&mut self, sample: HeartRateSample) {
        let Phase::Running(state) = &mut self.phase else {
            log::trace!("Dropping heart-rate sample at {}: session not running", sample.timestamp);
            return;
        };

        state.latest_heart_rate = Some(sample);
        state.heart_rate.on_heart_rate_sample(sample);
    }

    /// Timer tick: close the current frequency window.
    ///
    /// Returns `None` when the session is not running.
    pub fn flush_window(&mut self, now_ms: i64) -> Option<f64> {
        match &mut self.phase {
            Phase::Running(state) => Some(state.frequency.flush_window(now_ms)),
            _ => None,
        }
    }

    pub fn live_stats(&self, now_ms: i64) -> Option<LiveStats> {
        let Phase::Running(state) = &self.phase else {
            return None;
        };

        Some(LiveStats {
            elapsed_ms: now_ms.saturating_sub(state.start_time).max(0),
            cycle_count: state.detector.cycle_count(),
            frequency: state.frequency.last_frequency(),
            heart_rate: state.latest_heart_rate.map(|s| s.value),
        })
    }

    /// End the session at `now_ms` and build its summary.
    ///
    /// Only valid once, from Running.
    pub fn stop(&mut self, now_ms: i64) -> Result<SessionSummary, SessionError> {
        match std::mem::replace(&mut self.phase, Phase::Stopped) {
            Phase::Running(state) => {
                let summary = state.into_summary(now_ms);
                log::info!(
                    "Session stopped: {} cycles in {} ms",
                    summary.cycle_count,
                    summary.duration_ms
                );
                Ok(summary)
            }
            Phase::Idle => {
                self.phase = Phase::Idle;
                Err(SessionError::NotRunning)
            }
            Phase::Stopped => Err(SessionError::AlreadyStopped),
        }
    }
}

impl Default for SessionRecorder {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}
