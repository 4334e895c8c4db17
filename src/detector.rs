//! # Cycle Detection Module
//!
//! Classifies a stream of angular-velocity samples into discrete cycles.
//!
//! A sample counts as a cycle when any single axis magnitude exceeds the
//! threshold and more than the debounce interval has passed since the last
//! accepted cycle. Axes are tested independently; there is no vector-magnitude
//! fusion.

use crate::timeseries::{CycleEvent, MotionSample};
use serde::{Deserialize, Serialize};

/// Per-axis angular-rate threshold
pub const DEFAULT_THRESHOLD: f64 = 0.85;

/// Minimum interval between two accepted cycles in milliseconds
pub const DEFAULT_DEBOUNCE_MS: i64 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub threshold: f64,
    pub debounce_ms: i64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CycleDetector {
    config: DetectorConfig,
    cycle_count: u32,
    last_cycle_time: i64,
}

impl CycleDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            cycle_count: 0,
            last_cycle_time: 0,
        }
    }

    /// Process one motion sample, returning a cycle event when it is accepted.
    ///
    /// NaN axes never exceed the threshold.
    pub fn on_motion_sample(&mut self, sample: &MotionSample) -> Option<CycleEvent> {
        let exceeds = sample
            .axes()
            .iter()
            .any(|axis| axis.abs() > self.config.threshold);

        let since_last = sample.timestamp.saturating_sub(self.last_cycle_time);
        if !exceeds || since_last <= self.config.debounce_ms {
            return None;
        }

        self.cycle_count += 1;
        self.last_cycle_time = sample.timestamp;

        Some(CycleEvent {
            timestamp: sample.timestamp,
        })
    }

    pub fn cycle_count(&self) -> u32 {
        self.cycle_count
    }

    pub fn last_cycle_time(&self) -> i64 {
        self.last_cycle_time
    }
}

impl Default for CycleDetector {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}
