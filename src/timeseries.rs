//! # Sample Types Module
//!
//! Transient values produced by the sensor sources and the ordered heart-rate
//! log kept for the lifetime of one session.
//!
//! ## Key Types
//! - `MotionSample`: three angular-velocity axes plus a millisecond timestamp
//! - `HeartRateSample`: bpm reading (0 = no reading) plus a millisecond timestamp
//! - `CycleEvent`: marker emitted when a debounced threshold crossing occurs
//! - `HeartRateLog`: arrival-ordered log of non-zero heart-rate readings

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Milliseconds, monotonic or wall-clock
    pub timestamp: i64,
}

impl MotionSample {
    pub fn new(x: f64, y: f64, z: f64, timestamp: i64) -> Self {
        Self { x, y, z, timestamp }
    }

    pub fn axes(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeartRateSample {
    /// Beats per minute; 0 (or any non-finite or negative value) means no reading
    pub value: f64,
    pub timestamp: i64,
}

impl HeartRateSample {
    pub fn new(value: f64, timestamp: i64) -> Self {
        Self { value, timestamp }
    }

    pub fn is_reading(&self) -> bool {
        self.value.is_finite() && self.value > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleEvent {
    pub timestamp: i64,
}

pub trait SampleSliceExt {
    fn max_value(&self) -> Option<f64>;
}

impl SampleSliceExt for &[HeartRateSample] {
    fn max_value(&self) -> Option<f64> {
        self.iter().fold(None, |acc, sample| match acc {
            None => Some(sample.value),
            Some(max) => Some(f64::max(max, sample.value)),
        })
    }
}

/// Heart-rate readings in arrival order. Zero and invalid readings never enter the log.
#[derive(Debug, Clone, Default)]
pub struct HeartRateLog {
    data: Vec<HeartRateSample>,
}

impl HeartRateLog {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Returns false when the sample was not a reading and was not logged
    pub fn add_sample(&mut self, sample: HeartRateSample) -> bool {
        if !sample.is_reading() {
            return false;
        }
        self.data.push(sample);
        true
    }

    pub fn samples(&self) -> &[HeartRateSample] {
        &self.data
    }

    pub fn last_sample(&self) -> Option<HeartRateSample> {
        self.data.last().copied()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
