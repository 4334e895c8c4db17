//! # Heart-Rate Aggregation Module
//!
//! Collects non-zero heart-rate readings and reduces them to a session average
//! and maximum.
//!
//! ## Time Weighting
//! Each reading is weighted by how long it stayed in effect: until the next
//! reading arrived, or for the last one, until the session closed. Sensors
//! report irregularly, so a plain mean would over-count densely sampled
//! stretches.

use crate::timeseries::{HeartRateLog, HeartRateSample, SampleSliceExt};

#[derive(Debug, Clone, Default)]
pub struct HeartRateAggregator {
    log: HeartRateLog,
}

impl HeartRateAggregator {
    pub fn new() -> Self {
        Self {
            log: HeartRateLog::new(),
        }
    }

    /// Log the sample unless it is a zero or invalid reading.
    ///
    /// Samples are assumed to arrive in timestamp order.
    pub fn on_heart_rate_sample(&mut self, sample: HeartRateSample) {
        if !self.log.add_sample(sample) {
            log::trace!(
                "Skipping heart-rate non-reading {} at {}",
                sample.value,
                sample.timestamp
            );
        }
    }

    pub fn log(&self) -> &HeartRateLog {
        &self.log
    }

    /// Compute `(average, max)` for a session that ended at `session_end_ms`
    pub fn finalize(&self, session_end_ms: i64) -> (f64, f64) {
        let samples = self.log.samples();
        let Some(last) = samples.last() else {
            return (0.0, 0.0);
        };

        let mut weighted_sum = 0.0;
        let mut total_duration: i64 = 0;

        for pair in samples.windows(2) {
            let duration = pair[1].timestamp.saturating_sub(pair[0].timestamp);
            weighted_sum += pair[0].value * duration as f64;
            total_duration = total_duration.saturating_add(duration);
        }

        let last_duration = session_end_ms.saturating_sub(last.timestamp);
        if last_duration > 0 {
            weighted_sum += last.value * last_duration as f64;
            total_duration = total_duration.saturating_add(last_duration);
        }

        let average = if total_duration > 0 {
            weighted_sum / total_duration as f64
        } else {
            0.0
        };
        let max = samples.max_value().unwrap_or(0.0);

        (average, max)
    }
}
