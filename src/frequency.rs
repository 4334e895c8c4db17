//! # Frequency Tracking Module
//!
//! Buckets cycle events into fixed windows. An external timer calls
//! `flush_window` once per window; the count accumulated since the previous
//! flush is the instantaneous frequency. If the timer drifts, the value covers
//! whatever interval actually elapsed.

use crate::timeseries::CycleEvent;
use serde::{Deserialize, Serialize};

/// Length of one frequency window in milliseconds
pub const DEFAULT_WINDOW_MS: i64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrequencyConfig {
    pub window_ms: i64,
}

impl Default for FrequencyConfig {
    fn default() -> Self {
        Self {
            window_ms: DEFAULT_WINDOW_MS,
        }
    }
}

/// Accumulation bucket, reset after each flush
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrequencyWindow {
    pub window_start_ms: i64,
    pub count: u32,
}

#[derive(Debug, Clone, Default)]
pub struct FrequencyTracker {
    window: FrequencyWindow,
    max_frequency_seen: f64,
    last_frequency: f64,
}

impl FrequencyTracker {
    pub fn new(start_ms: i64) -> Self {
        Self {
            window: FrequencyWindow {
                window_start_ms: start_ms,
                count: 0,
            },
            max_frequency_seen: 0.0,
            last_frequency: 0.0,
        }
    }

    pub fn on_cycle_event(&mut self, _event: &CycleEvent) {
        self.window.count += 1;
    }

    /// Close the current window and return its frequency for display
    pub fn flush_window(&mut self, now_ms: i64) -> f64 {
        let frequency = f64::from(self.window.count);
        if frequency > self.max_frequency_seen {
            self.max_frequency_seen = frequency;
        }

        log::debug!(
            "Frequency window {}..{}: {} cycles",
            self.window.window_start_ms,
            now_ms,
            self.window.count
        );

        self.window = FrequencyWindow {
            window_start_ms: now_ms,
            count: 0,
        };
        self.last_frequency = frequency;
        frequency
    }

    pub fn max_frequency(&self) -> f64 {
        self.max_frequency_seen
    }

    /// Frequency of the most recently completed window
    pub fn last_frequency(&self) -> f64 {
        self.last_frequency
    }

    pub fn current_window(&self) -> FrequencyWindow {
        self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cycle(timestamp: i64) -> CycleEvent {
        CycleEvent { timestamp }
    }

    #[test]
    fn test_flush_returns_window_count_and_resets() {
        let mut tracker = FrequencyTracker::new(0);
        tracker.on_cycle_event(&cycle(100));
        tracker.on_cycle_event(&cycle(400));
        tracker.on_cycle_event(&cycle(800));

        assert_eq!(tracker.flush_window(1_000), 3.0);
        assert_eq!(
            tracker.current_window(),
            FrequencyWindow {
                window_start_ms: 1_000,
                count: 0
            }
        );
        assert_eq!(tracker.max_frequency(), 3.0);
    }

    #[test]
    fn test_empty_flush_keeps_max() {
        let mut tracker = FrequencyTracker::new(0);
        tracker.on_cycle_event(&cycle(100));
        tracker.on_cycle_event(&cycle(400));
        tracker.flush_window(1_000);

        assert_eq!(tracker.flush_window(2_000), 0.0);
        assert_eq!(tracker.max_frequency(), 2.0);
        assert_eq!(tracker.last_frequency(), 0.0);
    }

    #[test]
    fn test_max_is_non_decreasing() {
        let mut tracker = FrequencyTracker::new(0);
        let per_window = [2, 0, 4, 1, 3, 5, 0];
        let mut previous_max = 0.0;

        for (i, count) in per_window.iter().enumerate() {
            for _ in 0..*count {
                tracker.on_cycle_event(&cycle(i as i64 * 1_000));
            }
            tracker.flush_window((i as i64 + 1) * 1_000);
            assert!(tracker.max_frequency() >= previous_max);
            previous_max = tracker.max_frequency();
        }

        assert_eq!(tracker.max_frequency(), 5.0);
    }
}
