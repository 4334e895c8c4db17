//! # Sample Replay Module
//!
//! Drives a session from recorded samples instead of live sensors.
//!
//! The window timer is simulated from sample time: whenever a sample's
//! timestamp reaches the next window boundary, the pending windows are flushed
//! before the sample is delivered. Samples outside the session bounds are
//! skipped. Input is NDJSON, one `SensorUpdate` per line.

use crate::config::Config;
use crate::error::ReplayError;
use crate::sensor::{SensorListener, SensorUpdate, SessionHandle};
use crate::session::SessionSummary;
use std::io::BufRead;

/// Session bounds; `None` means the first / last sample timestamp
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayBounds {
    pub start_ms: Option<i64>,
    pub end_ms: Option<i64>,
}

pub fn read_updates(reader: impl BufRead) -> Result<Vec<SensorUpdate>, ReplayError> {
    let mut updates = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(ReplayError::ReadFailed)?;
        if line.trim().is_empty() {
            continue;
        }
        let update = serde_json::from_str(&line).map_err(|source| ReplayError::ParseFailed {
            line: index + 1,
            source,
        })?;
        updates.push(update);
    }

    log::debug!("Read {} sensor updates", updates.len());
    Ok(updates)
}

/// Run `updates` through a fresh session and return its summary
pub fn replay(
    config: &Config,
    updates: &[SensorUpdate],
    bounds: ReplayBounds,
) -> Result<SessionSummary, ReplayError> {
    let start_ms = bounds
        .start_ms
        .or_else(|| updates.first().map(SensorUpdate::timestamp))
        .ok_or(ReplayError::Empty)?;
    let end_ms = bounds
        .end_ms
        .or_else(|| updates.last().map(SensorUpdate::timestamp))
        .unwrap_or(start_ms);

    let window_ms = config.frequency.window_ms.max(1);
    let handle = SessionHandle::new(config.detector);
    handle.start(start_ms)?;

    let mut next_tick = start_ms.saturating_add(window_ms);
    let listener: &dyn SensorListener = &handle;

    for update in updates {
        let timestamp = update.timestamp();
        if timestamp < start_ms {
            log::trace!("Skipping sample at {} before session start {}", timestamp, start_ms);
            continue;
        }
        if timestamp > end_ms {
            break;
        }
        advance_timer(&handle, &mut next_tick, timestamp, window_ms);
        update.dispatch(listener);
    }

    advance_timer(&handle, &mut next_tick, end_ms, window_ms);

    Ok(handle.stop(end_ms)?)
}

/// Flush every window boundary up to and including `until`.
///
/// Only the first boundary can close a window holding cycles; the rest are
/// empty, so they collapse into a single flush at the last boundary.
fn advance_timer(handle: &SessionHandle, next_tick: &mut i64, until: i64, window_ms: i64) {
    if until < *next_tick {
        return;
    }

    handle.flush_window(*next_tick);
    let skipped = until.saturating_sub(*next_tick) / window_ms;
    if skipped > 0 {
        let last_boundary = next_tick.saturating_add(skipped.saturating_mul(window_ms));
        handle.flush_window(last_boundary);
        *next_tick = last_boundary;
    }
    *next_tick = next_tick.saturating_add(window_ms);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeseries::{HeartRateSample, MotionSample};

    fn motion(t: i64) -> SensorUpdate {
        SensorUpdate::Motion(MotionSample::new(0.0, 0.0, 1.3, t))
    }

    #[test]
    fn test_read_updates_skips_blank_lines() {
        let input = "{\"type\":\"motion\",\"x\":1.0,\"y\":0.0,\"z\":0.0,\"timestamp\":300}\n\n\
                     {\"type\":\"heart_rate\",\"value\":98.0,\"timestamp\":400}\n";
        let updates = read_updates(input.as_bytes()).unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[1], SensorUpdate::HeartRate(HeartRateSample::new(98.0, 400)));
    }

    #[test]
    fn test_read_updates_reports_bad_line() {
        let input = "{\"type\":\"motion\",\"x\":1.0,\"y\":0.0,\"z\":0.0,\"timestamp\":300}\nnope\n";
        match read_updates(input.as_bytes()) {
            Err(ReplayError::ParseFailed { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_replay_reference_scenario() {
        let updates = [motion(100), motion(300), motion(600), motion(1_000)];
        let bounds = ReplayBounds {
            start_ms: Some(0),
            end_ms: Some(2_000),
        };

        let summary = replay(&Config::default(), &updates, bounds).unwrap();
        assert_eq!(summary.cycle_count, 3);
        assert_eq!(summary.duration_ms, 2_000);
        assert_eq!(summary.average_frequency, 1.5);
        // 300 and 600 land in the first window, 1000 opens the second
        assert_eq!(summary.max_frequency, 2.0);
    }

    #[test]
    fn test_replay_defaults_to_sample_bounds() {
        let updates = [
            SensorUpdate::HeartRate(HeartRateSample::new(100.0, 5_000)),
            motion(5_300),
            SensorUpdate::HeartRate(HeartRateSample::new(200.0, 6_000)),
            motion(7_000),
        ];

        let summary = replay(&Config::default(), &updates, ReplayBounds::default()).unwrap();
        assert_eq!(summary.start_time, 5_000);
        assert_eq!(summary.end_time, 7_000);
        assert_eq!(summary.cycle_count, 2);
        assert_eq!(summary.average_heart_rate, 150.0);
    }

    #[test]
    fn test_replay_ignores_samples_after_end() {
        let updates = [motion(300), motion(900), motion(1_500)];
        let bounds = ReplayBounds {
            start_ms: Some(0),
            end_ms: Some(1_000),
        };

        let summary = replay(&Config::default(), &updates, bounds).unwrap();
        assert_eq!(summary.cycle_count, 2);
    }

    #[test]
    fn test_replay_skips_samples_before_start() {
        let updates = [
            SensorUpdate::HeartRate(HeartRateSample::new(180.0, 0)),
            motion(200),
            motion(500),
            SensorUpdate::HeartRate(HeartRateSample::new(100.0, 1_000)),
            motion(1_300),
        ];
        let bounds = ReplayBounds {
            start_ms: Some(1_000),
            end_ms: Some(3_000),
        };

        let summary = replay(&Config::default(), &updates, bounds).unwrap();
        assert_eq!(summary.cycle_count, 1);
        assert_eq!(summary.average_frequency, 0.5);
        assert_eq!(summary.average_heart_rate, 100.0);
        assert_eq!(summary.max_heart_rate, 100.0);
    }

    #[test]
    fn test_replay_large_gap_before_samples() {
        let mut config = Config::default();
        config.frequency.window_ms = 1;
        let updates = [motion(2_000_000_000), motion(2_000_000_500), motion(2_000_000_800)];
        let bounds = ReplayBounds {
            start_ms: Some(0),
            end_ms: Some(2_000_001_000),
        };

        let summary = replay(&config, &updates, bounds).unwrap();
        assert_eq!(summary.cycle_count, 3);
        assert_eq!(summary.max_frequency, 1.0);
        assert_eq!(summary.duration_ms, 2_000_001_000);
    }

    #[test]
    fn test_skipped_windows_keep_max_frequency() {
        // Two cycles in the first window, then a long quiet stretch
        let updates = [motion(300), motion(600), motion(50_000)];
        let bounds = ReplayBounds {
            start_ms: Some(0),
            end_ms: Some(60_000),
        };

        let summary = replay(&Config::default(), &updates, bounds).unwrap();
        assert_eq!(summary.cycle_count, 3);
        assert_eq!(summary.max_frequency, 2.0);
    }

    #[test]
    fn test_replay_near_max_timestamp() {
        let updates = [motion(i64::MAX - 500), motion(i64::MAX)];
        let bounds = ReplayBounds {
            start_ms: Some(i64::MAX - 1_000),
            end_ms: Some(i64::MAX),
        };

        let summary = replay(&Config::default(), &updates, bounds).unwrap();
        assert_eq!(summary.cycle_count, 2);
        assert_eq!(summary.duration_ms, 1_000);
    }

    #[test]
    fn test_replay_without_samples_needs_bounds() {
        assert!(matches!(
            replay(&Config::default(), &[], ReplayBounds::default()),
            Err(ReplayError::Empty)
        ));

        let bounds = ReplayBounds {
            start_ms: Some(0),
            end_ms: Some(3_000),
        };
        let summary = replay(&Config::default(), &[], bounds).unwrap();
        assert_eq!(summary.cycle_count, 0);
        assert_eq!(summary.average_frequency, 0.0);
        assert_eq!(summary.max_frequency, 0.0);
    }
}
