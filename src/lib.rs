//! swingtrack - exercise session recording engine
//!
//! Records a timed session from an angular-motion stream and a heart-rate
//! stream: motion samples become debounced cycles, cycles become per-window
//! frequencies, heart-rate readings become a time-weighted average, and a
//! finished session becomes a `SessionSummary` appended to the history.

pub mod config;
pub mod detector;
pub mod error;
pub mod frequency;
pub mod heart_rate;
pub mod history;
pub mod recorder;
pub mod replay;
pub mod sensor;
pub mod session;
pub mod timeseries;

pub use config::Config;
pub use error::{ConfigError, HistoryError, ReplayError, SessionError};
pub use history::{FileStore, HistoryStore, KeyValueStore, MemoryStore};
pub use recorder::LiveRecorder;
pub use sensor::{Clock, SensorListener, SensorRegistration, SensorUpdate, SessionHandle, SystemClock};
pub use session::{LiveStats, SessionPhase, SessionRecorder, SessionSummary};
pub use timeseries::{CycleEvent, HeartRateSample, MotionSample};
