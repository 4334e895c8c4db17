//! # Error Types Module
//!
//! Centralized error handling for swingtrack.
//! Provides custom error types for each module with proper context and error chaining.
//!
//! ## Error Types
//! - `SessionError`: Caller misuse of the session lifecycle
//! - `ConfigError`: Configuration file I/O and parsing errors
//! - `HistoryError`: History store I/O and encoding errors
//! - `ReplayError`: Recorded sample file errors
//!
//! ## What Is Not An Error
//! - Samples delivered outside a running session are dropped, not rejected
//! - A missing or undecodable history blob loads as an empty history
//! - A missing heart-rate sensor just leaves the heart-rate fields at 0.0

use std::fmt;

/// Errors returned when the session lifecycle is driven out of order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// `start` called on a session that already left Idle
    AlreadyStarted,
    /// `stop` called before `start`
    NotRunning,
    /// `stop` called a second time
    AlreadyStopped,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::AlreadyStarted => write!(f, "Session has already been started"),
            SessionError::NotRunning => write!(f, "Session is not running"),
            SessionError::AlreadyStopped => write!(f, "Session has already been stopped"),
        }
    }
}

impl std::error::Error for SessionError {}

/// Errors that can occur during configuration operations
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read config file
    ReadFailed(std::io::Error),
    /// Failed to write config file
    WriteFailed(std::io::Error),
    /// Failed to parse config file
    ParseFailed(toml::de::Error),
    /// Failed to serialize config
    SerializeFailed(toml::ser::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ReadFailed(e) => {
                write!(f, "Failed to read config file: {}", e)
            }
            ConfigError::WriteFailed(e) => {
                write!(f, "Failed to write config file: {}", e)
            }
            ConfigError::ParseFailed(e) => {
                write!(f, "Failed to parse config file: {}", e)
            }
            ConfigError::SerializeFailed(e) => {
                write!(f, "Failed to serialize config: {}", e)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadFailed(e) => Some(e),
            ConfigError::WriteFailed(e) => Some(e),
            ConfigError::ParseFailed(e) => Some(e),
            ConfigError::SerializeFailed(e) => Some(e),
        }
    }
}

/// Errors that can occur while persisting the session history
#[derive(Debug)]
pub enum HistoryError {
    /// Failed to read the stored blob (other than it being absent)
    ReadFailed(std::io::Error),
    /// Failed to write the replacement blob
    WriteFailed(std::io::Error),
    /// Failed to encode the history as JSON
    EncodeFailed(serde_json::Error),
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryError::ReadFailed(e) => write!(f, "Failed to read history: {}", e),
            HistoryError::WriteFailed(e) => write!(f, "Failed to write history: {}", e),
            HistoryError::EncodeFailed(e) => write!(f, "Failed to encode history: {}", e),
        }
    }
}

impl std::error::Error for HistoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HistoryError::ReadFailed(e) => Some(e),
            HistoryError::WriteFailed(e) => Some(e),
            HistoryError::EncodeFailed(e) => Some(e),
        }
    }
}

/// Errors that can occur while replaying a recorded sample file
#[derive(Debug)]
pub enum ReplayError {
    /// Failed to read the input
    ReadFailed(std::io::Error),
    /// A line was not a valid sample record
    ParseFailed { line: usize, source: serde_json::Error },
    /// The input held no samples and no explicit session bounds were given
    Empty,
    /// The session rejected a lifecycle call
    Session(SessionError),
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayError::ReadFailed(e) => write!(f, "Failed to read samples: {}", e),
            ReplayError::ParseFailed { line, source } => {
                write!(f, "Invalid sample on line {}: {}", line, source)
            }
            ReplayError::Empty => write!(f, "No samples to replay"),
            ReplayError::Session(e) => write!(f, "Session error: {}", e),
        }
    }
}

impl std::error::Error for ReplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReplayError::ReadFailed(e) => Some(e),
            ReplayError::ParseFailed { source, .. } => Some(source),
            ReplayError::Empty => None,
            ReplayError::Session(e) => Some(e),
        }
    }
}

impl From<SessionError> for ReplayError {
    fn from(e: SessionError) -> Self {
        ReplayError::Session(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_error_display() {
        let err = SessionError::NotRunning;
        assert!(err.to_string().contains("not running"));
    }

    #[test]
    fn test_config_error_chain() {
        use std::error::Error;
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = ConfigError::ReadFailed(io_err);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_replay_error_reports_line() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ReplayError::ParseFailed { line: 7, source };
        assert!(err.to_string().contains("line 7"));
    }
}
