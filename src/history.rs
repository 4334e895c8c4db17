//! # Session History Module
//!
//! Append-only log of finished sessions, persisted as one JSON array under a
//! single key.
//!
//! ## Storage Model
//! The backing store only offers whole-value get/set, so every append reads
//! the full array, pushes the new record and writes the full array back.
//! `FileStore` makes the replacement atomic with a temp file and a rename.
//!
//! ## Lenient Decoding
//! An absent, empty or undecodable blob loads as an empty history. The decode
//! failure is logged and otherwise swallowed, so the next append starts a
//! fresh array.
//!
//! ## Blob Format
//! ```text
//! [{"duration":2000,"averageFrequency":1.5,"maxFrequency":2.0,"cycleCount":3,
//!   "startTime":1700000000000,"endTime":1700000002000,
//!   "averageHeartRate":150.0,"maxHeartRate":200.0}, ...]
//! ```
//! Oldest session first.

use crate::error::HistoryError;
use crate::session::SessionSummary;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Key the history array is stored under
pub const HISTORY_RECORDS_KEY: &str = "history_records";

/// Whole-value key/value storage
pub trait KeyValueStore {
    /// `Ok(None)` when nothing has been stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>, HistoryError>;
    /// Replace the whole value stored under `key`
    fn set(&mut self, key: &str, value: &str) -> Result<(), HistoryError>;
}

/// One file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, HistoryError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(HistoryError::ReadFailed(e)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), HistoryError> {
        fs::create_dir_all(&self.dir).map_err(HistoryError::WriteFailed)?;

        let path = self.path_for(key);
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, value).map_err(HistoryError::WriteFailed)?;
        fs::rename(&tmp_path, &path).map_err(HistoryError::WriteFailed)?;

        Ok(())
    }
}

/// In-memory store, mostly for tests and embedding hosts with their own persistence
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, HistoryError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), HistoryError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Decode a stored blob, falling back to an empty history on any failure
pub fn decode_history(blob: &str) -> Vec<SessionSummary> {
    if blob.trim().is_empty() {
        return Vec::new();
    }

    match serde_json::from_str::<Option<Vec<SessionSummary>>>(blob) {
        Ok(records) => records.unwrap_or_default(),
        Err(e) => {
            log::warn!("Discarding undecodable session history: {}", e);
            Vec::new()
        }
    }
}

pub fn encode_history(records: &[SessionSummary]) -> Result<String, HistoryError> {
    serde_json::to_string(records).map_err(HistoryError::EncodeFailed)
}

pub struct HistoryStore<S> {
    store: S,
}

impl<S: KeyValueStore> HistoryStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Append a finished session after all previously stored ones
    pub fn append(&mut self, summary: SessionSummary) -> Result<(), HistoryError> {
        let mut records = match self.store.get(HISTORY_RECORDS_KEY)? {
            Some(blob) => decode_history(&blob),
            None => Vec::new(),
        };
        records.push(summary);

        let blob = encode_history(&records)?;
        self.store.set(HISTORY_RECORDS_KEY, &blob)?;

        log::info!("Saved session history ({} sessions)", records.len());
        Ok(())
    }

    /// All stored sessions, oldest first
    pub fn load_all(&self) -> Vec<SessionSummary> {
        match self.store.get(HISTORY_RECORDS_KEY) {
            Ok(Some(blob)) => decode_history(&blob),
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("{}", e);
                Vec::new()
            }
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
