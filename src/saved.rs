//! Saved Result Module
//!
//! Keeps a single saved lookup result (`fetched_data.json` by default),
//! stamped with the time it was captured. Each save replaces the previous one.
use crate::error::{Result, TrackerError};
use crate::models::{LookupResult, DATETIME_FIELD};
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const DEFAULT_RESULT_FILE: &str = "fetched_data.json";

/// SavedResultStore reads and writes the single-slot result file.
#[derive(Debug, Clone)]
pub struct SavedResultStore {
    path: PathBuf,
}

impl SavedResultStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stamps `result` with the current local time and overwrites the file.
    /// Returns what was written.
    pub fn save(&self, result: &LookupResult) -> Result<LookupResult> {
        let mut fields = result.fields().clone();
        let captured = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        fields.insert(DATETIME_FIELD.to_string(), Value::String(captured));
        let saved = LookupResult::new(fields);

        let json = serde_json::to_string_pretty(&saved)
            .map_err(|e| TrackerError::persistence(&self.path, e))?;
        fs::write(&self.path, json).map_err(|e| TrackerError::persistence(&self.path, e))?;
        log::info!("Saved lookup result to {}", self.path.display());
        Ok(saved)
    }

    /// Reads the saved result back, or `NotFound` if nothing was saved yet.
    pub fn load(&self) -> Result<LookupResult> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(TrackerError::NotFound(self.path.clone()))
            }
            Err(e) => return Err(TrackerError::persistence(&self.path, e)),
        };
        serde_json::from_str(&contents).map_err(|e| TrackerError::persistence(&self.path, e))
    }
}
