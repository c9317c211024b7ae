//! History Module
//!
//! Session history lives in memory and is merged into the on-disk log
//! (`data.json` by default) when the session ends. The file is always
//! rewritten as a whole JSON array.
use crate::error::{Result, TrackerError};
use crate::models::HistoryRecord;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const DEFAULT_HISTORY_FILE: &str = "data.json";

/// HistoryStore keeps the lookups of the current session and the path of
/// the persisted log they are flushed into.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    session: Vec<HistoryRecord>,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            session: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a lookup to the session log. Nothing is written to disk.
    pub fn record_lookup(&mut self, query: impl Into<String>, timestamp: f64) {
        self.session.push(HistoryRecord::new(query, timestamp));
    }

    pub fn list_session(&self) -> impl Iterator<Item = &HistoryRecord> + '_ {
        self.session.iter()
    }

    pub fn session_len(&self) -> usize {
        self.session.len()
    }

    pub fn clear_session(&mut self) {
        self.session.clear();
    }

    /// Reads the persisted log. A missing file reads as an empty log.
    pub fn list_persisted(&self) -> Result<std::vec::IntoIter<HistoryRecord>> {
        Ok(read_log(&self.path)?.into_iter())
    }

    /// Merges the session log into the persisted log and rewrites the file.
    ///
    /// The session log is emptied once the write succeeds, so flushing again
    /// without new lookups rewrites the same array. Returns the number of
    /// records now on disk.
    pub fn flush(&mut self) -> Result<usize> {
        let mut records = read_log(&self.path)?;
        records.extend(self.session.iter().cloned());
        write_log(&self.path, &records)?;
        log::info!(
            "Flushed {} session record(s) to {} ({} total)",
            self.session.len(),
            self.path.display(),
            records.len()
        );
        self.session.clear();
        Ok(records.len())
    }

    /// Empties the persisted log. A missing file is already clear and is not created.
    pub fn clear_persisted(&self) -> Result<()> {
        match fs::metadata(&self.path) {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No history file at {}, nothing to clear", self.path.display());
                return Ok(());
            }
            Err(e) => return Err(TrackerError::persistence(&self.path, e)),
        }
        write_log(&self.path, &[])?;
        log::info!("Cleared history file {}", self.path.display());
        Ok(())
    }
}

fn read_log(path: &Path) -> Result<Vec<HistoryRecord>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(TrackerError::persistence(path, e)),
    };
    serde_json::from_str(&contents).map_err(|e| TrackerError::persistence(path, e))
}

fn write_log(path: &Path, records: &[HistoryRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(records).map_err(|e| TrackerError::persistence(path, e))?;
    fs::write(path, json).map_err(|e| TrackerError::persistence(path, e))
}
