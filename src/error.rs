//! Error Handling Module
//!
//! This module defines the error taxonomy for IP Tracker using the `thiserror` crate.
//! Every variant is recoverable: callers show the message and carry on.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Invalid query '{query}': expected at least 5 characters, got {len}")]
    InvalidQuery { query: String, len: usize },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("{title} (HTTP {status}): {message}")]
    Remote {
        status: u16,
        title: String,
        message: String,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Persistence error on {}: {reason}", .path.display())]
    Persistence { path: PathBuf, reason: String },

    #[error("Nothing saved yet at {}", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

impl TrackerError {
    /// Wraps a file failure together with the path it happened on.
    pub fn persistence(path: &Path, reason: impl ToString) -> Self {
        TrackerError::Persistence {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

impl From<reqwest::Error> for TrackerError {
    fn from(e: reqwest::Error) -> Self {
        TrackerError::Transport(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
