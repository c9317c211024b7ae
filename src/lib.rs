//! IP Tracker Library
//!
//! This library provides the core functionality for IP Tracker: configuration,
//! error handling, data models, the lookup client, session and persisted
//! history, the saved-result slot, color themes, and command dispatch.

pub mod config;
pub mod error;
pub mod models;
pub mod lookup;
pub mod history;
pub mod saved;
pub mod theme;
pub mod session;

pub use config::Config;
pub use error::{Result, TrackerError};
pub use history::HistoryStore;
pub use lookup::LookupClient;
pub use models::{HistoryRecord, LookupResult};
pub use saved::SavedResultStore;
pub use session::{Command, HistoryScope, Outcome, Session};
pub use theme::{Theme, ThemeName};
