//! Session Module
//!
//! A `Session` owns everything one run of the tracker touches: the lookup
//! client, the history store, the saved-result slot and the active theme.
//! Front-ends turn user input into a `Command` and hand it to `execute`.
use crate::error::{Result, TrackerError};
use crate::history::HistoryStore;
use crate::lookup::LookupClient;
use crate::models::{now_timestamp, HistoryRecord, LookupResult};
use crate::saved::SavedResultStore;
use crate::theme::{Theme, ThemeName};
use std::fmt;
use std::str::FromStr;

pub const ABOUT_TEXT: &str = "IP Tracker\n\
    Looks up public metadata (location, ISP, organization, timezone) for an IP \
    address or hostname using the ipinfo.io service.\n\
    Every successful lookup is added to the session history, which is merged \
    into the history file when the session ends.";

pub const USAGE_TEXT: &str = "Commands:\n  \
    lookup <ip> [save]        look up an address, optionally saving the result\n  \
    history [persisted]       show session (default) or persisted history\n  \
    clear [persisted]         clear session (default) or persisted history\n  \
    saved                     show the last saved result\n  \
    theme <name>              switch colors (classic, light, matrix, ocean)\n  \
    about                     describe this tool\n  \
    help                      show this text\n  \
    exit                      flush history and quit";

/// Which history log a command applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryScope {
    #[default]
    Session,
    Persisted,
}

impl fmt::Display for HistoryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryScope::Session => write!(f, "session"),
            HistoryScope::Persisted => write!(f, "persisted"),
        }
    }
}

impl FromStr for HistoryScope {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "session" => Ok(HistoryScope::Session),
            "persisted" | "saved" | "all" => Ok(HistoryScope::Persisted),
            _ => Err(format!("Invalid history scope: {}", s)),
        }
    }
}

/// One user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Lookup { query: String, save: bool },
    ShowHistory(HistoryScope),
    ClearHistory(HistoryScope),
    ShowSaved,
    SetTheme(ThemeName),
    About,
    Usage,
    Exit,
}

impl FromStr for Command {
    type Err = TrackerError;

    /// Parses one line of interactive input.
    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(TrackerError::InvalidCommand("empty input".to_string()));
        };
        let args: Vec<&str> = words.collect();
        let scope = |args: &[&str]| -> Result<HistoryScope> {
            match args {
                [] => Ok(HistoryScope::Session),
                [scope] => scope.parse().map_err(TrackerError::InvalidCommand),
                _ => Err(TrackerError::InvalidCommand(line.to_string())),
            }
        };

        match (verb.to_lowercase().as_str(), args.as_slice()) {
            ("lookup" | "fetch" | "track", [query]) => Ok(Command::Lookup {
                query: query.to_string(),
                save: false,
            }),
            ("lookup" | "fetch" | "track", [query, "save"]) => Ok(Command::Lookup {
                query: query.to_string(),
                save: true,
            }),
            ("history", rest) => Ok(Command::ShowHistory(scope(rest)?)),
            ("clear", rest) => Ok(Command::ClearHistory(scope(rest)?)),
            ("saved", []) => Ok(Command::ShowSaved),
            ("theme", [name]) => name
                .parse()
                .map(Command::SetTheme)
                .map_err(TrackerError::InvalidCommand),
            ("about", []) => Ok(Command::About),
            ("help" | "usage" | "?", []) => Ok(Command::Usage),
            ("exit" | "quit" | "q", []) => Ok(Command::Exit),
            // A bare address is a lookup.
            (_, []) if verb.contains('.') || verb.contains(':') => Ok(Command::Lookup {
                query: verb.to_string(),
                save: false,
            }),
            _ => Err(TrackerError::InvalidCommand(line.to_string())),
        }
    }
}

/// What a command produced, for the front-end to render.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Fetched {
        result: LookupResult,
        saved: bool,
    },
    History {
        scope: HistoryScope,
        records: Vec<HistoryRecord>,
    },
    Cleared(HistoryScope),
    Saved(LookupResult),
    ThemeChanged(ThemeName),
    Text(&'static str),
    Exit,
}

/// Session state for one run of the tracker.
#[derive(Debug)]
pub struct Session {
    client: LookupClient,
    history: HistoryStore,
    saved: SavedResultStore,
    theme: ThemeName,
}

impl Session {
    pub fn new(
        client: LookupClient,
        history: HistoryStore,
        saved: SavedResultStore,
        theme: ThemeName,
    ) -> Self {
        Self {
            client,
            history,
            saved,
            theme,
        }
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn theme(&self) -> Theme {
        self.theme.theme()
    }

    pub fn theme_name(&self) -> ThemeName {
        self.theme
    }

    /// Runs one command. A failed command leaves the session as it was.
    pub fn execute(&mut self, command: Command) -> Result<Outcome> {
        log::debug!("Executing {:?}", command);
        match command {
            Command::Lookup { query, save } => {
                let result = self.lookup(&query)?;
                if save {
                    self.saved.save(&result)?;
                }
                Ok(Outcome::Fetched { result, saved: save })
            }
            Command::ShowHistory(scope) => {
                let records: Vec<HistoryRecord> = match scope {
                    HistoryScope::Session => self.history.list_session().cloned().collect(),
                    HistoryScope::Persisted => self.history.list_persisted()?.collect(),
                };
                Ok(Outcome::History { scope, records })
            }
            Command::ClearHistory(scope) => {
                match scope {
                    HistoryScope::Session => self.history.clear_session(),
                    HistoryScope::Persisted => self.history.clear_persisted()?,
                }
                Ok(Outcome::Cleared(scope))
            }
            Command::ShowSaved => Ok(Outcome::Saved(self.saved.load()?)),
            Command::SetTheme(name) => {
                self.theme = name;
                Ok(Outcome::ThemeChanged(name))
            }
            Command::About => Ok(Outcome::Text(ABOUT_TEXT)),
            Command::Usage => Ok(Outcome::Text(USAGE_TEXT)),
            Command::Exit => Ok(Outcome::Exit),
        }
    }

    /// Looks up `query` and records it in the session history on success.
    pub fn lookup(&mut self, query: &str) -> Result<LookupResult> {
        let started = now_timestamp();
        let result = self.client.lookup(query)?;
        self.history.record_lookup(query.trim(), started);
        Ok(result)
    }

    /// Flushes the session history to disk. Call once when the session ends.
    ///
    /// Returns `None` without touching the file when the session recorded nothing.
    pub fn finish(&mut self) -> Result<Option<usize>> {
        if self.history.session_len() == 0 {
            return Ok(None);
        }
        self.history.flush().map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn offline_session(dir: &std::path::Path) -> Session {
        Session::new(
            LookupClient::new("http://127.0.0.1:9").unwrap(),
            HistoryStore::new(dir.join("data.json")),
            SavedResultStore::new(dir.join("fetched_data.json")),
            ThemeName::Classic,
        )
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!(
            "lookup 8.8.8.8".parse::<Command>().unwrap(),
            Command::Lookup { query: "8.8.8.8".to_string(), save: false }
        );
        assert_eq!(
            "fetch 8.8.8.8 save".parse::<Command>().unwrap(),
            Command::Lookup { query: "8.8.8.8".to_string(), save: true }
        );
        assert_eq!(
            "1.1.1.1".parse::<Command>().unwrap(),
            Command::Lookup { query: "1.1.1.1".to_string(), save: false }
        );
        assert_eq!(
            "history persisted".parse::<Command>().unwrap(),
            Command::ShowHistory(HistoryScope::Persisted)
        );
        assert_eq!(
            "clear".parse::<Command>().unwrap(),
            Command::ClearHistory(HistoryScope::Session)
        );
        assert_eq!("theme light".parse::<Command>().unwrap(), Command::SetTheme(ThemeName::Light));
        assert_eq!("QUIT".parse::<Command>().unwrap(), Command::Exit);
    }

    #[test]
    fn test_command_parsing_rejects_garbage() {
        assert!("".parse::<Command>().is_err());
        assert!("history everything".parse::<Command>().is_err());
        assert!("theme neon".parse::<Command>().is_err());
        assert!("dance".parse::<Command>().is_err());
        assert!("lookup 8.8.8.8 later".parse::<Command>().is_err());
    }

    #[test]
    fn test_short_query_leaves_session_unchanged() {
        let dir = tempdir().unwrap();
        let mut session = offline_session(dir.path());
        let result = session.execute(Command::Lookup { query: "ab".to_string(), save: false });
        assert!(matches!(result, Err(TrackerError::InvalidQuery { .. })));
        assert_eq!(session.history().session_len(), 0);
    }

    #[test]
    fn test_failed_lookup_is_not_recorded() {
        let dir = tempdir().unwrap();
        let mut session = offline_session(dir.path());
        let result = session.execute(Command::Lookup { query: "8.8.8.8".to_string(), save: true });
        assert!(matches!(result, Err(TrackerError::Transport(_))));
        assert_eq!(session.history().session_len(), 0);
        assert!(!dir.path().join("fetched_data.json").exists());
    }

    #[test]
    fn test_theme_switch() {
        let dir = tempdir().unwrap();
        let mut session = offline_session(dir.path());
        let outcome = session.execute(Command::SetTheme(ThemeName::Matrix)).unwrap();
        assert_eq!(outcome, Outcome::ThemeChanged(ThemeName::Matrix));
        assert_eq!(session.theme_name(), ThemeName::Matrix);
    }

    #[test]
    fn test_show_saved_before_any_save() {
        let dir = tempdir().unwrap();
        let mut session = offline_session(dir.path());
        assert!(matches!(session.execute(Command::ShowSaved), Err(TrackerError::NotFound(_))));
    }

    #[test]
    fn test_finish_without_lookups_writes_nothing() {
        let dir = tempdir().unwrap();
        let mut session = offline_session(dir.path());
        assert_eq!(session.finish().unwrap(), None);
        assert!(!dir.path().join("data.json").exists());
    }

    #[test]
    fn test_text_panels_and_exit() {
        let dir = tempdir().unwrap();
        let mut session = offline_session(dir.path());
        assert_eq!(session.execute(Command::About).unwrap(), Outcome::Text(ABOUT_TEXT));
        assert_eq!(session.execute(Command::Usage).unwrap(), Outcome::Text(USAGE_TEXT));
        assert_eq!(session.execute(Command::Exit).unwrap(), Outcome::Exit);
    }
}
