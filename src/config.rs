//! Configuration Module
//!
//! This module reads configuration values from environment variables and
//! provides sensible defaults: the lookup service URL, the two data files and
//! the color theme.

use crate::history::DEFAULT_HISTORY_FILE;
use crate::lookup::DEFAULT_SERVICE_URL;
use crate::saved::DEFAULT_RESULT_FILE;
use crate::theme::ThemeName;
use anyhow::{Context, Result};
use reqwest::Url;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub service_url: String,
    pub history_file: PathBuf,
    pub result_file: PathBuf,
    pub theme: ThemeName,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            history_file: PathBuf::from(DEFAULT_HISTORY_FILE),
            result_file: PathBuf::from(DEFAULT_RESULT_FILE),
            theme: ThemeName::default(),
        }
    }
}

impl Config {
    /// Creates a new configuration by reading environment variables.
    /// If a variable is missing or empty, a default value is used.
    pub fn new() -> Result<Self> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Builds a configuration from any key lookup (the environment in `new`).
    pub fn from_source<F>(source: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Treat blank values like unset ones.
        let get = |key: &str| source(key).map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let defaults = Config::default();

        let service_url = match get("IPTRACKER_SERVICE_URL") {
            Some(url) => {
                Url::parse(&url).with_context(|| format!("Invalid service URL: {}", url))?;
                url.trim_end_matches('/').to_string()
            }
            None => defaults.service_url,
        };

        let history_file = get("IPTRACKER_HISTORY_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.history_file);

        let result_file = get("IPTRACKER_RESULT_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.result_file);

        let theme = match get("IPTRACKER_THEME") {
            Some(name) => name.parse().map_err(anyhow::Error::msg)?,
            None => defaults.theme,
        };

        Ok(Config {
            service_url,
            history_file,
            result_file,
            theme,
        })
    }
}
