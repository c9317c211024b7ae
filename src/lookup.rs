//! Lookup Module
//!
//! This module queries the IP metadata service (ipinfo.io by default). One
//! blocking GET per lookup: no cache, no retry and no timeout.
use crate::error::{Result, TrackerError};
use crate::models::{LookupResult, MIN_QUERY_LEN};
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_SERVICE_URL: &str = "http://ipinfo.io";

/// Error body sent by the service on failure.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    title: Option<String>,
    message: Option<String>,
}

/// LookupClient resolves a query string against the lookup service.
#[derive(Debug)]
pub struct LookupClient {
    client: Client,
    base_url: String,
}

impl LookupClient {
    /// Creates a client for the service rooted at `base_url`.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let base_url = base_url.as_ref().trim().trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| {
            TrackerError::Transport(format!("invalid service URL '{}': {}", base_url, e))
        })?;
        let client = Client::builder()
            .timeout(None::<Duration>)
            .user_agent(concat!("iptracker/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Looks up metadata for `query`.
    ///
    /// Queries shorter than five characters are rejected before any request is made.
    pub fn lookup(&self, query: &str) -> Result<LookupResult> {
        let query = validate_query(query)?;
        let url = format!("{}/{}", self.base_url, query);
        log::debug!("GET {}", url);

        let response = self.client.get(&url).send().map_err(|e| {
            log::warn!("Lookup for {} failed: {}", query, e);
            TrackerError::from(e)
        })?;
        let status = response.status();
        let body = response.text()?;

        if status != StatusCode::OK {
            let err = remote_error(status, &body);
            log::warn!("Lookup for {} rejected: {}", query, err);
            return Err(err);
        }

        let result = parse_result(&body)?;
        log::info!("Successful lookup for {} ({} fields)", query, result.len());
        Ok(result)
    }
}

/// Checks the minimum length and returns the trimmed query.
pub fn validate_query(query: &str) -> Result<&str> {
    let trimmed = query.trim();
    let len = trimmed.chars().count();
    if len < MIN_QUERY_LEN {
        return Err(TrackerError::InvalidQuery {
            query: trimmed.to_string(),
            len,
        });
    }
    Ok(trimmed)
}

fn parse_result(body: &str) -> Result<LookupResult> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(LookupResult::new(map)),
        Ok(other) => Err(TrackerError::MalformedResponse(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(TrackerError::MalformedResponse(e.to_string())),
    }
}

/// Builds a Remote error, falling back to the status line when the body
/// carries no usable `error` object.
fn remote_error(status: StatusCode, body: &str) -> TrackerError {
    let detail = serde_json::from_str::<ErrorBody>(body).ok().map(|b| b.error);
    let title = detail
        .as_ref()
        .and_then(|d| d.title.clone())
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
    let message = detail
        .and_then(|d| d.message)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());
    TrackerError::Remote {
        status: status.as_u16(),
        title,
        message,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
