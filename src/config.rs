//! Session configuration parsed from environment variables.

use std::time::Duration;

use crate::error::SessionError;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_LOGOUT_GRACE_MS: u64 = 1000;

/// Typed settings for the session layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// API origin, without trailing slash.
    pub api_url: String,
    /// How long the logout-in-progress flag suppresses 401 redirects.
    pub logout_grace: Duration,
    /// Whole-request timeout; `None` keeps the HTTP library default.
    pub request_timeout: Option<Duration>,
    /// Connect timeout; `None` keeps the HTTP library default.
    pub connect_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            logout_grace: Duration::from_millis(DEFAULT_LOGOUT_GRACE_MS),
            request_timeout: None,
            connect_timeout: None,
        }
    }
}

impl SessionConfig {
    /// Config pointing at `api_url` with every other setting defaulted.
    #[must_use]
    pub fn with_api_url(api_url: &str) -> Self {
        Self { api_url: normalize_url(api_url), ..Self::default() }
    }

    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `FOODCOURT_API_URL`: default `http://localhost:5000/api`
    /// - `FOODCOURT_LOGOUT_GRACE_MS`: default 1000
    /// - `FOODCOURT_REQUEST_TIMEOUT_SECS`: unset keeps the library default
    /// - `FOODCOURT_CONNECT_TIMEOUT_SECS`: unset keeps the library default
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] if a variable is present but unparsable.
    pub fn from_env() -> Result<Self, SessionError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build typed config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] if a value is present but unparsable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SessionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = match lookup("FOODCOURT_API_URL") {
            Some(raw) => parse_api_url(&raw)?,
            None => DEFAULT_API_URL.to_owned(),
        };
        let logout_grace =
            Duration::from_millis(parse_u64(&lookup, "FOODCOURT_LOGOUT_GRACE_MS")?.unwrap_or(DEFAULT_LOGOUT_GRACE_MS));
        let request_timeout = parse_u64(&lookup, "FOODCOURT_REQUEST_TIMEOUT_SECS")?.map(Duration::from_secs);
        let connect_timeout = parse_u64(&lookup, "FOODCOURT_CONNECT_TIMEOUT_SECS")?.map(Duration::from_secs);

        Ok(Self { api_url, logout_grace, request_timeout, connect_timeout })
    }
}

fn parse_u64<F>(lookup: &F, key: &str) -> Result<Option<u64>, SessionError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<u64>()
        .map(Some)
        .map_err(|_| SessionError::Config(format!("{key} must be a non-negative integer, got {raw:?}")))
}

fn parse_api_url(raw: &str) -> Result<String, SessionError> {
    let url = normalize_url(raw);
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(url)
    } else {
        Err(SessionError::Config(format!("FOODCOURT_API_URL must be an http(s) URL, got {raw:?}")))
    }
}

fn normalize_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
