//! Client configuration, read from the environment.

use core::str::FromStr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use assetctl_auth::ClientKind;
use assetctl_observability::LogFormat;

pub const API_URL_VAR: &str = "ASSETCTL_API_URL";
pub const CLIENT_VAR: &str = "ASSETCTL_CLIENT";
pub const SESSION_FILE_VAR: &str = "ASSETCTL_SESSION_FILE";
pub const REQUEST_TIMEOUT_VAR: &str = "ASSETCTL_REQUEST_TIMEOUT_SECS";
pub const STALE_RESPONSES_VAR: &str = "ASSETCTL_STALE_RESPONSES";
pub const LOG_FORMAT_VAR: &str = "ASSETCTL_LOG_FORMAT";

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// What to do with a response that arrives after the identity it was
/// requested under has changed (sign-out or sign-in while in flight).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum StalePolicy {
    /// Fail the call with a stale-session error.
    #[default]
    Discard,
    /// Hand the response to the caller anyway.
    Accept,
}

impl FromStr for StalePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "discard" => Ok(StalePolicy::Discard),
            "accept" => Ok(StalePolicy::Accept),
            other => Err(format!("expected 'discard' or 'accept', got '{other}'")),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base address of the remote service.
    pub api_url: String,
    /// Tag sent in `X-Client`.
    pub client: ClientKind,
    /// Where the signed-in user is persisted; `None` means the OS default.
    pub session_file: Option<PathBuf>,
    /// Per-request timeout; `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
    pub stale_responses: StalePolicy,
    pub log_format: LogFormat,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            client: ClientKind::default(),
            session_file: None,
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
            stale_responses: StalePolicy::default(),
            log_format: LogFormat::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut cfg = Self::default();

        match get(API_URL_VAR) {
            Some(url) => {
                let url = url.trim().to_string();
                url::Url::parse(&url).map_err(|e| invalid(API_URL_VAR, e))?;
                cfg.api_url = url;
            }
            None => tracing::debug!("{API_URL_VAR} not set; using {DEFAULT_API_URL}"),
        }

        if let Some(raw) = get(CLIENT_VAR) {
            cfg.client = raw.parse().map_err(|e| invalid(CLIENT_VAR, e))?;
        }

        cfg.session_file = get(SESSION_FILE_VAR).map(PathBuf::from);

        if let Some(raw) = get(REQUEST_TIMEOUT_VAR) {
            let secs: u64 = raw.trim().parse().map_err(|e| invalid(REQUEST_TIMEOUT_VAR, e))?;
            cfg.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        if let Some(raw) = get(STALE_RESPONSES_VAR) {
            cfg.stale_responses = raw.parse().map_err(|e| invalid(STALE_RESPONSES_VAR, e))?;
        }

        if let Some(raw) = get(LOG_FORMAT_VAR) {
            cfg.log_format = raw.parse().map_err(|e| invalid(LOG_FORMAT_VAR, e))?;
        }

        Ok(cfg)
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}

fn invalid(var: &'static str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        var,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, ClientConfig::default());
        assert_eq!(cfg.base_url(), "http://localhost:5000");
    }

    #[test]
    fn reads_every_variable() {
        let cfg = ClientConfig::from_lookup(lookup(&[
            (API_URL_VAR, "https://api.example.org/"),
            (CLIENT_VAR, "python"),
            (SESSION_FILE_VAR, "/tmp/s.json"),
            (REQUEST_TIMEOUT_VAR, "5"),
            (STALE_RESPONSES_VAR, "accept"),
            (LOG_FORMAT_VAR, "pretty"),
        ]))
        .unwrap();

        assert_eq!(cfg.base_url(), "https://api.example.org");
        assert_eq!(cfg.client, ClientKind::Python);
        assert_eq!(cfg.session_file, Some(PathBuf::from("/tmp/s.json")));
        assert_eq!(cfg.request_timeout, Some(Duration::from_secs(5)));
        assert_eq!(cfg.stale_responses, StalePolicy::Accept);
        assert_eq!(cfg.log_format, LogFormat::Pretty);
    }

    #[test]
    fn zero_timeout_disables_it() {
        let cfg = ClientConfig::from_lookup(lookup(&[(REQUEST_TIMEOUT_VAR, "0")])).unwrap();
        assert_eq!(cfg.request_timeout, None);
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = ClientConfig::from_lookup(lookup(&[(REQUEST_TIMEOUT_VAR, "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: REQUEST_TIMEOUT_VAR, .. }));

        let err = ClientConfig::from_lookup(lookup(&[(API_URL_VAR, "not a url")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: API_URL_VAR, .. }));
    }
}
