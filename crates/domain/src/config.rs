//! Client settings
//!
//! Loaded by the infra crate from environment variables or a config file.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_LONG_POLL_TIMEOUT_MS, DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_TOKEN_SKEW_SECS,
    DEFAULT_USER_AGENT,
};
use crate::errors::AdtError;

/// Whether the connection keeps cookies and CSRF token across calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    #[default]
    Stateful,
    Stateless,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stateful => "stateful",
            Self::Stateless => "stateless",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionType {
    type Err = AdtError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "stateful" => Ok(Self::Stateful),
            "stateless" => Ok(Self::Stateless),
            other => Err(AdtError::Config(format!("unknown session type '{other}'"))),
        }
    }
}

/// Connection-level settings shared by every request of a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub sap_url: Option<String>,
    pub sap_client: Option<String>,
    pub request_timeout_ms: u64,
    pub long_poll_timeout_ms: u64,
    pub session_type: SessionType,
    pub token_skew_secs: u64,
    pub user_agent: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            sap_url: None,
            sap_client: None,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            long_poll_timeout_ms: DEFAULT_LONG_POLL_TIMEOUT_MS,
            session_type: SessionType::Stateful,
            token_skew_secs: DEFAULT_TOKEN_SKEW_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn long_poll_timeout(&self) -> Duration {
        Duration::from_millis(self.long_poll_timeout_ms)
    }

    pub fn token_skew(&self) -> Duration {
        Duration::from_secs(self.token_skew_secs)
    }

    /// Reject settings no connection could work with.
    pub fn validate(&self) -> Result<(), AdtError> {
        if self.request_timeout_ms == 0 {
            return Err(AdtError::Config("request_timeout_ms must be positive".into()));
        }
        if self.long_poll_timeout_ms < self.request_timeout_ms {
            return Err(AdtError::Config(
                "long_poll_timeout_ms must not be shorter than request_timeout_ms".into(),
            ));
        }
        if let Some(url) = &self.sap_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(AdtError::Config(format!("sap_url '{url}' is not an http(s) URL")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_protocol_timeouts() {
        let settings = ClientSettings::default();
        assert_eq!(settings.request_timeout(), Duration::from_secs(1));
        assert_eq!(settings.long_poll_timeout(), Duration::from_secs(60));
        assert_eq!(settings.token_skew(), Duration::from_secs(30));
        assert_eq!(settings.session_type, SessionType::Stateful);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: ClientSettings =
            serde_json::from_str(r#"{"sap_url":"https://sap.example.com","session_type":"stateless"}"#)
                .expect("valid settings");
        assert_eq!(settings.session_type, SessionType::Stateless);
        assert_eq!(settings.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let settings = ClientSettings { request_timeout_ms: 0, ..ClientSettings::default() };
        assert!(settings.validate().is_err());

        let settings =
            ClientSettings { sap_url: Some("ftp://sap".into()), ..ClientSettings::default() };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn session_type_parses() {
        assert_eq!("Stateless".parse::<SessionType>().ok(), Some(SessionType::Stateless));
        assert!("sticky".parse::<SessionType>().is_err());
    }
}
