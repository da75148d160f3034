//! Authentication configuration types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AdtError;
use crate::headers::{AUTH_TYPE_BASIC, AUTH_TYPE_JWT, AUTH_TYPE_XSUAA};

/// Authentication type of an SAP connection (`x-sap-auth-type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    Jwt,
    Basic,
    Xsuaa,
}

impl AuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jwt => AUTH_TYPE_JWT,
            Self::Basic => AUTH_TYPE_BASIC,
            Self::Xsuaa => AUTH_TYPE_XSUAA,
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthType {
    type Err = AdtError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            AUTH_TYPE_JWT => Ok(Self::Jwt),
            AUTH_TYPE_BASIC => Ok(Self::Basic),
            AUTH_TYPE_XSUAA => Ok(Self::Xsuaa),
            other => Err(AdtError::InvalidInput(format!("unknown auth type '{other}'"))),
        }
    }
}

/// Authentication method priority; higher wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AuthMethodPriority {
    /// No valid authentication
    None = 0,
    /// `x-sap-login` + `x-sap-password` + `x-sap-auth-type=basic`
    Basic = 1,
    /// `x-sap-jwt-token` + `x-sap-auth-type=jwt`
    DirectJwt = 2,
    /// `x-mcp-destination` + `x-sap-auth-type=jwt`
    McpDestination = 3,
    /// `x-sap-destination` (JWT only)
    SapDestination = 4,
}

impl AuthMethodPriority {
    pub fn value(self) -> u8 {
        self as u8
    }
}

/// Normalized authentication configuration produced by the auth resolver.
///
/// Exactly one method is active. Fields the active method does not use stay
/// `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedAuthConfig {
    pub priority: AuthMethodPriority,
    pub auth_type: AuthType,
    /// Absent for SAP destination auth, where the destination service
    /// supplies the URL.
    pub sap_url: Option<String>,
    pub sap_client: Option<String>,
    pub destination: Option<String>,
    pub jwt_token: Option<String>,
    pub refresh_token: Option<String>,
    pub uaa_url: Option<String>,
    pub uaa_client_id: Option<String>,
    pub uaa_client_secret: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidatedAuthConfig {
    /// Empty configuration for the given method; callers fill in the fields
    /// the method uses.
    pub fn for_method(priority: AuthMethodPriority, auth_type: AuthType) -> Self {
        Self {
            priority,
            auth_type,
            sap_url: None,
            sap_client: None,
            destination: None,
            jwt_token: None,
            refresh_token: None,
            uaa_url: None,
            uaa_client_id: None,
            uaa_client_secret: None,
            username: None,
            password: None,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// Outcome of validating inbound authentication headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderValidationResult {
    pub is_valid: bool,
    pub config: Option<ValidatedAuthConfig>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Values needed for obtaining and refreshing tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationConfig {
    pub uaa_url: String,
    pub uaa_client_id: String,
    pub uaa_client_secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Values needed for connecting to a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
    pub authorization_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sap_client: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Optional composition of authorization and connection configuration as
/// held by session stores and service keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uaa_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uaa_client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uaa_client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sap_client: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl StoredConfig {
    /// Authorization part, if all UAA credentials are present.
    pub fn authorization(&self) -> Option<AuthorizationConfig> {
        Some(AuthorizationConfig {
            uaa_url: self.uaa_url.clone()?,
            uaa_client_id: self.uaa_client_id.clone()?,
            uaa_client_secret: self.uaa_client_secret.clone()?,
            refresh_token: self.refresh_token.clone(),
        })
    }

    /// Connection part, if an authorization token is present.
    pub fn connection(&self) -> Option<ConnectionConfig> {
        Some(ConnectionConfig {
            service_url: self.service_url.clone(),
            authorization_token: self.authorization_token.clone()?,
            sap_client: self.sap_client.clone(),
            language: self.language.clone(),
        })
    }

    pub fn set_authorization(&mut self, config: AuthorizationConfig) {
        self.uaa_url = Some(config.uaa_url);
        self.uaa_client_id = Some(config.uaa_client_id);
        self.uaa_client_secret = Some(config.uaa_client_secret);
        if config.refresh_token.is_some() {
            self.refresh_token = config.refresh_token;
        }
    }

    pub fn set_connection(&mut self, config: ConnectionConfig) {
        if config.service_url.is_some() {
            self.service_url = config.service_url;
        }
        self.authorization_token = Some(config.authorization_token);
        if config.sap_client.is_some() {
            self.sap_client = config.sap_client;
        }
        if config.language.is_some() {
            self.language = config.language;
        }
    }
}

/// Connection parameters for one SAP system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SapConfig {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    pub auth_type: AuthType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Raw `Cookie` header value for SAML-established sessions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_cookies: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uaa_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uaa_client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uaa_client_secret: Option<String>,
}

impl TryFrom<&ValidatedAuthConfig> for SapConfig {
    type Error = AdtError;

    /// Fails for destination-based configs that have no URL yet; those need
    /// the destination resolved first.
    fn try_from(config: &ValidatedAuthConfig) -> Result<Self, Self::Error> {
        let url = config.sap_url.clone().ok_or_else(|| {
            AdtError::Config(format!(
                "auth config for destination {:?} has no SAP URL",
                config.destination
            ))
        })?;

        Ok(Self {
            url,
            client: config.sap_client.clone(),
            auth_type: config.auth_type,
            username: config.username.clone(),
            password: config.password.clone(),
            jwt_token: config.jwt_token.clone(),
            refresh_token: config.refresh_token.clone(),
            session_cookies: None,
            uaa_url: config.uaa_url.clone(),
            uaa_client_id: config.uaa_client_id.clone(),
            uaa_client_secret: config.uaa_client_secret.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_type_parses_case_insensitively() {
        assert_eq!("JWT".parse::<AuthType>().ok(), Some(AuthType::Jwt));
        assert_eq!(" basic ".parse::<AuthType>().ok(), Some(AuthType::Basic));
        assert!("saml".parse::<AuthType>().is_err());
    }

    #[test]
    fn priorities_order_destination_first() {
        assert!(AuthMethodPriority::SapDestination > AuthMethodPriority::McpDestination);
        assert!(AuthMethodPriority::DirectJwt > AuthMethodPriority::Basic);
        assert_eq!(AuthMethodPriority::SapDestination.value(), 4);
        assert_eq!(AuthMethodPriority::None.value(), 0);
    }

    #[test]
    fn stored_config_exposes_parts_only_when_complete() {
        let mut stored = StoredConfig {
            uaa_url: Some("https://uaa".into()),
            uaa_client_id: Some("client".into()),
            ..StoredConfig::default()
        };
        assert!(stored.authorization().is_none());
        assert!(stored.connection().is_none());

        stored.uaa_client_secret = Some("secret".into());
        stored.authorization_token = Some("jwt".into());
        assert_eq!(stored.authorization().map(|a| a.uaa_client_id), Some("client".into()));
        assert_eq!(stored.connection().map(|c| c.authorization_token), Some("jwt".into()));
    }

    #[test]
    fn sap_config_requires_url() {
        let mut config =
            ValidatedAuthConfig::for_method(AuthMethodPriority::SapDestination, AuthType::Jwt);
        config.destination = Some("TRIAL".into());
        assert!(SapConfig::try_from(&config).is_err());

        config.sap_url = Some("https://sap.example.com".into());
        let sap = SapConfig::try_from(&config).expect("url present");
        assert_eq!(sap.url, "https://sap.example.com");
        assert_eq!(sap.auth_type, AuthType::Jwt);
    }
}
