//! Token provider results and options

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::auth::ConnectionConfig;
use crate::errors::{AdtError, TokenProviderErrorCode};

/// OAuth2 grant type used to obtain a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    AuthorizationCode,
    AuthorizationCodePkce,
    Implicit,
    Password,
    ClientCredentials,
}

impl GrantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::AuthorizationCodePkce => "authorization_code_pkce",
            Self::Implicit => "implicit",
            Self::Password => "password",
            Self::ClientCredentials => "client_credentials",
        }
    }
}

impl fmt::Display for GrantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token format; consumers pick a validation strategy from it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenFormat {
    #[default]
    Jwt,
    Saml,
    Opaque,
}

/// Result of `TokenProvider::get_tokens`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResult {
    pub authorization_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub auth_type: GrantType,
    /// Lifetime in seconds from the moment the token was issued
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    /// Absolute expiry, milliseconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<TokenFormat>,
}

impl TokenResult {
    pub fn new(authorization_token: impl Into<String>, auth_type: GrantType) -> Self {
        Self {
            authorization_token: authorization_token.into(),
            refresh_token: None,
            auth_type,
            expires_in: None,
            expires_at: None,
            token_type: None,
        }
    }

    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    #[must_use]
    pub fn with_expires_in(mut self, seconds: u64) -> Self {
        self.expires_in = Some(seconds);
        self
    }

    #[must_use]
    pub fn with_expires_at(mut self, epoch_millis: i64) -> Self {
        self.expires_at = Some(epoch_millis);
        self
    }

    #[must_use]
    pub fn with_token_type(mut self, token_type: TokenFormat) -> Self {
        self.token_type = Some(token_type);
        self
    }

    /// Format of the token, defaulting to JWT.
    pub fn format(&self) -> TokenFormat {
        self.token_type.unwrap_or_default()
    }
}

/// Result of the legacy stateless provider methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenProviderResult {
    pub connection_config: ConnectionConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// How a provider may involve a browser during authentication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserMode {
    /// System default browser
    #[default]
    System,
    Chrome,
    Edge,
    Firefox,
    /// Print the URL and wait for a manual callback
    Headless,
    /// Never open a browser; fail immediately
    None,
}

impl FromStr for BrowserMode {
    type Err = AdtError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "system" => Ok(Self::System),
            "chrome" => Ok(Self::Chrome),
            "edge" => Ok(Self::Edge),
            "firefox" => Ok(Self::Firefox),
            "headless" => Ok(Self::Headless),
            "none" => Ok(Self::None),
            other => Err(AdtError::token(
                TokenProviderErrorCode::Validation,
                format!("unsupported browser '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenProviderOptions {
    #[serde(default)]
    pub browser: BrowserMode,
}
