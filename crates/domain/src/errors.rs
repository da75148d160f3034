//! Error types and stable error codes used throughout the client
//!
//! Callers branch on the `code()` strings (or the code enums) rather than on
//! message text. The string values are part of the public contract.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes surfaced by object lifecycle operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdtObjectErrorCode {
    /// Object not found (404)
    ObjectNotFound,
    /// Object exists but is not available for reading yet (400)
    ObjectNotReady,
    ValidationFailed,
    CreateFailed,
    UpdateFailed,
    DeleteFailed,
    ActivateFailed,
    CheckFailed,
    LockFailed,
    UnlockFailed,
    /// Read failed for a reason other than not-found or not-ready
    ReadFailed,
}

impl AdtObjectErrorCode {
    /// Stable string form of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ObjectNotFound => "ADT_OBJECT_NOT_FOUND",
            Self::ObjectNotReady => "ADT_OBJECT_NOT_READY",
            Self::ValidationFailed => "ADT_VALIDATION_FAILED",
            Self::CreateFailed => "ADT_CREATE_FAILED",
            Self::UpdateFailed => "ADT_UPDATE_FAILED",
            Self::DeleteFailed => "ADT_DELETE_FAILED",
            Self::ActivateFailed => "ADT_ACTIVATE_FAILED",
            Self::CheckFailed => "ADT_CHECK_FAILED",
            Self::LockFailed => "ADT_LOCK_FAILED",
            Self::UnlockFailed => "ADT_UNLOCK_FAILED",
            Self::ReadFailed => "ADT_READ_FAILED",
        }
    }
}

impl fmt::Display for AdtObjectErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error codes raised by token providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenProviderErrorCode {
    /// Authentication configuration validation failed
    Validation,
    /// Token refresh operation failed
    Refresh,
    /// Session data is invalid or incomplete
    SessionData,
    /// Service key data is invalid or incomplete
    ServiceKey,
    /// Browser authentication failed or was cancelled
    BrowserAuth,
}

impl TokenProviderErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::Refresh => "REFRESH_ERROR",
            Self::SessionData => "SESSION_DATA_ERROR",
            Self::ServiceKey => "SERVICE_KEY_ERROR",
            Self::BrowserAuth => "BROWSER_AUTH_ERROR",
        }
    }
}

impl fmt::Display for TokenProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error codes raised by session, service-key and session-state stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoreErrorCode {
    FileNotFound,
    ParseError,
    InvalidConfig,
    StorageError,
}

impl StoreErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FileNotFound => "FILE_NOT_FOUND",
            Self::ParseError => "PARSE_ERROR",
            Self::InvalidConfig => "INVALID_CONFIG",
            Self::StorageError => "STORAGE_ERROR",
        }
    }
}

impl fmt::Display for StoreErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Infrastructure-level connection failures.
///
/// Errors carrying one of these codes never enter the CSRF or token retry
/// path of the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkErrorCode {
    /// Server not accepting connections
    #[serde(rename = "ECONNREFUSED")]
    ConnectionRefused,
    /// Server not responding
    #[serde(rename = "ETIMEDOUT")]
    TimedOut,
    /// Hostname could not be resolved
    #[serde(rename = "ENOTFOUND")]
    DnsNotFound,
    /// Connection reset by peer
    #[serde(rename = "ECONNRESET")]
    ConnectionReset,
    #[serde(rename = "ENETUNREACH")]
    NetworkUnreachable,
    #[serde(rename = "EHOSTUNREACH")]
    HostUnreachable,
}

impl NetworkErrorCode {
    /// Every registered code, in registry order.
    pub const ALL: [Self; 6] = [
        Self::ConnectionRefused,
        Self::TimedOut,
        Self::DnsNotFound,
        Self::ConnectionReset,
        Self::NetworkUnreachable,
        Self::HostUnreachable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConnectionRefused => "ECONNREFUSED",
            Self::TimedOut => "ETIMEDOUT",
            Self::DnsNotFound => "ENOTFOUND",
            Self::ConnectionReset => "ECONNRESET",
            Self::NetworkUnreachable => "ENETUNREACH",
            Self::HostUnreachable => "EHOSTUNREACH",
        }
    }

    /// Look up a code by its exact registry name.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == code)
    }

    /// Find a registry name embedded in a wrapped error message.
    pub fn find_in_message(message: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| message.contains(c.as_str()))
    }
}

impl fmt::Display for NetworkErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for adtkit
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum AdtError {
    #[error("Network error ({code}): {message}")]
    Network { code: NetworkErrorCode, message: String },

    /// Transport failure that matched no registered network code
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP {status} {status_text}")]
    Http { status: u16, status_text: String, body: String },

    #[error("Token provider error ({code}): {message}")]
    TokenProvider { code: TokenProviderErrorCode, message: String },

    #[error("Store error ({code}): {message}")]
    Store { code: StoreErrorCode, message: String },

    /// Object-level failure reported inside an otherwise successful response
    #[error("{code}: {message}")]
    Object { code: AdtObjectErrorCode, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AdtError {
    pub fn network(code: NetworkErrorCode, message: impl Into<String>) -> Self {
        Self::Network { code, message: message.into() }
    }

    pub fn token(code: TokenProviderErrorCode, message: impl Into<String>) -> Self {
        Self::TokenProvider { code, message: message.into() }
    }

    pub fn store(code: StoreErrorCode, message: impl Into<String>) -> Self {
        Self::Store { code, message: message.into() }
    }

    pub fn object(code: AdtObjectErrorCode, message: impl Into<String>) -> Self {
        Self::Object { code, message: message.into() }
    }

    /// Stable code string for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Network { code, .. } => code.as_str(),
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Http { .. } => "HTTP_ERROR",
            Self::TokenProvider { code, .. } => code.as_str(),
            Self::Store { code, .. } => code.as_str(),
            Self::Object { code, .. } => code.as_str(),
            Self::Config(_) => "CONFIG_ERROR",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status of the final response, if the failure came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// 401 or 403 from the remote service.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}

/// Result type alias for adtkit operations
pub type Result<T> = std::result::Result<T, AdtError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_codes_are_stable_strings() {
        assert_eq!(AdtObjectErrorCode::ObjectNotFound.as_str(), "ADT_OBJECT_NOT_FOUND");
        assert_eq!(AdtObjectErrorCode::CheckFailed.to_string(), "ADT_CHECK_FAILED");
        assert_eq!(AdtObjectErrorCode::UnlockFailed.as_str(), "ADT_UNLOCK_FAILED");
    }

    #[test]
    fn network_registry_round_trips_codes() {
        for code in NetworkErrorCode::ALL {
            assert_eq!(NetworkErrorCode::from_code(code.as_str()), Some(code));
        }
        assert_eq!(NetworkErrorCode::from_code("EPIPE"), None);
    }

    #[test]
    fn network_code_found_inside_wrapped_message() {
        let found = NetworkErrorCode::find_in_message("connect ECONNREFUSED 10.0.0.1:443");
        assert_eq!(found, Some(NetworkErrorCode::ConnectionRefused));
        assert_eq!(NetworkErrorCode::find_in_message("socket hang up"), None);
    }

    #[test]
    fn error_code_delegates_to_inner_code() {
        let err = AdtError::token(TokenProviderErrorCode::Refresh, "uaa down");
        assert_eq!(err.code(), "REFRESH_ERROR");

        let err = AdtError::store(StoreErrorCode::ParseError, "bad json");
        assert_eq!(err.code(), "PARSE_ERROR");

        let err = AdtError::network(NetworkErrorCode::DnsNotFound, "no such host");
        assert_eq!(err.code(), "ENOTFOUND");
        assert!(err.is_network());
    }

    #[test]
    fn auth_rejection_covers_401_and_403_only() {
        let http = |status| AdtError::Http { status, status_text: String::new(), body: String::new() };
        assert!(http(401).is_auth_rejection());
        assert!(http(403).is_auth_rejection());
        assert!(!http(404).is_auth_rejection());
        assert!(!AdtError::Transport("x".into()).is_auth_rejection());
    }
}
