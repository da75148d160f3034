//! Port interfaces for tokens and credential storage

use adtkit_domain::{
    AuthorizationConfig, ConnectionConfig, Result, StoredConfig, TokenProviderOptions,
    TokenProviderResult, TokenResult,
};
use async_trait::async_trait;

/// Bearer token source injected into JWT connections.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Current token; cached while still valid.
    async fn get_token(&self) -> Result<String>;

    /// Obtain a new token regardless of the cached one and persist it.
    ///
    /// Used after the server rejected the token from `get_token`.
    async fn refresh_token(&self) -> Result<String>;
}

/// Stateful token provider that manages login and refresh itself.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn get_tokens(&self) -> Result<TokenResult>;

    /// Whether `token` is still accepted, optionally probing `service_url`.
    async fn validate_token(&self, token: &str, service_url: Option<&str>) -> Result<bool>;
}

/// Stateless provider shape kept for older integrations.
///
/// Wrap it in `LegacyTokenProviderAdapter` to use it as a [`TokenProvider`].
#[async_trait]
pub trait LegacyTokenProvider: Send + Sync {
    async fn get_connection_config(
        &self,
        auth: &AuthorizationConfig,
        options: &TokenProviderOptions,
    ) -> Result<TokenProviderResult>;

    /// New token from the refresh token carried in `auth`.
    async fn refresh_token_from_session(
        &self,
        auth: &AuthorizationConfig,
        options: &TokenProviderOptions,
    ) -> Result<TokenProviderResult>;

    /// New token from the UAA credentials of a service key.
    async fn refresh_token_from_service_key(
        &self,
        auth: &AuthorizationConfig,
        options: &TokenProviderOptions,
    ) -> Result<TokenProviderResult>;

    /// Providers that cannot validate trust the token until the server
    /// rejects it.
    async fn validate_token(&self, _token: &str, _service_url: Option<&str>) -> Result<bool> {
        Ok(true)
    }
}

/// Per-destination session data (tokens and connection values).
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load_session(&self, destination: &str) -> Result<Option<StoredConfig>>;

    async fn save_session(&self, destination: &str, config: &StoredConfig) -> Result<()>;

    async fn delete_session(&self, _destination: &str) -> Result<()> {
        Ok(())
    }

    async fn authorization_config(&self, destination: &str) -> Result<Option<AuthorizationConfig>>;

    async fn connection_config(&self, destination: &str) -> Result<Option<ConnectionConfig>>;

    async fn set_authorization_config(
        &self,
        destination: &str,
        config: &AuthorizationConfig,
    ) -> Result<()>;

    async fn set_connection_config(&self, destination: &str, config: &ConnectionConfig)
        -> Result<()>;
}

/// Read-only access to service keys (UAA credentials and service URLs).
#[async_trait]
pub trait ServiceKeyStore: Send + Sync {
    async fn service_key(&self, destination: &str) -> Result<Option<StoredConfig>>;

    async fn authorization_config(&self, destination: &str) -> Result<Option<AuthorizationConfig>>;

    async fn connection_config(&self, destination: &str) -> Result<Option<ConnectionConfig>>;
}
