//! Adapter from the stateless legacy provider shape to [`TokenProvider`]

use std::sync::Arc;

use adtkit_core::auth::{LegacyTokenProvider, ServiceKeyStore, SessionStore, TokenProvider};
use adtkit_domain::{
    AdtError, GrantType, Result, TokenProviderErrorCode, TokenProviderOptions, TokenProviderResult,
    TokenResult,
};
use async_trait::async_trait;
use tracing::{debug, warn};

/// Wraps a [`LegacyTokenProvider`] for one destination.
///
/// `get_tokens` tries the refresh token held in the session store first and
/// falls back to the UAA credentials of the service key.
pub struct LegacyTokenProviderAdapter {
    provider: Arc<dyn LegacyTokenProvider>,
    session_store: Arc<dyn SessionStore>,
    service_keys: Arc<dyn ServiceKeyStore>,
    destination: String,
    options: TokenProviderOptions,
}

impl LegacyTokenProviderAdapter {
    pub fn new(
        provider: Arc<dyn LegacyTokenProvider>,
        session_store: Arc<dyn SessionStore>,
        service_keys: Arc<dyn ServiceKeyStore>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            session_store,
            service_keys,
            destination: destination.into(),
            options: TokenProviderOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: TokenProviderOptions) -> Self {
        self.options = options;
        self
    }

    async fn from_session(&self) -> Result<Option<TokenProviderResult>> {
        let Some(auth) = self.session_store.authorization_config(&self.destination).await? else {
            return Ok(None);
        };
        if auth.refresh_token.is_none() {
            return Ok(None);
        }

        match self.provider.refresh_token_from_session(&auth, &self.options).await {
            Ok(result) => Ok(Some(result)),
            Err(err) => {
                warn!(destination = %self.destination, error = %err, "session refresh failed, trying service key");
                Ok(None)
            }
        }
    }

    async fn from_service_key(&self) -> Result<TokenProviderResult> {
        let auth = self.service_keys.authorization_config(&self.destination).await?.ok_or_else(|| {
            AdtError::token(
                TokenProviderErrorCode::ServiceKey,
                format!("no refresh token or service key for destination '{}'", self.destination),
            )
        })?;
        self.provider.refresh_token_from_service_key(&auth, &self.options).await
    }
}

fn to_token_result(result: TokenProviderResult, grant: GrantType) -> TokenResult {
    let token = TokenResult::new(result.connection_config.authorization_token, grant);
    match result.refresh_token {
        Some(refresh_token) => token.with_refresh_token(refresh_token),
        None => token,
    }
}

#[async_trait]
impl TokenProvider for LegacyTokenProviderAdapter {
    async fn get_tokens(&self) -> Result<TokenResult> {
        if let Some(result) = self.from_session().await? {
            debug!(destination = %self.destination, "token obtained from session refresh token");
            return Ok(to_token_result(result, GrantType::AuthorizationCode));
        }

        let result = self.from_service_key().await?;
        debug!(destination = %self.destination, "token obtained from service key");
        Ok(to_token_result(result, GrantType::ClientCredentials))
    }

    async fn validate_token(&self, token: &str, service_url: Option<&str>) -> Result<bool> {
        self.provider.validate_token(token, service_url).await
    }
}
