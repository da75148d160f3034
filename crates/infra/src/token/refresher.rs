//! Cached bearer token with single-flight refresh

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use adtkit_common::jwt;
use adtkit_common::time::{Clock, SystemClock};
use adtkit_core::auth::{SessionStore, TokenProvider, TokenRefresher};
use adtkit_domain::constants::DEFAULT_TOKEN_SKEW_SECS;
use adtkit_domain::{
    AdtError, ClientSettings, Result, TokenFormat, TokenProviderErrorCode, TokenResult,
};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    /// Skew already applied; `None` when the expiry is unknown
    refresh_after: Option<DateTime<Utc>>,
}

/// [`TokenRefresher`] over a [`TokenProvider`].
///
/// Refreshed tokens are written to the session store under `destination`.
/// Tokens without a derivable expiry are checked with
/// `TokenProvider::validate_token` on every `get_token`.
pub struct CachedTokenRefresher {
    provider: Arc<dyn TokenProvider>,
    session_store: Option<Arc<dyn SessionStore>>,
    destination: String,
    service_url: Option<String>,
    clock: Arc<dyn Clock>,
    skew: Duration,
    cached: Mutex<Option<CachedToken>>,
    generation: AtomicU64,
}

impl CachedTokenRefresher {
    pub fn new(provider: Arc<dyn TokenProvider>, destination: impl Into<String>) -> Self {
        Self {
            provider,
            session_store: None,
            destination: destination.into(),
            service_url: None,
            clock: Arc::new(SystemClock),
            skew: Duration::from_secs(DEFAULT_TOKEN_SKEW_SECS),
            cached: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn with_session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.session_store = Some(store);
        self
    }

    /// Service URL stored alongside refreshed tokens and passed to
    /// `validate_token`.
    #[must_use]
    pub fn with_service_url(mut self, url: impl Into<String>) -> Self {
        self.service_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_skew(mut self, skew: Duration) -> Self {
        self.skew = skew;
        self
    }

    /// Expiry skew from loaded client settings.
    #[must_use]
    pub fn with_settings(self, settings: &ClientSettings) -> Self {
        self.with_skew(settings.token_skew())
    }

    /// Seed the cache, e.g. with a token restored from a session store.
    pub async fn prime(&self, token: TokenResult) {
        let entry = self.entry_for(&token);
        *self.cached.lock().await = Some(entry);
    }

    fn entry_for(&self, token: &TokenResult) -> CachedToken {
        let now = self.clock.now_utc();
        let expires_at = token
            .expires_at
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
            .or_else(|| {
                token
                    .expires_in
                    .and_then(|secs| i64::try_from(secs).ok())
                    .map(|secs| now + chrono::Duration::seconds(secs))
            })
            .or_else(|| match token.format() {
                TokenFormat::Jwt => jwt::expires_at(&token.authorization_token),
                TokenFormat::Saml | TokenFormat::Opaque => None,
            });

        let skew =
            chrono::Duration::from_std(self.skew).unwrap_or_else(|_| chrono::Duration::zero());
        CachedToken {
            token: token.authorization_token.clone(),
            refresh_after: expires_at.map(|at| at - skew),
        }
    }

    /// Fetch, cache and persist a new token. Caller holds the cache lock.
    async fn refresh_locked(&self, cached: &mut Option<CachedToken>) -> Result<String> {
        let result = self.provider.get_tokens().await.map_err(|err| {
            warn!(destination = %self.destination, error = %err, "token refresh failed");
            err
        })?;
        if result.authorization_token.trim().is_empty() {
            return Err(AdtError::token(
                TokenProviderErrorCode::Refresh,
                "provider returned an empty token",
            ));
        }

        let entry = self.entry_for(&result);
        self.persist(&result).await?;
        info!(
            destination = %self.destination,
            refresh_after = ?entry.refresh_after,
            "token refreshed"
        );

        let token = entry.token.clone();
        *cached = Some(entry);
        self.generation.fetch_add(1, Ordering::SeqCst);
        Ok(token)
    }

    async fn persist(&self, result: &TokenResult) -> Result<()> {
        let Some(store) = &self.session_store else {
            return Ok(());
        };
        let mut stored = store.load_session(&self.destination).await?.unwrap_or_default();
        stored.authorization_token = Some(result.authorization_token.clone());
        if let Some(url) = &self.service_url {
            stored.service_url = Some(url.clone());
        }
        if let Some(refresh_token) = &result.refresh_token {
            stored.refresh_token = Some(refresh_token.clone());
        }
        store.save_session(&self.destination, &stored).await
    }
}

#[async_trait]
impl TokenRefresher for CachedTokenRefresher {
    async fn get_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;

        if let Some(entry) = cached.as_ref() {
            match entry.refresh_after {
                Some(deadline) if self.clock.now_utc() < deadline => return Ok(entry.token.clone()),
                Some(_) => debug!(destination = %self.destination, "cached token expired"),
                None => {
                    let still_valid = self
                        .provider
                        .validate_token(&entry.token, self.service_url.as_deref())
                        .await?;
                    if still_valid {
                        return Ok(entry.token.clone());
                    }
                    debug!(destination = %self.destination, "provider rejected cached token");
                }
            }
        }

        self.refresh_locked(&mut cached).await
    }

    async fn refresh_token(&self) -> Result<String> {
        let seen = self.generation.load(Ordering::SeqCst);
        let mut cached = self.cached.lock().await;

        if self.generation.load(Ordering::SeqCst) != seen {
            if let Some(entry) = cached.as_ref() {
                debug!(destination = %self.destination, "reusing token refreshed by another caller");
                return Ok(entry.token.clone());
            }
        }

        self.refresh_locked(&mut cached).await
    }
}
