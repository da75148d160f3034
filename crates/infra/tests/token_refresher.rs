//! Integration tests for `CachedTokenRefresher`

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use adtkit_common::testing::{unsigned_jwt, unsigned_jwt_without_exp, MockClock};
use adtkit_core::auth::{SessionStore, TokenProvider, TokenRefresher};
use adtkit_domain::{
    AdtError, ClientSettings, GrantType, Result, StoredConfig, TokenFormat, TokenProviderErrorCode,
    TokenResult,
};
use adtkit_infra::{CachedTokenRefresher, InMemorySessionStore};
use async_trait::async_trait;

const NOW: i64 = 1_700_000_000;
const NOW_SECS: u64 = 1_700_000_000;

/// Provider issuing `token-<n>` JWTs valid for an hour.
struct SequenceProvider {
    calls: AtomicUsize,
    delay: Duration,
    valid: AtomicBool,
    fail: AtomicBool,
}

impl SequenceProvider {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
            valid: AtomicBool::new(true),
            fail: AtomicBool::new(false),
        }
    }

    fn slow(delay: Duration) -> Self {
        Self { delay, ..Self::new() }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenProvider for SequenceProvider {
    async fn get_tokens(&self) -> Result<TokenResult> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(AdtError::token(
                TokenProviderErrorCode::Refresh,
                "identity provider unavailable",
            ));
        }
        Ok(TokenResult::new(unsigned_jwt(&format!("user-{n}"), NOW + 3600), GrantType::Password)
            .with_refresh_token(format!("refresh-{n}")))
    }

    async fn validate_token(&self, _token: &str, _service_url: Option<&str>) -> Result<bool> {
        Ok(self.valid.load(Ordering::SeqCst))
    }
}

fn refresher(provider: Arc<SequenceProvider>) -> CachedTokenRefresher {
    CachedTokenRefresher::new(provider, "TRIAL")
        .with_clock(Arc::new(MockClock::at_epoch_secs(NOW_SECS)))
}

#[tokio::test]
async fn get_token_caches_until_deadline() {
    let provider = Arc::new(SequenceProvider::new());
    let refresher = refresher(provider.clone());

    let first = refresher.get_token().await.expect("first token");
    let second = refresher.get_token().await.expect("cached token");

    assert_eq!(first, second);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn refresh_token_always_asks_the_provider() {
    let provider = Arc::new(SequenceProvider::new());
    let refresher = refresher(provider.clone());

    let cached = refresher.get_token().await.expect("first token");
    let refreshed = refresher.refresh_token().await.expect("refreshed token");

    assert_ne!(cached, refreshed);
    assert_eq!(provider.calls(), 2);
    assert_eq!(refresher.get_token().await.expect("new cached token"), refreshed);
}

#[tokio::test]
async fn concurrent_refreshes_share_one_provider_call() {
    let provider = Arc::new(SequenceProvider::slow(Duration::from_millis(50)));
    let refresher = refresher(provider.clone());

    let (a, b) = tokio::join!(refresher.refresh_token(), refresher.refresh_token());

    assert_eq!(a.expect("first caller"), b.expect("second caller"));
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn refreshed_tokens_are_persisted_for_the_destination() {
    let provider = Arc::new(SequenceProvider::new());
    let store = Arc::new(InMemorySessionStore::new());
    store
        .save_session(
            "TRIAL",
            &StoredConfig { sap_client: Some("100".into()), ..StoredConfig::default() },
        )
        .await
        .expect("seed");

    let refresher = refresher(provider)
        .with_session_store(store.clone())
        .with_service_url("https://trial.example.com");
    let token = refresher.get_token().await.expect("token");

    let stored = store.load_session("TRIAL").await.expect("load").expect("saved");
    assert_eq!(stored.authorization_token.as_deref(), Some(token.as_str()));
    assert_eq!(stored.refresh_token.as_deref(), Some("refresh-1"));
    assert_eq!(stored.service_url.as_deref(), Some("https://trial.example.com"));
    assert_eq!(stored.sap_client.as_deref(), Some("100"));
}

#[tokio::test]
async fn tokens_without_expiry_are_validated_on_use() {
    let provider = Arc::new(SequenceProvider::new());
    let refresher = refresher(provider.clone());
    refresher
        .prime(TokenResult::new(unsigned_jwt_without_exp("seed"), GrantType::Password))
        .await;

    refresher.get_token().await.expect("validated seed");
    assert_eq!(provider.calls(), 0);

    provider.valid.store(false, Ordering::SeqCst);
    let replaced = refresher.get_token().await.expect("replaced token");
    assert_eq!(provider.calls(), 1);
    assert_ne!(replaced, unsigned_jwt_without_exp("seed"));
}

#[tokio::test]
async fn opaque_tokens_use_expires_in() {
    let clock = MockClock::at_epoch_secs(NOW_SECS);
    let provider = Arc::new(SequenceProvider::new());
    let refresher = CachedTokenRefresher::new(provider.clone(), "TRIAL")
        .with_clock(Arc::new(clock.clone()))
        .with_skew(Duration::from_secs(5));
    refresher
        .prime(
            TokenResult::new("opaque", GrantType::ClientCredentials)
                .with_token_type(TokenFormat::Opaque)
                .with_expires_in(60),
        )
        .await;

    clock.advance(Duration::from_secs(54));
    assert_eq!(refresher.get_token().await.expect("still cached"), "opaque");

    clock.advance(Duration::from_secs(2));
    assert_ne!(refresher.get_token().await.expect("refreshed"), "opaque");
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn settings_skew_moves_the_refresh_deadline() {
    let clock = MockClock::at_epoch_secs(NOW_SECS);
    let provider = Arc::new(SequenceProvider::new());
    let settings = ClientSettings { token_skew_secs: 20, ..ClientSettings::default() };
    let refresher = CachedTokenRefresher::new(provider.clone(), "TRIAL")
        .with_clock(Arc::new(clock.clone()))
        .with_settings(&settings);
    refresher
        .prime(
            TokenResult::new("opaque", GrantType::ClientCredentials)
                .with_token_type(TokenFormat::Opaque)
                .with_expires_in(60),
        )
        .await;

    clock.advance(Duration::from_secs(39));
    assert_eq!(refresher.get_token().await.expect("still cached"), "opaque");

    clock.advance(Duration::from_secs(2));
    assert_ne!(refresher.get_token().await.expect("refreshed"), "opaque");
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn provider_failure_keeps_code_and_cache() {
    let provider = Arc::new(SequenceProvider::new());
    let refresher = refresher(provider.clone());
    let token = refresher.get_token().await.expect("token");

    provider.fail.store(true, Ordering::SeqCst);
    let err = refresher.refresh_token().await.expect_err("provider down");
    assert_eq!(err.code(), "REFRESH_ERROR");

    assert_eq!(refresher.get_token().await.expect("cached token survives"), token);
}
