//! Cookies and CSRF token of one logical session

use std::future::Future;
use std::sync::Arc;

use adtkit_core::connection::SessionStorage;
use adtkit_domain::headers::{HEADER_CSRF_TOKEN, HEADER_SET_COOKIE};
use adtkit_domain::{AdtError, HeaderBag, Result, SessionState};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Values the server sends in `x-csrf-token` that are not tokens.
const CSRF_NON_TOKENS: [&str; 2] = ["required", "fetch"];

#[derive(Debug, Default)]
struct Slot {
    loaded: bool,
    state: SessionState,
}

/// Session state guarded by an async mutex.
///
/// CSRF fetches run while the lock is held, so concurrent callers that need
/// a token wait for the one fetch in flight and then reuse its result.
pub struct SessionManager {
    session_id: Option<String>,
    storage: Option<Arc<dyn SessionStorage>>,
    slot: Mutex<Slot>,
}

impl SessionManager {
    /// Session persisted under `session_id`, when both are given.
    pub fn new(session_id: Option<String>, storage: Option<Arc<dyn SessionStorage>>) -> Self {
        Self { session_id, storage, slot: Mutex::new(Slot::default()) }
    }

    /// Throwaway session: starts empty, never persisted.
    pub fn ephemeral() -> Self {
        Self::new(None, None)
    }

    /// Session seeded with a raw `Cookie` header, e.g. from a SAML login.
    #[must_use]
    pub fn with_cookies(mut self, cookies: Option<&str>) -> Self {
        if let Some(cookies) = cookies.filter(|c| !c.trim().is_empty()) {
            self.slot.get_mut().state.absorb_set_cookies(cookies.split(';').map(str::trim));
        }
        self
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Current state, loaded from storage on first use.
    pub async fn current(&self) -> Result<SessionState> {
        let mut slot = self.slot.lock().await;
        self.load_into(&mut slot).await?;
        Ok(slot.state.clone())
    }

    /// Make sure a CSRF token is present, fetching one if not.
    pub async fn ensure_csrf<F, Fut>(&self, fetch: F) -> Result<SessionState>
    where
        F: FnOnce(SessionState) -> Fut,
        Fut: Future<Output = Result<HeaderBag>>,
    {
        let mut slot = self.slot.lock().await;
        self.load_into(&mut slot).await?;
        if slot.state.csrf_token.is_some() {
            return Ok(slot.state.clone());
        }
        self.fetch_into(&mut slot, fetch).await
    }

    /// Replace a token the server rejected.
    ///
    /// When another caller already replaced `stale` while this one waited
    /// for the lock, the newer token is reused and no fetch happens.
    pub async fn refresh_csrf<F, Fut>(&self, stale: Option<&str>, fetch: F) -> Result<SessionState>
    where
        F: FnOnce(SessionState) -> Fut,
        Fut: Future<Output = Result<HeaderBag>>,
    {
        let mut slot = self.slot.lock().await;
        self.load_into(&mut slot).await?;
        if slot.state.csrf_token.is_some() && slot.state.csrf_token.as_deref() != stale {
            debug!(session = ?self.session_id, "CSRF token already refreshed");
            return Ok(slot.state.clone());
        }
        slot.state.clear_csrf();
        self.fetch_into(&mut slot, fetch).await
    }

    /// Merge cookies and any CSRF token from a response.
    pub async fn absorb(&self, headers: &HeaderBag) -> Result<()> {
        let mut slot = self.slot.lock().await;
        self.load_into(&mut slot).await?;
        if absorb_headers(&mut slot.state, headers) {
            self.persist(&slot.state).await?;
        }
        Ok(())
    }

    /// Forget cookies and token, in memory and in storage.
    pub async fn reset(&self) -> Result<()> {
        let mut slot = self.slot.lock().await;
        slot.state = SessionState::default();
        slot.loaded = true;
        if let (Some(id), Some(storage)) = (&self.session_id, &self.storage) {
            storage.delete(id).await?;
        }
        Ok(())
    }

    async fn fetch_into<F, Fut>(&self, slot: &mut Slot, fetch: F) -> Result<SessionState>
    where
        F: FnOnce(SessionState) -> Fut,
        Fut: Future<Output = Result<HeaderBag>>,
    {
        let headers = fetch(slot.state.clone()).await?;
        absorb_headers(&mut slot.state, &headers);
        if slot.state.csrf_token.is_none() {
            warn!(session = ?self.session_id, "CSRF fetch returned no token");
            return Err(AdtError::Internal("CSRF fetch response carried no token".into()));
        }
        info!(session = ?self.session_id, "fetched CSRF token");
        self.persist(&slot.state).await?;
        Ok(slot.state.clone())
    }

    async fn load_into(&self, slot: &mut Slot) -> Result<()> {
        if slot.loaded {
            return Ok(());
        }
        if let (Some(id), Some(storage)) = (&self.session_id, &self.storage) {
            if let Some(stored) = storage.load(id).await? {
                debug!(session = %id, "restored session state");
                let seeded = std::mem::replace(&mut slot.state, stored);
                slot.state.cookie_store.extend(seeded.cookie_store);
                if !slot.state.cookie_store.is_empty() {
                    slot.state.cookies = Some(slot.state.cookie_header());
                }
            }
        }
        slot.loaded = true;
        Ok(())
    }

    async fn persist(&self, state: &SessionState) -> Result<()> {
        if let (Some(id), Some(storage)) = (&self.session_id, &self.storage) {
            storage.save(id, state).await?;
        }
        Ok(())
    }
}

/// Returns whether anything changed.
fn absorb_headers(state: &mut SessionState, headers: &HeaderBag) -> bool {
    let before = state.clone();
    let set_cookies = headers.get_all(HEADER_SET_COOKIE);
    if !set_cookies.is_empty() {
        state.absorb_set_cookies(set_cookies.iter().map(String::as_str));
    }
    if let Some(token) = headers.get_non_empty(HEADER_CSRF_TOKEN) {
        if !CSRF_NON_TOKENS.contains(&token.to_ascii_lowercase().as_str()) {
            state.csrf_token = Some(token.to_string());
        }
    }
    *state != before
}
