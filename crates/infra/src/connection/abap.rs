//! Connection to one ABAP system
//!
//! Composes the session manager, an optional token refresher and the HTTP
//! transport into `make_adt_request`. Retry on 401/403 is bounded: at most
//! one CSRF refresh (stateful sessions only) and at most one token refresh
//! (JWT connections only) per call. A CSRF fetch rejected with 401/403
//! counts as a rejection of the call and may use the token refresh. Network
//! failures skip both.

use std::sync::Arc;

use adtkit_core::auth::TokenRefresher;
use adtkit_core::connection::{AdtConnection, HttpTransport, SessionStorage, TransportRequest};
use adtkit_domain::constants::{ADT_DISCOVERY_PATH, SAP_CLIENT_PARAM};
use adtkit_domain::headers::{
    CSRF_FETCH, HEADER_ACCEPT, HEADER_ADT_SESSION_TYPE, HEADER_AUTHORIZATION, HEADER_COOKIE,
    HEADER_CSRF_TOKEN,
};
use adtkit_domain::{
    AdtError, AdtRequest, AdtResponse, AuthType, ClientSettings, HeaderBag, Result,
    SapConfig, SessionState, SessionType,
};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use parking_lot::RwLock;
use tracing::{debug, info, warn};
use url::Url;

use super::session::SessionManager;
use crate::http::ReqwestTransport;

/// CSRF work to do before the next attempt of a call.
#[derive(Debug, Default)]
enum CsrfStep {
    #[default]
    Keep,
    /// Fetch a token unless the session already holds one
    Ensure,
    /// Replace the token the server just rejected
    Refresh(Option<String>),
}

/// [`AdtConnection`] over HTTP.
pub struct AbapConnection {
    config: SapConfig,
    base_url: String,
    settings: ClientSettings,
    transport: Arc<dyn HttpTransport>,
    session: SessionManager,
    session_type: RwLock<SessionType>,
    token_refresher: Option<Arc<dyn TokenRefresher>>,
}

impl AbapConnection {
    pub fn builder(config: SapConfig) -> AbapConnectionBuilder {
        AbapConnectionBuilder::new(config)
    }

    pub fn config(&self) -> &SapConfig {
        &self.config
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn session_type(&self) -> SessionType {
        *self.session_type.read()
    }

    /// Drop cookies and CSRF token of the stateful session.
    pub async fn reset_session(&self) -> Result<()> {
        self.session.reset().await
    }

    fn uses_bearer(&self) -> bool {
        matches!(self.config.auth_type, AuthType::Jwt | AuthType::Xsuaa)
    }

    /// Refresher to force once per call after a 401/403, bearer auth only.
    fn bearer_refresher(&self) -> Option<&Arc<dyn TokenRefresher>> {
        self.token_refresher.as_ref().filter(|_| self.uses_bearer())
    }

    async fn prepare_csrf(
        &self,
        session: &SessionManager,
        step: CsrfStep,
        request: &AdtRequest,
    ) -> Result<()> {
        match step {
            CsrfStep::Keep => Ok(()),
            CsrfStep::Ensure => {
                session.ensure_csrf(|state| self.fetch_csrf(state, request)).await.map(drop)
            }
            CsrfStep::Refresh(stale) => session
                .refresh_csrf(stale.as_deref(), |fresh| self.fetch_csrf(fresh, request))
                .await
                .map(drop),
        }
    }

    async fn authorization(&self) -> Result<String> {
        match self.config.auth_type {
            AuthType::Basic => {
                let (Some(user), Some(password)) = (&self.config.username, &self.config.password)
                else {
                    return Err(AdtError::Config("basic auth requires username and password".into()));
                };
                Ok(format!("Basic {}", STANDARD.encode(format!("{user}:{password}"))))
            }
            AuthType::Jwt | AuthType::Xsuaa => {
                let token = match &self.token_refresher {
                    Some(refresher) => refresher.get_token().await?,
                    None => self.config.jwt_token.clone().ok_or_else(|| {
                        AdtError::Config("JWT auth requires a token or a token refresher".into())
                    })?,
                };
                Ok(format!("Bearer {token}"))
            }
        }
    }

    fn absolute_url(&self, url: &str, params: &[(String, String)]) -> Result<String> {
        let raw = if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}/{}", self.base_url, url.trim_start_matches('/'))
        };
        let mut parsed = Url::parse(&raw)
            .map_err(|e| AdtError::InvalidInput(format!("invalid request URL '{raw}': {e}")))?;

        let has_client = parsed.query_pairs().any(|(name, _)| name == SAP_CLIENT_PARAM)
            || params.iter().any(|(name, _)| name == SAP_CLIENT_PARAM);
        let client = self.config.client.as_deref().filter(|_| !has_client);

        if !params.is_empty() || client.is_some() {
            let mut query = parsed.query_pairs_mut();
            for (name, value) in params {
                query.append_pair(name, value);
            }
            if let Some(client) = client {
                query.append_pair(SAP_CLIENT_PARAM, client);
            }
        }
        Ok(parsed.into())
    }

    async fn assemble(
        &self,
        request: &AdtRequest,
        session: Option<&SessionState>,
        session_type: SessionType,
    ) -> Result<TransportRequest> {
        let mut headers = request.headers.clone();
        headers.insert(HEADER_AUTHORIZATION, self.authorization().await?);
        headers.insert(HEADER_ADT_SESSION_TYPE, session_type.as_str());
        if let Some(session) = session {
            if let Some(cookies) = session.cookies.as_deref().filter(|c| !c.is_empty()) {
                headers.insert(HEADER_COOKIE, cookies);
            }
            if request.method.is_mutating() {
                if let Some(token) = &session.csrf_token {
                    headers.insert(HEADER_CSRF_TOKEN, token.clone());
                }
            }
        }

        Ok(TransportRequest {
            method: request.method,
            url: self.absolute_url(&request.url, &request.params)?,
            headers,
            body: request.data.clone(),
            timeout: request.timeout,
        })
    }

    /// `GET /sap/bc/adt/discovery` with `x-csrf-token: fetch`.
    async fn fetch_csrf(&self, session: SessionState, request: &AdtRequest) -> Result<HeaderBag> {
        let fetch = AdtRequest::get(ADT_DISCOVERY_PATH)
            .timeout(request.timeout.max(self.settings.request_timeout()))
            .header(HEADER_CSRF_TOKEN, CSRF_FETCH)
            .header(HEADER_ACCEPT, "application/atomsvc+xml");

        debug!(base_url = %self.base_url, "fetching CSRF token");
        let outgoing = self.assemble(&fetch, Some(&session), self.session_type()).await?;
        let response = self.transport.send(outgoing).await?;
        if !response.is_success() {
            warn!(status = response.status, "CSRF fetch rejected");
            return Err(AdtError::Http {
                status: response.status,
                status_text: response.status_text,
                body: response.body,
            });
        }
        Ok(response.headers)
    }
}

#[async_trait]
impl AdtConnection for AbapConnection {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn session_id(&self) -> Option<String> {
        self.session.session_id().map(str::to_string)
    }

    fn set_session_type(&self, session_type: SessionType) {
        let previous = std::mem::replace(&mut *self.session_type.write(), session_type);
        if previous != session_type {
            info!(from = %previous, to = %session_type, "session type changed");
        }
    }

    async fn make_adt_request(&self, request: AdtRequest) -> Result<AdtResponse> {
        let session_type = self.session_type();
        let mutating = request.method.is_mutating();

        let throwaway;
        let session = match session_type {
            SessionType::Stateful => Some(&self.session),
            SessionType::Stateless if mutating => {
                throwaway = SessionManager::ephemeral();
                Some(&throwaway)
            }
            SessionType::Stateless => None,
        };

        let mut csrf = if mutating { CsrfStep::Ensure } else { CsrfStep::Keep };
        let mut csrf_refreshed = false;
        let mut token_refreshed = false;
        loop {
            if let Some(session) = session {
                let step = std::mem::take(&mut csrf);
                if let Err(err) = self.prepare_csrf(session, step, &request).await {
                    if err.is_auth_rejection() && !token_refreshed {
                        if let Some(refresher) = self.bearer_refresher() {
                            token_refreshed = true;
                            warn!(error = %err, "CSRF fetch rejected, refreshing token");
                            refresher.refresh_token().await?;
                            csrf = if mutating { CsrfStep::Ensure } else { CsrfStep::Keep };
                            continue;
                        }
                    }
                    return Err(err);
                }
            }

            let state = match session {
                Some(session) => Some(session.current().await?),
                None => None,
            };
            let outgoing = self.assemble(&request, state.as_ref(), session_type).await?;
            let url = outgoing.url.clone();
            let response = self.transport.send(outgoing).await?;
            if let Some(session) = session {
                session.absorb(&response.headers).await?;
            }

            if response.is_success() {
                return Ok(AdtResponse {
                    data: response.body,
                    status: response.status,
                    status_text: response.status_text,
                    headers: response.headers,
                    config: Some(request),
                    request: Some(url),
                });
            }

            if matches!(response.status, 401 | 403) {
                if !csrf_refreshed && session_type == SessionType::Stateful && session.is_some() {
                    csrf_refreshed = true;
                    warn!(status = response.status, %url, "request rejected, refreshing CSRF token");
                    csrf = CsrfStep::Refresh(state.and_then(|s| s.csrf_token));
                    continue;
                }
                if !token_refreshed {
                    if let Some(refresher) = self.bearer_refresher() {
                        token_refreshed = true;
                        warn!(status = response.status, %url, "request rejected, refreshing token");
                        refresher.refresh_token().await?;
                        if mutating {
                            csrf = CsrfStep::Ensure;
                        }
                        continue;
                    }
                }
            }

            debug!(status = response.status, %url, method = %request.method, "ADT request failed");
            return Err(AdtError::Http {
                status: response.status,
                status_text: response.status_text,
                body: response.body,
            });
        }
    }
}

/// Builder for [`AbapConnection`].
pub struct AbapConnectionBuilder {
    config: SapConfig,
    settings: ClientSettings,
    transport: Option<Arc<dyn HttpTransport>>,
    session_id: Option<String>,
    storage: Option<Arc<dyn SessionStorage>>,
    token_refresher: Option<Arc<dyn TokenRefresher>>,
}

impl AbapConnectionBuilder {
    fn new(config: SapConfig) -> Self {
        Self {
            config,
            settings: ClientSettings::default(),
            transport: None,
            session_id: None,
            storage: None,
            token_refresher: None,
        }
    }

    #[must_use]
    pub fn settings(mut self, settings: ClientSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Transport to use instead of the default reqwest one.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Persist the stateful session under `session_id`.
    #[must_use]
    pub fn session_storage(
        mut self,
        session_id: impl Into<String>,
        storage: Arc<dyn SessionStorage>,
    ) -> Self {
        self.session_id = Some(session_id.into());
        self.storage = Some(storage);
        self
    }

    #[must_use]
    pub fn token_refresher(mut self, refresher: Arc<dyn TokenRefresher>) -> Self {
        self.token_refresher = Some(refresher);
        self
    }

    /// Build the connection.
    ///
    /// An empty `SapConfig::url` or `client` falls back to `sap_url` or
    /// `sap_client` of the settings.
    pub fn build(mut self) -> Result<AbapConnection> {
        self.settings.validate()?;
        if self.config.url.trim().is_empty() {
            self.config.url = self.settings.sap_url.clone().ok_or_else(|| {
                AdtError::Config("no SAP URL in connection config or settings".into())
            })?;
        }
        if self.config.client.is_none() {
            self.config.client = self.settings.sap_client.clone();
        }
        let base_url = self.config.url.trim().trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| AdtError::Config(format!("invalid SAP URL '{base_url}': {e}")))?;
        if self.config.auth_type == AuthType::Basic
            && (self.config.username.is_none() || self.config.password.is_none())
        {
            return Err(AdtError::Config("basic auth requires username and password".into()));
        }

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(
                ReqwestTransport::builder().user_agent(&self.settings.user_agent).build()?,
            ),
        };
        let session = SessionManager::new(self.session_id, self.storage)
            .with_cookies(self.config.session_cookies.as_deref());

        Ok(AbapConnection {
            session_type: RwLock::new(self.settings.session_type),
            config: self.config,
            base_url,
            settings: self.settings,
            transport,
            session,
            token_refresher: self.token_refresher,
        })
    }
}
