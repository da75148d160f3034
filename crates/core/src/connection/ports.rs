//! Port interfaces for talking to the ADT service

use std::time::Duration;

use adtkit_domain::{
    AdtRequest, AdtResponse, HeaderBag, HttpMethod, Result, SessionState, SessionType,
};
use async_trait::async_trait;

/// Authenticated, session-aware channel to one ABAP system.
///
/// The object orchestrator's only I/O dependency.
#[async_trait]
pub trait AdtConnection: Send + Sync {
    /// Base URL of the ABAP system, without trailing slash.
    fn base_url(&self) -> &str;

    /// Id under which session state is persisted, if any.
    fn session_id(&self) -> Option<String>;

    /// Switch between stateful and stateless session handling.
    fn set_session_type(&self, session_type: SessionType);

    /// Send one ADT request.
    ///
    /// Non-2xx final responses are returned as `AdtError::Http`; transport
    /// failures as `AdtError::Network` or `AdtError::Transport`.
    async fn make_adt_request(&self, request: AdtRequest) -> Result<AdtResponse>;
}

/// A fully assembled HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub method: HttpMethod,
    /// Absolute URL, query string included
    pub url: String,
    pub headers: HeaderBag,
    pub body: Option<String>,
    pub timeout: Duration,
}

/// Raw HTTP response as seen by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: HeaderBag,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One HTTP round trip.
///
/// Any received response is `Ok`, whatever its status. Connection-level
/// failures are `Err`, classified as `AdtError::Network` when they match a
/// registered network code.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse>;
}

/// Persistence of per-session cookies and CSRF token.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn save(&self, session_id: &str, state: &SessionState) -> Result<()>;

    async fn load(&self, session_id: &str) -> Result<Option<SessionState>>;

    async fn delete(&self, session_id: &str) -> Result<()>;
}
