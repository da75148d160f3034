#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use adtkit_core::connection::AdtConnection;
use adtkit_domain::{
    AdtError, AdtRequest, AdtResponse, HttpMethod, Result as DomainResult, SessionType,
};
use async_trait::async_trait;
use parking_lot::Mutex;

/// Scripted `AdtConnection`.
///
/// Replies are consumed in order; once the script runs dry every request
/// gets an empty 200. All requests are kept for assertions.
#[derive(Default, Clone)]
pub struct ScriptedConnection {
    replies: Arc<Mutex<VecDeque<DomainResult<AdtResponse>>>>,
    requests: Arc<Mutex<Vec<AdtRequest>>>,
    session_type: Arc<Mutex<Option<SessionType>>>,
}

impl ScriptedConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, status: u16, body: &str) -> Self {
        self.replies.lock().push_back(Ok(AdtResponse::new(status, body)));
        self
    }

    pub fn ok(self) -> Self {
        self.reply(200, "")
    }

    pub fn fail(self, error: AdtError) -> Self {
        self.replies.lock().push_back(Err(error));
        self
    }

    pub fn fail_status(self, status: u16) -> Self {
        self.fail(http_error(status))
    }

    pub fn requests(&self) -> Vec<AdtRequest> {
        self.requests.lock().clone()
    }

    /// `METHOD url?_action` summaries, handy for order assertions.
    pub fn calls(&self) -> Vec<String> {
        self.requests
            .lock()
            .iter()
            .map(|request| match request.param_value("_action") {
                Some(action) => format!("{} {} {action}", request.method, request.url),
                None => format!("{} {}", request.method, request.url),
            })
            .collect()
    }

    pub fn count(&self, method: HttpMethod, url_fragment: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|request| request.method == method && request.url.contains(url_fragment))
            .count()
    }

    pub fn count_action(&self, action: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|request| request.param_value("_action") == Some(action))
            .count()
    }
}

#[async_trait]
impl AdtConnection for ScriptedConnection {
    fn base_url(&self) -> &str {
        "https://sap.example.com"
    }

    fn session_id(&self) -> Option<String> {
        None
    }

    fn set_session_type(&self, session_type: SessionType) {
        *self.session_type.lock() = Some(session_type);
    }

    async fn make_adt_request(&self, request: AdtRequest) -> DomainResult<AdtResponse> {
        self.requests.lock().push(request);
        self.replies.lock().pop_front().unwrap_or_else(|| Ok(AdtResponse::new(200, "")))
    }
}

pub fn http_error(status: u16) -> AdtError {
    AdtError::Http { status, status_text: String::new(), body: String::new() }
}
