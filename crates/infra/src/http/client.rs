use std::time::Duration;

use adtkit_core::connection::{HttpTransport, TransportRequest, TransportResponse};
use adtkit_domain::constants::DEFAULT_USER_AGENT;
use adtkit_domain::{AdtError, HeaderBag, HttpMethod, Result};
use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, Method, Proxy};
use tracing::debug;

use crate::errors::InfraError;

/// [`HttpTransport`] over a shared reqwest client.
///
/// Performs exactly one round trip per `send`; retries belong to the
/// connection, which knows which failures are worth retrying.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: ReqwestClient,
}

impl ReqwestTransport {
    /// Start building a new transport.
    pub fn builder() -> ReqwestTransportBuilder {
        ReqwestTransportBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let method = to_reqwest_method(request.method);
        let mut builder =
            self.client.request(method.clone(), &request.url).timeout(request.timeout);
        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        debug!(%method, url = %request.url, "sending HTTP request");
        let response = builder.send().await.map_err(|err| {
            debug!(%method, url = %request.url, error = %err, "HTTP request failed");
            AdtError::from(InfraError::from(err))
        })?;

        let status = response.status();
        debug!(%method, url = %request.url, %status, "received HTTP response");

        let mut headers = HeaderBag::new();
        for (name, value) in response.headers() {
            headers.append(name.as_str(), String::from_utf8_lossy(value.as_bytes()).into_owned());
        }
        let body = response.text().await.map_err(|err| AdtError::from(InfraError::from(err)))?;

        Ok(TransportResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Head => Method::HEAD,
    }
}

/// Builder for [`ReqwestTransport`].
#[derive(Debug)]
pub struct ReqwestTransportBuilder {
    connect_timeout: Duration,
    user_agent: String,
    accept_invalid_certs: bool,
    proxy: Option<String>,
    system_proxy: bool,
}

impl Default for ReqwestTransportBuilder {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_invalid_certs: false,
            proxy: None,
            system_proxy: false,
        }
    }
}

impl ReqwestTransportBuilder {
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Allow self-signed certificates, as found on development systems.
    pub fn accept_invalid_certs(mut self, enabled: bool) -> Self {
        self.accept_invalid_certs = enabled;
        self
    }

    /// Send every request through `url`. Takes precedence over
    /// [`system_proxy`](Self::system_proxy).
    pub fn proxy(mut self, url: impl Into<String>) -> Self {
        self.proxy = Some(url.into());
        self
    }

    /// Honour `HTTP_PROXY`, `HTTPS_PROXY` and `NO_PROXY`. Off by default, so
    /// requests go straight to the SAP system.
    pub fn system_proxy(mut self, enabled: bool) -> Self {
        self.system_proxy = enabled;
        self
    }

    pub fn build(self) -> Result<ReqwestTransport> {
        let mut builder = ReqwestClient::builder()
            .connect_timeout(self.connect_timeout)
            .user_agent(self.user_agent)
            .danger_accept_invalid_certs(self.accept_invalid_certs);

        builder = match &self.proxy {
            Some(url) => {
                let proxy = Proxy::all(url.as_str())
                    .map_err(|err| AdtError::Config(format!("invalid proxy URL '{url}': {err}")))?;
                debug!(proxy = %url, "routing requests through proxy");
                builder.proxy(proxy)
            }
            None if self.system_proxy => builder,
            None => builder.no_proxy(),
        };

        let client = builder.build().map_err(|err| AdtError::from(InfraError::from(err)))?;

        Ok(ReqwestTransport { client })
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn request(method: HttpMethod, url: String) -> TransportRequest {
        TransportRequest {
            method,
            url,
            headers: HeaderBag::new(),
            body: None,
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn non_success_status_is_a_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
            .expect(1)
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new().expect("transport");
        let response = transport
            .send(request(HttpMethod::Get, format!("{}/missing", server.uri())))
            .await
            .expect("response");

        assert_eq!(response.status, 404);
        assert_eq!(response.status_text, "Not Found");
        assert_eq!(response.body, "not here");
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn headers_and_body_are_sent_and_collected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("x-csrf-token", "T1"))
            .and(body_string("<xml/>"))
            .respond_with(
                ResponseTemplate::new(201)
                    .append_header("set-cookie", "a=1; path=/")
                    .append_header("set-cookie", "b=2; path=/"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut outgoing = request(HttpMethod::Post, server.uri());
        outgoing.headers.insert("x-csrf-token", "T1");
        outgoing.body = Some("<xml/>".into());

        let response =
            ReqwestTransport::new().expect("transport").send(outgoing).await.expect("response");

        assert_eq!(response.status, 201);
        assert_eq!(response.headers.get_all("set-cookie").len(), 2);
    }

    #[tokio::test]
    async fn slow_response_times_out_as_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let mut slow = request(HttpMethod::Get, server.uri());
        slow.timeout = Duration::from_millis(100);

        let transport = ReqwestTransport::new().expect("transport");
        let err = transport.send(slow).await.expect_err("timeout");
        assert_eq!(err.code(), "ETIMEDOUT");
    }

    #[tokio::test]
    async fn explicit_proxy_receives_the_request() {
        let proxy = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sap/bc/adt/discovery"))
            .and(header("host", "sap.example.invalid"))
            .respond_with(ResponseTemplate::new(200).set_body_string("via proxy"))
            .expect(1)
            .mount(&proxy)
            .await;

        let transport = ReqwestTransport::builder().proxy(proxy.uri()).build().expect("transport");
        let target = "http://sap.example.invalid/sap/bc/adt/discovery".to_string();
        let response = transport
            .send(request(HttpMethod::Get, target))
            .await
            .expect("proxied response");

        assert_eq!(response.body, "via proxy");
    }

    #[test]
    fn invalid_proxy_url_is_a_config_error() {
        let err = ReqwestTransport::builder()
            .proxy("not a proxy url")
            .build()
            .err()
            .expect("invalid proxy");
        assert!(matches!(err, AdtError::Config(message) if message.contains("not a proxy url")));
    }
}
