//! Authentication method resolution from inbound headers
//!
//! Exactly one method is chosen, by fixed priority:
//!
//! | priority | method          | required headers                                         |
//! |----------|-----------------|----------------------------------------------------------|
//! | 4        | SAP destination | `x-sap-destination`                                      |
//! | 3        | MCP destination | `x-mcp-destination`, `x-sap-auth-type: jwt`, `x-sap-url` |
//! | 2        | direct JWT      | `x-sap-jwt-token`, `x-sap-auth-type: jwt`, `x-sap-url`   |
//! | 1        | basic           | `x-sap-login`, `x-sap-password`, `x-sap-auth-type: basic`, `x-sap-url` |
//!
//! When the highest method present is incomplete the result is invalid; the
//! resolver never falls back to a lower method.

use adtkit_domain::headers::{
    HEADER_MCP_DESTINATION, HEADER_SAP_AUTH_TYPE, HEADER_SAP_CLIENT, HEADER_SAP_DESTINATION,
    HEADER_SAP_JWT_TOKEN, HEADER_SAP_LOGIN, HEADER_SAP_PASSWORD, HEADER_SAP_REFRESH_TOKEN,
    HEADER_SAP_UAA_CLIENT_ID, HEADER_SAP_UAA_CLIENT_SECRET, HEADER_SAP_UAA_URL, HEADER_SAP_URL,
    HEADER_UAA_CLIENT_ID, HEADER_UAA_CLIENT_SECRET, HEADER_UAA_URL,
};
use adtkit_domain::{
    AuthMethodPriority, AuthType, HeaderBag, HeaderValidationResult, ValidatedAuthConfig,
};
use tracing::{debug, warn};

/// Resolves inbound headers into a [`ValidatedAuthConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthResolver;

/// Raw header values relevant to authentication.
struct AuthHeaders<'a> {
    destination: Option<&'a str>,
    mcp_destination: Option<&'a str>,
    jwt_token: Option<&'a str>,
    login: Option<&'a str>,
    password: Option<&'a str>,
    auth_type: Option<&'a str>,
    sap_url: Option<&'a str>,
    sap_client: Option<&'a str>,
    refresh_token: Option<&'a str>,
}

impl<'a> AuthHeaders<'a> {
    fn read(headers: &'a HeaderBag) -> Self {
        Self {
            destination: headers.get_non_empty(HEADER_SAP_DESTINATION),
            mcp_destination: headers.get_non_empty(HEADER_MCP_DESTINATION),
            jwt_token: headers.get_non_empty(HEADER_SAP_JWT_TOKEN),
            login: headers.get_non_empty(HEADER_SAP_LOGIN),
            password: headers.get_non_empty(HEADER_SAP_PASSWORD),
            auth_type: headers.get_non_empty(HEADER_SAP_AUTH_TYPE),
            sap_url: headers.get_non_empty(HEADER_SAP_URL),
            sap_client: headers.get_non_empty(HEADER_SAP_CLIENT),
            refresh_token: headers.get_non_empty(HEADER_SAP_REFRESH_TOKEN),
        }
    }

    /// Lower-priority credential headers present next to `priority`.
    fn ignored_below(&self, priority: AuthMethodPriority) -> Vec<&'static str> {
        let candidates = [
            (AuthMethodPriority::McpDestination, HEADER_MCP_DESTINATION, self.mcp_destination),
            (AuthMethodPriority::DirectJwt, HEADER_SAP_JWT_TOKEN, self.jwt_token),
            (AuthMethodPriority::Basic, HEADER_SAP_LOGIN, self.login),
            (AuthMethodPriority::Basic, HEADER_SAP_PASSWORD, self.password),
        ];
        candidates
            .into_iter()
            .filter(|(level, _, value)| *level < priority && value.is_some())
            .map(|(_, name, _)| name)
            .collect()
    }
}

/// UAA credentials after reconciling both header spellings.
#[derive(Default)]
struct UaaHeaders {
    url: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
}

impl AuthResolver {
    pub fn new() -> Self {
        Self
    }

    /// Pick the authentication method described by `headers`.
    pub fn resolve(&self, headers: &HeaderBag) -> HeaderValidationResult {
        let raw = AuthHeaders::read(headers);
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let auth_type = match raw.auth_type.map(str::parse::<AuthType>) {
            Some(Ok(auth_type)) => Some(auth_type),
            Some(Err(_)) => {
                errors.push(format!(
                    "{HEADER_SAP_AUTH_TYPE} '{}' is not one of jwt, basic, xsuaa",
                    raw.auth_type.unwrap_or_default()
                ));
                None
            }
            None => None,
        };
        let uaa = Self::reconcile_uaa(headers, &mut warnings);

        let config = if let Some(destination) = raw.destination {
            Self::sap_destination(&raw, destination, auth_type, uaa, &mut warnings)
        } else if let Some(destination) = raw.mcp_destination {
            Self::mcp_destination(&raw, destination, auth_type, uaa, &mut errors, &mut warnings)
        } else if let Some(token) = raw.jwt_token {
            Self::direct_jwt(&raw, token, auth_type, uaa, &mut errors, &mut warnings)
        } else if auth_type == Some(AuthType::Jwt) {
            errors.push(format!(
                "{HEADER_SAP_AUTH_TYPE}: jwt requires {HEADER_SAP_JWT_TOKEN}, \
                 {HEADER_MCP_DESTINATION} or {HEADER_SAP_DESTINATION}"
            ));
            None
        } else if raw.login.is_some() || raw.password.is_some() || auth_type == Some(AuthType::Basic)
        {
            Self::basic(&raw, auth_type, &mut errors)
        } else {
            if errors.is_empty() {
                errors.push("no authentication method found in request headers".to_string());
            }
            None
        };

        let result = match config {
            Some(mut config) if errors.is_empty() => {
                config.errors.clone_from(&errors);
                config.warnings.clone_from(&warnings);
                debug!(
                    priority = ?config.priority,
                    auth_type = %config.auth_type,
                    "resolved authentication method"
                );
                HeaderValidationResult { is_valid: true, config: Some(config), errors, warnings }
            }
            _ => HeaderValidationResult { is_valid: false, config: None, errors, warnings },
        };

        for warning in &result.warnings {
            warn!(%warning, "authentication header anomaly");
        }
        result
    }

    fn sap_destination(
        raw: &AuthHeaders<'_>,
        destination: &str,
        auth_type: Option<AuthType>,
        uaa: UaaHeaders,
        warnings: &mut Vec<String>,
    ) -> Option<ValidatedAuthConfig> {
        let priority = AuthMethodPriority::SapDestination;
        if let Some(other) = auth_type.filter(|t| *t != AuthType::Jwt) {
            warnings.push(format!(
                "{HEADER_SAP_AUTH_TYPE} '{other}' overridden to jwt for {HEADER_SAP_DESTINATION}"
            ));
        }
        Self::warn_ignored(raw, priority, warnings);

        let mut config = ValidatedAuthConfig::for_method(priority, AuthType::Jwt);
        config.destination = Some(destination.to_string());
        config.sap_url = raw.sap_url.map(str::to_string);
        config.sap_client = raw.sap_client.map(str::to_string);
        config.refresh_token = raw.refresh_token.map(str::to_string);
        Self::apply_uaa(&mut config, uaa);
        Some(config)
    }

    fn mcp_destination(
        raw: &AuthHeaders<'_>,
        destination: &str,
        auth_type: Option<AuthType>,
        uaa: UaaHeaders,
        errors: &mut Vec<String>,
        warnings: &mut Vec<String>,
    ) -> Option<ValidatedAuthConfig> {
        let priority = AuthMethodPriority::McpDestination;
        if auth_type != Some(AuthType::Jwt) {
            errors.push(format!("{HEADER_MCP_DESTINATION} requires {HEADER_SAP_AUTH_TYPE}: jwt"));
        }
        let sap_url = Self::require_url(raw, HEADER_MCP_DESTINATION, errors);
        Self::warn_ignored(raw, priority, warnings);

        let mut config = ValidatedAuthConfig::for_method(priority, AuthType::Jwt);
        config.destination = Some(destination.to_string());
        config.sap_url = sap_url;
        config.sap_client = raw.sap_client.map(str::to_string);
        config.refresh_token = raw.refresh_token.map(str::to_string);
        Self::apply_uaa(&mut config, uaa);
        Some(config)
    }

    fn direct_jwt(
        raw: &AuthHeaders<'_>,
        token: &str,
        auth_type: Option<AuthType>,
        uaa: UaaHeaders,
        errors: &mut Vec<String>,
        warnings: &mut Vec<String>,
    ) -> Option<ValidatedAuthConfig> {
        let priority = AuthMethodPriority::DirectJwt;
        if auth_type != Some(AuthType::Jwt) {
            errors.push(format!("{HEADER_SAP_JWT_TOKEN} requires {HEADER_SAP_AUTH_TYPE}: jwt"));
        }
        let sap_url = Self::require_url(raw, HEADER_SAP_JWT_TOKEN, errors);
        Self::warn_ignored(raw, priority, warnings);

        let mut config = ValidatedAuthConfig::for_method(priority, AuthType::Jwt);
        config.jwt_token = Some(token.to_string());
        config.sap_url = sap_url;
        config.sap_client = raw.sap_client.map(str::to_string);
        config.refresh_token = raw.refresh_token.map(str::to_string);
        Self::apply_uaa(&mut config, uaa);
        Some(config)
    }

    fn basic(
        raw: &AuthHeaders<'_>,
        auth_type: Option<AuthType>,
        errors: &mut Vec<String>,
    ) -> Option<ValidatedAuthConfig> {
        if auth_type != Some(AuthType::Basic) {
            errors.push(format!(
                "{HEADER_SAP_LOGIN}/{HEADER_SAP_PASSWORD} require {HEADER_SAP_AUTH_TYPE}: basic"
            ));
        }
        if raw.login.is_none() {
            errors.push(format!("basic authentication requires {HEADER_SAP_LOGIN}"));
        }
        if raw.password.is_none() {
            errors.push(format!("basic authentication requires {HEADER_SAP_PASSWORD}"));
        }
        let sap_url = Self::require_url(raw, "basic authentication", errors);

        let mut config =
            ValidatedAuthConfig::for_method(AuthMethodPriority::Basic, AuthType::Basic);
        config.sap_url = sap_url;
        config.sap_client = raw.sap_client.map(str::to_string);
        config.username = raw.login.map(str::to_string);
        config.password = raw.password.map(str::to_string);
        Some(config)
    }

    fn require_url(
        raw: &AuthHeaders<'_>,
        method: &str,
        errors: &mut Vec<String>,
    ) -> Option<String> {
        match raw.sap_url {
            None => {
                errors.push(format!("{method} requires {HEADER_SAP_URL}"));
                None
            }
            Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                errors.push(format!("{HEADER_SAP_URL} '{url}' is not an http(s) URL"));
                None
            }
            Some(url) => Some(url.trim_end_matches('/').to_string()),
        }
    }

    fn warn_ignored(
        raw: &AuthHeaders<'_>,
        priority: AuthMethodPriority,
        warnings: &mut Vec<String>,
    ) {
        let ignored = raw.ignored_below(priority);
        if !ignored.is_empty() {
            warnings.push(format!(
                "ignoring lower-priority authentication headers: {}",
                ignored.join(", ")
            ));
        }
    }

    fn reconcile_uaa(headers: &HeaderBag, warnings: &mut Vec<String>) -> UaaHeaders {
        let mut pick = |preferred: &str, alternate: &str| {
            let first = headers.get_non_empty(preferred);
            let second = headers.get_non_empty(alternate);
            if let (Some(a), Some(b)) = (first, second) {
                if a != b {
                    warnings.push(format!("{preferred} and {alternate} differ; using {preferred}"));
                }
            }
            first.or(second).map(str::to_string)
        };
        UaaHeaders {
            url: pick(HEADER_SAP_UAA_URL, HEADER_UAA_URL),
            client_id: pick(HEADER_SAP_UAA_CLIENT_ID, HEADER_UAA_CLIENT_ID),
            client_secret: pick(HEADER_SAP_UAA_CLIENT_SECRET, HEADER_UAA_CLIENT_SECRET),
        }
    }

    fn apply_uaa(config: &mut ValidatedAuthConfig, uaa: UaaHeaders) {
        config.uaa_url = uaa.url;
        config.uaa_client_id = uaa.client_id;
        config.uaa_client_secret = uaa.client_secret;
    }
}
