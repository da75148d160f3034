//! Header rules of the proxy layer in front of the connection

use adtkit_domain::headers::{
    HEADER_AUTHORIZATION, HEADER_SAP_AUTH_TYPE, HEADER_SAP_DESTINATION, HEADER_SAP_JWT_TOKEN,
    HEADER_SAP_URL, PRESERVED_HEADERS, PROXY_MODIFIED_HEADERS, PROXY_ROUTING_HEADERS,
    SAP_CONNECTION_HEADERS, SESSION_ID_HEADERS, UAA_HEADERS,
};
use adtkit_domain::{AuthType, HeaderBag};

/// What `x-sap-destination` names at a given call site.
///
/// The same header is read by the ABAP connection (the SAP system to talk
/// to) and by the destination service lookup (the entry to resolve).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DestinationRole {
    AbapConnection,
    DestinationService,
}

/// `x-sap-destination` read for a specific role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub name: String,
    pub role: DestinationRole,
}

/// A destination the proxy resolved to a URL and a JWT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDestination {
    pub url: String,
    pub jwt_token: String,
}

/// Session id from the first of `x-session-id`, `mcp-session-id`,
/// `x-mcp-session-id` that is present and non-empty.
pub fn session_id(headers: &HeaderBag) -> Option<&str> {
    SESSION_ID_HEADERS.iter().find_map(|name| headers.get_non_empty(name))
}

pub fn destination(headers: &HeaderBag, role: DestinationRole) -> Option<Destination> {
    headers
        .get_non_empty(HEADER_SAP_DESTINATION)
        .map(|name| Destination { name: name.to_string(), role })
}

/// Whether the request carries any proxy routing header.
pub fn is_proxy_request(headers: &HeaderBag) -> bool {
    PROXY_ROUTING_HEADERS.iter().any(|name| headers.contains(name))
}

/// Headers passed from the inbound request to the ABAP side: SAP connection
/// and UAA headers. Routing headers stay behind.
pub fn forwardable_headers(inbound: &HeaderBag) -> HeaderBag {
    let mut forwarded = HeaderBag::new();
    for name in SAP_CONNECTION_HEADERS.iter().chain(UAA_HEADERS.iter()) {
        for value in inbound.get_all(name) {
            forwarded.append(name, value.clone());
        }
    }
    forwarded
}

/// Inject the JWT and URL of a resolved destination.
///
/// Only proxy-modifiable headers are written; preserved headers keep their
/// inbound values.
pub fn apply_destination_auth(headers: &mut HeaderBag, resolved: &ResolvedDestination) {
    let updates = [
        (HEADER_AUTHORIZATION, format!("Bearer {}", resolved.jwt_token)),
        (HEADER_SAP_JWT_TOKEN, resolved.jwt_token.clone()),
        (HEADER_SAP_URL, resolved.url.clone()),
        (HEADER_SAP_AUTH_TYPE, AuthType::Jwt.as_str().to_string()),
    ];
    for (name, value) in updates {
        debug_assert!(PROXY_MODIFIED_HEADERS.contains(&name));
        if !PRESERVED_HEADERS.contains(&name) {
            headers.insert(name, value);
        }
    }
}
