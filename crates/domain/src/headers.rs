//! HTTP header names shared by the proxy layer, the auth resolver and the
//! connection.
//!
//! All names are lowercase; header lookups through [`crate::HeaderBag`] are
//! case-insensitive.

// Proxy routing headers
pub const HEADER_BTP_DESTINATION: &str = "x-btp-destination";
pub const HEADER_MCP_DESTINATION: &str = "x-mcp-destination";
pub const HEADER_MCP_URL: &str = "x-mcp-url";

// SAP ABAP connection headers
pub const HEADER_SAP_DESTINATION: &str = "x-sap-destination";
pub const HEADER_SAP_URL: &str = "x-sap-url";
pub const HEADER_SAP_JWT_TOKEN: &str = "x-sap-jwt-token";
pub const HEADER_SAP_AUTH_TYPE: &str = "x-sap-auth-type";
pub const HEADER_SAP_CLIENT: &str = "x-sap-client";
pub const HEADER_SAP_LOGIN: &str = "x-sap-login";
pub const HEADER_SAP_PASSWORD: &str = "x-sap-password";
pub const HEADER_SAP_REFRESH_TOKEN: &str = "x-sap-refresh-token";

// UAA/XSUAA headers, two accepted spellings each
pub const HEADER_SAP_UAA_URL: &str = "x-sap-uaa-url";
pub const HEADER_UAA_URL: &str = "uaa-url";
pub const HEADER_SAP_UAA_CLIENT_ID: &str = "x-sap-uaa-client-id";
pub const HEADER_UAA_CLIENT_ID: &str = "uaa-client-id";
pub const HEADER_SAP_UAA_CLIENT_SECRET: &str = "x-sap-uaa-client-secret";
pub const HEADER_UAA_CLIENT_SECRET: &str = "uaa-client-secret";

// Session id headers, in lookup order
pub const HEADER_SESSION_ID: &str = "x-session-id";
pub const HEADER_MCP_SESSION_ID: &str = "mcp-session-id";
pub const HEADER_X_MCP_SESSION_ID: &str = "x-mcp-session-id";

// Standard headers
pub const HEADER_AUTHORIZATION: &str = "authorization";
pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_ACCEPT: &str = "accept";

// ADT protocol headers used by the connection
pub const HEADER_CSRF_TOKEN: &str = "x-csrf-token";
pub const HEADER_COOKIE: &str = "cookie";
pub const HEADER_SET_COOKIE: &str = "set-cookie";
pub const HEADER_ADT_SESSION_TYPE: &str = "x-sap-adt-sessiontype";

/// Value sent in `x-csrf-token` to ask the server for a fresh token.
pub const CSRF_FETCH: &str = "fetch";

pub const PROXY_ROUTING_HEADERS: [&str; 3] =
    [HEADER_BTP_DESTINATION, HEADER_MCP_DESTINATION, HEADER_MCP_URL];

pub const SAP_CONNECTION_HEADERS: [&str; 8] = [
    HEADER_SAP_DESTINATION,
    HEADER_SAP_URL,
    HEADER_SAP_JWT_TOKEN,
    HEADER_SAP_AUTH_TYPE,
    HEADER_SAP_CLIENT,
    HEADER_SAP_LOGIN,
    HEADER_SAP_PASSWORD,
    HEADER_SAP_REFRESH_TOKEN,
];

pub const UAA_HEADERS: [&str; 6] = [
    HEADER_SAP_UAA_URL,
    HEADER_UAA_URL,
    HEADER_SAP_UAA_CLIENT_ID,
    HEADER_UAA_CLIENT_ID,
    HEADER_SAP_UAA_CLIENT_SECRET,
    HEADER_UAA_CLIENT_SECRET,
];

pub const SESSION_ID_HEADERS: [&str; 3] =
    [HEADER_SESSION_ID, HEADER_MCP_SESSION_ID, HEADER_X_MCP_SESSION_ID];

/// Headers forwarded verbatim from the inbound request; the proxy never
/// rewrites them.
pub const PRESERVED_HEADERS: [&str; 2] = [HEADER_SAP_DESTINATION, HEADER_SAP_CLIENT];

/// Headers the proxy may add or overwrite once a destination resolves.
pub const PROXY_MODIFIED_HEADERS: [&str; 4] =
    [HEADER_AUTHORIZATION, HEADER_SAP_JWT_TOKEN, HEADER_SAP_URL, HEADER_SAP_AUTH_TYPE];

pub const AUTH_TYPE_JWT: &str = "jwt";
pub const AUTH_TYPE_BASIC: &str = "basic";
pub const AUTH_TYPE_XSUAA: &str = "xsuaa";
