//! Client-wide defaults
//!
//! Centralized location for the constants shared by the connection, the
//! token refresher and the object orchestrator.

// Request timing
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 1_000;
pub const DEFAULT_LONG_POLL_TIMEOUT_MS: u64 = 60_000;

// Token cache
pub const DEFAULT_TOKEN_SKEW_SECS: u64 = 30;

// ADT service paths
pub const ADT_DISCOVERY_PATH: &str = "/sap/bc/adt/discovery";
pub const ADT_CHECKRUNS_PATH: &str = "/sap/bc/adt/checkruns";
pub const ADT_ACTIVATION_PATH: &str = "/sap/bc/adt/activation";
pub const ADT_DELETION_CHECK_PATH: &str = "/sap/bc/adt/deletion/check";
pub const ADT_DELETION_DELETE_PATH: &str = "/sap/bc/adt/deletion/delete";
pub const ADT_TRANSPORT_CHECKS_PATH: &str = "/sap/bc/adt/cts/transportchecks";

/// Query parameter carrying the SAP client number.
pub const SAP_CLIENT_PARAM: &str = "sap-client";
/// Query parameter that makes the server hold a read until the object is
/// available.
pub const LONG_POLLING_PARAM: &str = "withLongPolling";

pub const DEFAULT_USER_AGENT: &str = concat!("adtkit/", env!("CARGO_PKG_VERSION"));
