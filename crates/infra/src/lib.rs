//! # adtkit Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The ABAP connection (CSRF, cookies, retry on auth rejection)
//! - The reqwest-backed HTTP transport
//! - Session, session-state and service-key stores (memory and file)
//! - Token refresh with caching and the legacy provider adapter
//! - Settings loading from environment variables and files
//!
//! ## Architecture
//! - Implements traits defined in `adtkit-core`
//! - Depends on `adtkit-domain`, `adtkit-common` and `adtkit-core`
//! - Contains all "impure" code (network and filesystem I/O)

pub mod config;
pub mod connection;
pub mod errors;
pub mod http;
pub mod storage;
pub mod token;

// Re-export commonly used items
pub use connection::{AbapConnection, AbapConnectionBuilder, SessionManager};
pub use errors::{classify_network_error, InfraError};
pub use http::{ReqwestTransport, ReqwestTransportBuilder};
pub use storage::{
    FileSessionStorage, InMemoryServiceKeyStore, InMemorySessionStorage, InMemorySessionStore,
};
pub use token::{CachedTokenRefresher, LegacyTokenProviderAdapter};
