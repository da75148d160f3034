//! # adtkit Core
//!
//! Business logic of the ADT client, free of infrastructure code.
//!
//! This crate contains:
//! - The object lifecycle orchestrator (create, update, delete and reads)
//! - Authentication header resolution and proxy header rules
//! - Port traits for connections, transports, token providers and stores
//!
//! ## Architecture Principles
//! - Only depends on `adtkit-domain` and `adtkit-common`
//! - No HTTP client, filesystem or environment access
//! - All I/O goes through the port traits

pub mod adt;
pub mod auth;
pub mod connection;

pub use adt::{AdtClass, AdtDataElement, AdtDomain, AdtObject, AdtProgram, ObjectKind};
pub use auth::{
    AuthResolver, LegacyTokenProvider, ServiceKeyStore, SessionStore, TokenProvider,
    TokenRefresher,
};
pub use connection::{AdtConnection, HttpTransport, SessionStorage};
