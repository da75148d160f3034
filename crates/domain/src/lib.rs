//! # adtkit Domain
//!
//! Error taxonomy, header names and data model of the adtkit client.
//!
//! This crate contains:
//! - Error types with stable codes and the `Result` alias
//! - Header constants and header groups of the proxy/connection protocol
//! - Object configurations and operation state of the lifecycle orchestrator
//! - Authentication, token and session types
//! - Client settings
//!
//! ## Architecture
//! - No dependencies on other adtkit crates
//! - Only external dependencies allowed
//! - Pure data types and constants

pub mod config;
pub mod constants;
pub mod errors;
pub mod headers;
pub mod types;

// Re-export commonly used items
pub use config::{ClientSettings, SessionType};
pub use errors::*;
pub use types::*;
