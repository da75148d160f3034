//! Shared utilities for the adtkit crates.
//!
//! # Feature Tiers
//!
//! - `foundation` (default): clock abstraction, JWT claim inspection
//! - `test-utils`: fixtures, async helpers and tracing setup for tests

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod jwt;
#[cfg(feature = "foundation")]
pub mod time;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(feature = "test-utils")]
pub mod testing;

#[cfg(feature = "foundation")]
pub use jwt::{JwtClaims, JwtError};
#[cfg(feature = "foundation")]
pub use time::{Clock, MockClock, SystemClock};
