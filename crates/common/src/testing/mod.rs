//! Testing utilities and helpers
//!
//! - **[`fixtures`]**: unsigned JWTs and canned ADT payloads
//! - **[`logging`]**: one-time subscriber setup honouring `RUST_LOG`

pub mod fixtures;
pub mod logging;

pub use fixtures::{
    adt_error_message, check_report, lock_response, unsigned_jwt, unsigned_jwt_without_exp,
};
pub use logging::init_test_tracing;

pub use crate::time::MockClock;
