//! Time abstractions
//!
//! - **[`clock`]**: real and mock clocks, so token expiry and error
//!   timestamps can be driven deterministically in tests

pub mod clock;

pub use clock::{Clock, MockClock, SystemClock};
