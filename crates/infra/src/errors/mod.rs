//! Conversions from foreign error types into `AdtError`

mod conversions;

pub use conversions::{classify_network_error, InfraError};
