//! Connection-side ports

pub mod ports;

pub use ports::{AdtConnection, HttpTransport, SessionStorage, TransportRequest, TransportResponse};
