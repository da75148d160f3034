//! Conversions from external infrastructure errors into domain errors.

use std::error::Error as StdError;
use std::io::{Error as IoError, ErrorKind};

use adtkit_domain::{AdtError, NetworkErrorCode, StoreErrorCode};
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub AdtError);

impl From<InfraError> for AdtError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<AdtError> for InfraError {
    fn from(value: AdtError) -> Self {
        Self(value)
    }
}

trait IntoAdtError {
    fn into_adt(self) -> AdtError;
}

/* -------------------------------------------------------------------------- */
/* Network classification */
/* -------------------------------------------------------------------------- */

/// Messages emitted by the OS resolver and socket layer for each registered
/// code, for errors that arrive without an `io::ErrorKind` we can use.
const MESSAGE_MARKERS: [(&str, NetworkErrorCode); 8] = [
    ("connection refused", NetworkErrorCode::ConnectionRefused),
    ("connection reset", NetworkErrorCode::ConnectionReset),
    ("timed out", NetworkErrorCode::TimedOut),
    ("dns error", NetworkErrorCode::DnsNotFound),
    ("failed to lookup address", NetworkErrorCode::DnsNotFound),
    ("name or service not known", NetworkErrorCode::DnsNotFound),
    ("network is unreachable", NetworkErrorCode::NetworkUnreachable),
    ("no route to host", NetworkErrorCode::HostUnreachable),
];

/// Registered network code for `error` or any error in its source chain.
pub fn classify_network_error(error: &(dyn StdError + 'static)) -> Option<NetworkErrorCode> {
    let mut current: Option<&(dyn StdError + 'static)> = Some(error);
    while let Some(err) = current {
        if let Some(code) = err.downcast_ref::<IoError>().and_then(|io| io_kind_code(io.kind())) {
            return Some(code);
        }
        let message = err.to_string();
        if let Some(code) = NetworkErrorCode::find_in_message(&message) {
            return Some(code);
        }
        let lower = message.to_ascii_lowercase();
        if let Some((_, code)) = MESSAGE_MARKERS.iter().find(|(marker, _)| lower.contains(marker)) {
            return Some(*code);
        }
        current = err.source();
    }
    None
}

fn io_kind_code(kind: ErrorKind) -> Option<NetworkErrorCode> {
    match kind {
        ErrorKind::ConnectionRefused => Some(NetworkErrorCode::ConnectionRefused),
        ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted => {
            Some(NetworkErrorCode::ConnectionReset)
        }
        ErrorKind::TimedOut => Some(NetworkErrorCode::TimedOut),
        _ => None,
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → AdtError */
/* -------------------------------------------------------------------------- */

impl IntoAdtError for HttpError {
    fn into_adt(self) -> AdtError {
        if self.is_timeout() {
            return AdtError::network(NetworkErrorCode::TimedOut, "HTTP request timed out");
        }

        if let Some(code) = classify_network_error(&self) {
            return AdtError::network(code, self.to_string());
        }

        if self.is_builder() {
            return AdtError::InvalidInput(format!("invalid HTTP request: {self}"));
        }

        AdtError::Transport(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        Self(value.into_adt())
    }
}

/* -------------------------------------------------------------------------- */
/* io / serde → AdtError (storage) */
/* -------------------------------------------------------------------------- */

impl IntoAdtError for IoError {
    fn into_adt(self) -> AdtError {
        match self.kind() {
            ErrorKind::NotFound => AdtError::store(StoreErrorCode::FileNotFound, self.to_string()),
            _ => AdtError::store(StoreErrorCode::StorageError, self.to_string()),
        }
    }
}

impl From<IoError> for InfraError {
    fn from(value: IoError) -> Self {
        Self(value.into_adt())
    }
}

impl IntoAdtError for JsonError {
    fn into_adt(self) -> AdtError {
        AdtError::store(StoreErrorCode::ParseError, format!("invalid JSON: {self}"))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        Self(value.into_adt())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use std::fmt;
    use std::net::TcpListener;

    use super::*;

    #[derive(Debug)]
    struct Wrapped(IoError);

    impl fmt::Display for Wrapped {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("client error (Connect)")
        }
    }

    impl StdError for Wrapped {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn io_kind_in_source_chain_is_classified() {
        let err = Wrapped(IoError::from(ErrorKind::ConnectionRefused));
        assert_eq!(classify_network_error(&err), Some(NetworkErrorCode::ConnectionRefused));
    }

    #[test]
    fn message_markers_are_classified() {
        let err = IoError::new(ErrorKind::Other, "dns error: failed to lookup address information");
        assert_eq!(classify_network_error(&err), Some(NetworkErrorCode::DnsNotFound));

        let err = IoError::new(ErrorKind::Other, "connect EHOSTUNREACH 10.0.0.1:443");
        assert_eq!(classify_network_error(&err), Some(NetworkErrorCode::HostUnreachable));

        let err = IoError::new(ErrorKind::Other, "certificate verify failed");
        assert_eq!(classify_network_error(&err), None);
    }

    #[test]
    fn missing_file_maps_to_file_not_found() {
        let mapped: AdtError = InfraError::from(IoError::from(ErrorKind::NotFound)).into();
        assert_eq!(mapped.code(), "FILE_NOT_FOUND");

        let mapped: AdtError = InfraError::from(IoError::from(ErrorKind::PermissionDenied)).into();
        assert_eq!(mapped.code(), "STORAGE_ERROR");
    }

    #[test]
    fn invalid_json_maps_to_parse_error() {
        let err = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid json");
        let mapped: AdtError = InfraError::from(err).into();
        assert_eq!(mapped.code(), "PARSE_ERROR");
    }

    #[tokio::test]
    async fn refused_connection_maps_to_network_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("addr").port()
        };

        let error = reqwest::Client::builder()
            .no_proxy()
            .build()
            .expect("client")
            .get(format!("http://127.0.0.1:{port}/"))
            .send()
            .await
            .expect_err("nothing listens");

        let mapped: AdtError = InfraError::from(error).into();
        assert!(mapped.is_network(), "got {mapped:?}");
        assert_eq!(mapped.code(), "ECONNREFUSED");
    }
}
