//! Request and response surfaces of the ADT connection

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_REQUEST_TIMEOUT_MS;

/// Case-insensitive, multi-valued header map.
///
/// Names are stored lowercase. `insert` replaces every existing value,
/// `append` keeps them (needed for `set-cookie`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderBag {
    entries: BTreeMap<String, Vec<String>>,
}

impl HeaderBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.entries.insert(name.as_ref().to_ascii_lowercase(), vec![value.into()]);
    }

    pub fn append(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.entries.entry(name.as_ref().to_ascii_lowercase()).or_default().push(value.into());
    }

    /// First value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// First value for `name`, trimmed, ignoring empty values.
    pub fn get_non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn get_all(&self, name: &str) -> &[String] {
        self.entries.get(&name.to_ascii_lowercase()).map_or(&[], Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        self.entries.remove(&name.to_ascii_lowercase())
    }

    /// Copy every entry of `other` into `self`, replacing same-named entries.
    pub fn extend_from(&mut self, other: &HeaderBag) {
        for (name, values) in &other.entries {
            self.entries.insert(name.clone(), values.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(name, values)| values.iter().map(move |v| (name.as_str(), v.as_str())))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for HeaderBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bag = Self::new();
        for (name, value) in iter {
            bag.append(name, value);
        }
        bag
    }
}

/// HTTP methods used against the ADT service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
        }
    }

    /// Methods that change server state and therefore need a CSRF token.
    pub fn is_mutating(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Delete | Self::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for a single ADT request.
///
/// `url` is either a path relative to the connection's base URL or an
/// absolute URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdtRequest {
    pub url: String,
    pub method: HttpMethod,
    #[serde(with = "duration_millis")]
    pub timeout: Duration,
    pub data: Option<String>,
    pub params: Vec<(String, String)>,
    pub headers: HeaderBag,
}

impl AdtRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            data: None,
            params: Vec::new(),
            headers: HeaderBag::new(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, url)
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Value of the first query parameter called `name`.
    pub fn param_value(&self, name: &str) -> Option<&str> {
        self.params.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }
}

/// Normalized response of the ADT connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdtResponse {
    pub data: String,
    pub status: u16,
    pub status_text: String,
    pub headers: HeaderBag,
    /// The request options that produced this response
    pub config: Option<AdtRequest>,
    /// Final URL the request was sent to
    pub request: Option<String>,
}

impl AdtResponse {
    pub fn new(status: u16, data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            status,
            status_text: String::new(),
            headers: HeaderBag::new(),
            config: None,
            request: None,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let mut headers = HeaderBag::new();
        headers.insert("X-CSRF-Token", "abc");
        assert_eq!(headers.get("x-csrf-token"), Some("abc"));
        assert!(headers.contains("X-Csrf-Token"));
    }

    #[test]
    fn append_keeps_multiple_values() {
        let mut headers = HeaderBag::new();
        headers.append("set-cookie", "a=1");
        headers.append("Set-Cookie", "b=2");
        assert_eq!(headers.get_all("set-cookie"), ["a=1".to_string(), "b=2".to_string()]);

        headers.insert("set-cookie", "c=3");
        assert_eq!(headers.get_all("set-cookie").len(), 1);
    }

    #[test]
    fn blank_values_are_ignored_by_get_non_empty() {
        let headers: HeaderBag = [("x-sap-url", "   ")].into_iter().collect();
        assert_eq!(headers.get_non_empty("x-sap-url"), None);
    }

    #[test]
    fn request_defaults_to_short_timeout() {
        let request = AdtRequest::get("/sap/bc/adt/discovery");
        assert_eq!(request.timeout, Duration::from_millis(1000));
        assert!(!request.method.is_mutating());
        assert!(HttpMethod::Put.is_mutating());
    }
}
