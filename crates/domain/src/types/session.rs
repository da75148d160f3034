//! Session state kept for stateful connections

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Cookies and CSRF token preserved across requests of one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Serialized `Cookie` header value
    pub cookies: Option<String>,
    pub csrf_token: Option<String>,
    pub cookie_store: BTreeMap<String, String>,
}

impl SessionState {
    /// Merge `Set-Cookie` values into the cookie store and rebuild the
    /// `Cookie` header. Attributes after the first `;` are dropped.
    pub fn absorb_set_cookies<'a>(&mut self, set_cookies: impl IntoIterator<Item = &'a str>) {
        let mut changed = false;
        for raw in set_cookies {
            let pair = raw.split(';').next().unwrap_or_default();
            if let Some((name, value)) = pair.split_once('=') {
                let name = name.trim();
                if !name.is_empty() {
                    self.cookie_store.insert(name.to_string(), value.trim().to_string());
                    changed = true;
                }
            }
        }
        if changed {
            self.cookies = Some(self.cookie_header());
        }
    }

    /// `name=value; name=value` for every stored cookie.
    pub fn cookie_header(&self) -> String {
        self.cookie_store
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn clear_csrf(&mut self) {
        self.csrf_token = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_cookie_attributes_are_dropped() {
        let mut state = SessionState::default();
        state.absorb_set_cookies([
            "SAP_SESSIONID_A4H_001=abc; path=/; HttpOnly",
            "sap-usercontext=sap-client=001; path=/",
        ]);
        assert_eq!(state.cookie_store.get("SAP_SESSIONID_A4H_001").map(String::as_str), Some("abc"));
        assert_eq!(
            state.cookie_store.get("sap-usercontext").map(String::as_str),
            Some("sap-client=001")
        );
        assert_eq!(
            state.cookies.as_deref(),
            Some("SAP_SESSIONID_A4H_001=abc; sap-usercontext=sap-client=001")
        );
    }

    #[test]
    fn later_cookie_replaces_earlier_value() {
        let mut state = SessionState::default();
        state.absorb_set_cookies(["a=1"]);
        state.absorb_set_cookies(["a=2", "garbage"]);
        assert_eq!(state.cookies.as_deref(), Some("a=2"));
    }

    #[test]
    fn serializes_with_camel_case_names() {
        let state = SessionState { csrf_token: Some("tok".into()), ..SessionState::default() };
        let json = serde_json::to_value(&state).expect("serializable");
        assert_eq!(json["csrfToken"], "tok");
        assert!(json["cookies"].is_null());
    }
}
