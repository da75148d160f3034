//! In-memory stores, for tests and short-lived processes

use std::collections::HashMap;

use adtkit_core::auth::{ServiceKeyStore, SessionStore};
use adtkit_core::connection::SessionStorage;
use adtkit_domain::{
    AdtError, AuthorizationConfig, ConnectionConfig, Result, SessionState, StoreErrorCode,
    StoredConfig,
};
use async_trait::async_trait;
use parking_lot::RwLock;

/// [`SessionStorage`] keyed by session id.
#[derive(Debug, Default)]
pub struct InMemorySessionStorage {
    sessions: RwLock<HashMap<String, SessionState>>,
}

impl InMemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

#[async_trait]
impl SessionStorage for InMemorySessionStorage {
    async fn save(&self, session_id: &str, state: &SessionState) -> Result<()> {
        self.sessions.write().insert(session_id.to_string(), state.clone());
        Ok(())
    }

    async fn load(&self, session_id: &str) -> Result<Option<SessionState>> {
        Ok(self.sessions.read().get(session_id).cloned())
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        self.sessions.write().remove(session_id);
        Ok(())
    }
}

/// [`SessionStore`] keyed by destination.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, StoredConfig>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load_session(&self, destination: &str) -> Result<Option<StoredConfig>> {
        Ok(self.sessions.read().get(destination).cloned())
    }

    async fn save_session(&self, destination: &str, config: &StoredConfig) -> Result<()> {
        self.sessions.write().insert(destination.to_string(), config.clone());
        Ok(())
    }

    async fn delete_session(&self, destination: &str) -> Result<()> {
        self.sessions.write().remove(destination);
        Ok(())
    }

    async fn authorization_config(&self, destination: &str) -> Result<Option<AuthorizationConfig>> {
        Ok(self.sessions.read().get(destination).and_then(StoredConfig::authorization))
    }

    async fn connection_config(&self, destination: &str) -> Result<Option<ConnectionConfig>> {
        Ok(self.sessions.read().get(destination).and_then(StoredConfig::connection))
    }

    async fn set_authorization_config(
        &self,
        destination: &str,
        config: &AuthorizationConfig,
    ) -> Result<()> {
        self.sessions
            .write()
            .entry(destination.to_string())
            .or_default()
            .set_authorization(config.clone());
        Ok(())
    }

    async fn set_connection_config(
        &self,
        destination: &str,
        config: &ConnectionConfig,
    ) -> Result<()> {
        self.sessions
            .write()
            .entry(destination.to_string())
            .or_default()
            .set_connection(config.clone());
        Ok(())
    }
}

/// Read-only [`ServiceKeyStore`] filled at construction.
///
/// A key that exists but lacks the requested part is an `INVALID_CONFIG`
/// error rather than a miss.
#[derive(Debug, Default)]
pub struct InMemoryServiceKeyStore {
    keys: HashMap<String, StoredConfig>,
}

impl InMemoryServiceKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_key(mut self, destination: impl Into<String>, key: StoredConfig) -> Self {
        self.keys.insert(destination.into(), key);
        self
    }
}

#[async_trait]
impl ServiceKeyStore for InMemoryServiceKeyStore {
    async fn service_key(&self, destination: &str) -> Result<Option<StoredConfig>> {
        Ok(self.keys.get(destination).cloned())
    }

    async fn authorization_config(&self, destination: &str) -> Result<Option<AuthorizationConfig>> {
        self.keys
            .get(destination)
            .map(|key| {
                key.authorization().ok_or_else(|| {
                    AdtError::store(
                        StoreErrorCode::InvalidConfig,
                        format!("service key '{destination}' lacks UAA credentials"),
                    )
                })
            })
            .transpose()
    }

    async fn connection_config(&self, destination: &str) -> Result<Option<ConnectionConfig>> {
        Ok(self.keys.get(destination).and_then(StoredConfig::connection))
    }
}
