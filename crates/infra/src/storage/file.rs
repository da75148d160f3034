//! Session state persisted as one JSON file per session

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use adtkit_core::connection::SessionStorage;
use adtkit_domain::{AdtError, Result, SessionState};
use async_trait::async_trait;
use tracing::debug;

use crate::errors::InfraError;

/// [`SessionStorage`] writing `<dir>/<session id>.json`.
///
/// Characters outside `[A-Za-z0-9._-]` in the session id are replaced with
/// `_` to keep the file inside `dir`.
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    dir: PathBuf,
}

impl FileSessionStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, session_id: &str) -> PathBuf {
        let name: String = session_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", name.trim_start_matches('.')))
    }
}

fn infra(err: impl Into<InfraError>) -> AdtError {
    let infra: InfraError = err.into();
    infra.into()
}

#[async_trait]
impl SessionStorage for FileSessionStorage {
    async fn save(&self, session_id: &str, state: &SessionState) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(infra)?;
        let path = self.path_for(session_id);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_vec_pretty(state).map_err(infra)?;

        tokio::fs::write(&tmp, json).await.map_err(infra)?;
        tokio::fs::rename(&tmp, &path).await.map_err(infra)?;
        debug!(path = %path.display(), "session state saved");
        Ok(())
    }

    async fn load(&self, session_id: &str) -> Result<Option<SessionState>> {
        let path = self.path_for(session_id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes).map_err(infra)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(infra(err)),
        }
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        match tokio::fs::remove_file(self.path_for(session_id)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(infra(err)),
        }
    }
}
