//! Persistence provider: the remote document store backed by a local copy.
//!
//! Reads prefer the remote store, then the last document seen remotely, then
//! the local file. Writes go to the remote store and land locally only when
//! the remote write fails. Whole-document last-writer-wins throughout.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use time::OffsetDateTime;
use tokio::{fs, sync::RwLock};
use tracing::{debug, info, warn};

use crate::{
    config::AppConfig,
    dao::{
        game_store::{FileGameStore, GameStore},
        models::GameData,
        storage::StorageResult,
    },
};

/// Result of a save. Saving never fails outright; the caller decides what to
/// tell the user from this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub success: bool,
    pub error: Option<String>,
}

impl SaveOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Game document provider shared by every service.
pub struct Persistence {
    remote: Option<Arc<dyn GameStore>>,
    local: Arc<dyn GameStore>,
    cache: RwLock<Option<GameData>>,
}

impl Persistence {
    /// Provider working on `local` only.
    pub fn new(local: Arc<dyn GameStore>) -> Self {
        Self {
            remote: None,
            local,
            cache: RwLock::new(None),
        }
    }

    /// Put `remote` in front of the local store.
    pub fn with_remote(mut self, remote: Arc<dyn GameStore>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Build the provider described by `config`: the local file, plus the gist
    /// when one is configured and reachable through the compiled backends.
    ///
    /// A token without a gist id creates a private gist seeded with the local
    /// document. Its id is kept next to the data file and reused afterwards.
    pub async fn connect(config: &AppConfig) -> Self {
        let local = FileGameStore::new(config.data_path.clone());
        let persistence = Self::new(Arc::new(local.clone()));

        let Some(gist) = config.gist.clone() else {
            return persistence;
        };

        #[cfg(feature = "gist-store")]
        {
            match open_gist(gist, &local, &gist_id_path(config)).await {
                Some(store) => persistence.with_remote(Arc::new(store)),
                None => persistence,
            }
        }

        #[cfg(not(feature = "gist-store"))]
        {
            let _ = local;
            warn!(
                gist_id = ?gist.gist_id,
                "gist configured but the gist-store feature is disabled; using local storage only"
            );
            persistence
        }
    }

    /// Whether a remote store is configured.
    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Load the current document.
    ///
    /// Fails only when the remote store (if any) failed, no document was
    /// cached, and the local read failed too. An empty store yields the
    /// default document.
    pub async fn load(&self) -> StorageResult<GameData> {
        if let Some(remote) = &self.remote {
            match remote.fetch().await {
                Ok(doc) => {
                    let data = doc.unwrap_or_default();
                    *self.cache.write().await = Some(data.clone());
                    return Ok(data);
                }
                Err(err) => {
                    if let Some(cached) = self.cache.read().await.clone() {
                        warn!(error = %err, "remote read failed; serving cached document");
                        return Ok(cached);
                    }
                    warn!(error = %err, "remote read failed; falling back to local document");
                }
            }
        }

        let doc = self.local.fetch().await?;
        Ok(doc.unwrap_or_default())
    }

    /// Write `data` as the new document, stamping its update time.
    pub async fn save(&self, mut data: GameData) -> SaveOutcome {
        data.last_updated = OffsetDateTime::now_utc();

        let Some(remote) = &self.remote else {
            return match self.local.store(data).await {
                Ok(()) => {
                    debug!("game document saved locally");
                    SaveOutcome::ok()
                }
                Err(err) => {
                    warn!(error = %err, "local write failed");
                    SaveOutcome::failed(err.to_string())
                }
            };
        };

        match remote.store(data.clone()).await {
            Ok(()) => {
                *self.cache.write().await = Some(data);
                debug!("game document saved remotely");
                SaveOutcome::ok()
            }
            Err(err) => {
                warn!(error = %err, "remote write failed; keeping a local copy");
                if let Err(local_err) = self.local.store(data).await {
                    warn!(error = %local_err, "local fallback write failed");
                }
                SaveOutcome::failed(err.to_string())
            }
        }
    }

    /// Health check of the store that serves reads first.
    pub async fn health_check(&self) -> StorageResult<()> {
        match &self.remote {
            Some(remote) => remote.health_check().await,
            None => self.local.health_check().await,
        }
    }
}

/// Sidecar file remembering the id of a gist created at startup.
pub fn gist_id_path(config: &AppConfig) -> PathBuf {
    config.data_path.with_extension("gist-id")
}

#[cfg(feature = "gist-store")]
async fn open_gist(
    gist: crate::config::GistConfig,
    local: &FileGameStore,
    id_path: &Path,
) -> Option<crate::dao::game_store::gist::GistGameStore> {
    use crate::dao::game_store::gist::GistGameStore;

    if !gist.has_token() {
        warn!("gist configuration lacks a token; using local storage only");
        return None;
    }

    let gist = if gist.gist_id().is_some() {
        gist
    } else {
        match fs::read_to_string(id_path).await {
            Ok(id) if !id.trim().is_empty() => {
                info!(path = %id_path.display(), "reusing previously created gist");
                gist.with_gist_id(id.trim())
            }
            _ => return create_gist(gist, local, id_path).await,
        }
    };

    match GistGameStore::connect(gist) {
        Ok(store) => Some(store),
        Err(err) => {
            warn!(error = %err, "failed to set up gist storage; using local storage only");
            None
        }
    }
}

#[cfg(feature = "gist-store")]
async fn create_gist(
    gist: crate::config::GistConfig,
    local: &FileGameStore,
    id_path: &Path,
) -> Option<crate::dao::game_store::gist::GistGameStore> {
    use crate::dao::game_store::gist::GistGameStore;

    let seed = match local.fetch().await {
        Ok(doc) => doc.unwrap_or_default(),
        Err(err) => {
            warn!(error = %err, "local document unreadable; seeding the new gist with defaults");
            GameData::default()
        }
    };

    let store = match GistGameStore::create(gist, &seed).await {
        Ok(store) => store,
        Err(err) => {
            warn!(error = %err, "failed to create gist; using local storage only");
            return None;
        }
    };

    if let Some(parent) = id_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(err) = fs::create_dir_all(parent).await {
            warn!(error = %err, "failed to create the gist id directory");
        }
    }
    if let Err(err) = fs::write(id_path, store.gist_id()).await {
        warn!(
            path = %id_path.display(),
            gist_id = %store.gist_id(),
            error = %err,
            "failed to remember the new gist id; set GIST_ID to keep using it"
        );
    }
    Some(store)
}
