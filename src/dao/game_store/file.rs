use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::future::BoxFuture;
use tokio::fs;
use tracing::debug;

use crate::dao::{game_store::GameStore, models::GameData, storage::StorageResult};

/// Game document kept as a JSON file on the local disk.
#[derive(Clone)]
pub struct FileGameStore {
    path: Arc<Path>,
}

impl FileGameStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::from(path.into()),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn read(&self) -> StorageResult<Option<GameData>> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&raw)?))
    }

    async fn write(&self, data: &GameData) -> StorageResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let payload = serde_json::to_vec_pretty(data)?;
        let temp = self.temp_path();
        fs::write(&temp, payload).await?;
        fs::rename(&temp, &self.path).await?;
        debug!(path = %self.path.display(), "game document written");
        Ok(())
    }
}

impl GameStore for FileGameStore {
    fn fetch(&self) -> BoxFuture<'static, StorageResult<Option<GameData>>> {
        let store = self.clone();
        Box::pin(async move { store.read().await })
    }

    fn store(&self, data: GameData) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.write(&data).await })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            match fs::metadata(&store.path).await {
                Ok(_) => Ok(()),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
                Err(err) => Err(err.into()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileGameStore::new(dir.path().join("nothing.json"));
        assert!(store.fetch().await.unwrap().is_none());
        store.health_check().await.unwrap();
    }

    #[tokio::test]
    async fn stores_and_reads_back_in_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileGameStore::new(dir.path().join("data/game.json"));

        let mut data = GameData::default();
        data.add_member("Alice");
        store.store(data.clone()).await.unwrap();

        let back = store.fetch().await.unwrap().unwrap();
        assert_eq!(back, data);
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = FileGameStore::new(path);
        assert!(store.fetch().await.is_err());
    }
}
