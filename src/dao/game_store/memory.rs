use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use futures::future::BoxFuture;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::dao::{
    game_store::GameStore,
    models::GameData,
    storage::{StorageError, StorageResult},
};

#[derive(Debug, Error)]
#[error("memory store {operation} disabled")]
struct InjectedFailure {
    operation: &'static str,
}

impl InjectedFailure {
    fn into_storage(self) -> StorageError {
        StorageError::unavailable(self.to_string(), self)
    }
}

#[derive(Default)]
struct Inner {
    data: RwLock<Option<GameData>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

/// In-process game document, mostly useful for tests and ephemeral runs.
///
/// Reads and writes can be switched to fail to exercise fallback paths.
#[derive(Clone, Default)]
pub struct MemoryGameStore {
    inner: Arc<Inner>,
}

impl MemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: GameData) -> Self {
        Self {
            inner: Arc::new(Inner {
                data: RwLock::new(Some(data)),
                ..Inner::default()
            }),
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Current document, bypassing failure injection.
    pub async fn snapshot(&self) -> Option<GameData> {
        self.inner.data.read().await.clone()
    }
}

impl GameStore for MemoryGameStore {
    fn fetch(&self) -> BoxFuture<'static, StorageResult<Option<GameData>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            if inner.fail_reads.load(Ordering::SeqCst) {
                return Err(InjectedFailure { operation: "read" }.into_storage());
            }
            Ok(inner.data.read().await.clone())
        })
    }

    fn store(&self, data: GameData) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            if inner.fail_writes.load(Ordering::SeqCst) {
                return Err(InjectedFailure { operation: "write" }.into_storage());
            }
            *inner.data.write().await = Some(data);
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            if inner.fail_reads.load(Ordering::SeqCst) {
                return Err(InjectedFailure { operation: "read" }.into_storage());
            }
            Ok(())
        })
    }
}
