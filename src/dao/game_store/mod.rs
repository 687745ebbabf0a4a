mod file;
#[cfg(feature = "gist-store")]
pub mod gist;
mod memory;

pub use file::FileGameStore;
pub use memory::MemoryGameStore;

use crate::dao::models::GameData;
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;

/// Backend holding the single shared game document.
pub trait GameStore: Send + Sync {
    /// Read the whole document. `None` when nothing has been stored yet.
    fn fetch(&self) -> BoxFuture<'static, StorageResult<Option<GameData>>>;
    /// Replace the whole document.
    fn store(&self, data: GameData) -> BoxFuture<'static, StorageResult<()>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
