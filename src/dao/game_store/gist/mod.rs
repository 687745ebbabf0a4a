mod config;
mod error;
mod models;
mod store;

pub use config::GistConfig;
pub use error::{GistDaoError, GistResult};
pub use store::GistGameStore;

use crate::dao::storage::StorageError;

impl From<GistDaoError> for StorageError {
    fn from(err: GistDaoError) -> Self {
        StorageError::unavailable(err.to_string(), err)
    }
}
