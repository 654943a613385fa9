//! PostgREST (Supabase) backend speaking plain HTTP through `reqwest`.

mod config;
mod error;
mod models;
mod store;

pub use config::RestConfig;
pub use error::RestDaoError;
pub use store::RestGameStore;

use crate::dao::storage::StorageError;

impl From<RestDaoError> for StorageError {
    fn from(err: RestDaoError) -> Self {
        if err.is_conflict() {
            StorageError::conflict(err.to_string())
        } else {
            StorageError::unavailable(err.to_string(), err)
        }
    }
}
