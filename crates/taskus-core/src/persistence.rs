use async_trait::async_trait;
use thiserror::Error;

use crate::{
    collection::{CollectionError, TaskCollection},
    storage::StorageError,
};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("stored tasks are malformed: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("stored tasks are invalid: {0}")]
    Invalid(#[from] CollectionError),
}

/// Load/save contract between the task store and its backing slot.
#[async_trait]
pub trait TaskPersistence: Send + Sync {
    /// Read the last saved collection; an absent slot yields an empty one.
    async fn load(&self) -> Result<TaskCollection, PersistenceError>;

    /// Replace the stored collection with `tasks`.
    async fn save(&self, tasks: &TaskCollection) -> Result<(), PersistenceError>;
}
