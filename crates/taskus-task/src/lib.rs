//! Task store lifecycle and the slot-backed persistence adapter.

pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use taskus_core::{
    collection::TaskCollection,
    persistence::{PersistenceError, TaskPersistence},
    storage::{KeyValueStore, StorageError},
    tasks::Task,
};
use tracing::instrument;

pub use store::{PersistenceWarning, SaveState, TaskStore};

/// Slot name used when the config does not override it.
pub const DEFAULT_SLOT: &str = "tasks";

/// Persists the whole collection as one JSON array under a single key.
pub struct SlotPersistence<S: KeyValueStore> {
    store: Arc<S>,
    slot: String,
}

impl<S: KeyValueStore> SlotPersistence<S> {
    pub fn new(store: S) -> Self {
        Self::with_slot(store, DEFAULT_SLOT)
    }

    pub fn with_slot(store: S, slot: impl Into<String>) -> Self {
        Self {
            store: Arc::new(store),
            slot: slot.into(),
        }
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }
}

#[async_trait]
impl<S: KeyValueStore> TaskPersistence for SlotPersistence<S> {
    #[instrument(skip(self), fields(slot = %self.slot))]
    async fn load(&self) -> Result<TaskCollection, PersistenceError> {
        match self.store.get(&self.slot).await {
            Ok(bytes) => {
                let tasks: Vec<Task> = serde_json::from_slice(&bytes)?;
                Ok(TaskCollection::from_tasks(tasks)?)
            }
            Err(StorageError::NotFound { .. }) => Ok(TaskCollection::new()),
            Err(err) => Err(err.into()),
        }
    }

    #[instrument(skip(self, tasks), fields(slot = %self.slot, len = tasks.len()))]
    async fn save(&self, tasks: &TaskCollection) -> Result<(), PersistenceError> {
        let bytes = serde_json::to_vec(tasks)?;
        self.store.put(&self.slot, &bytes).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use taskus_core::{
        collection::Outcome,
        storage::InMemoryStore,
        tasks::{Priority, TaskStatus},
    };

    use super::*;

    fn sample() -> TaskCollection {
        let c = TaskCollection::new();
        let c = c.add("1".into(), "Write docs", Priority::High).resolve(&c);
        let c = c.add("2".into(), "Ship", Priority::Low).resolve(&c);
        match c.toggle(&"2".into()) {
            Outcome::Applied(next) => next,
            Outcome::Rejected(reason) => panic!("{reason}"),
        }
    }

    #[tokio::test]
    async fn load_of_missing_slot_is_empty() {
        let slot = SlotPersistence::new(InMemoryStore::new());
        let loaded = slot.load().await.expect("load");
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn load_after_save_returns_same_collection() {
        let slot = SlotPersistence::new(InMemoryStore::new());
        let tasks = sample();
        slot.save(&tasks).await.expect("save");

        let loaded = slot.load().await.expect("load");
        assert_eq!(loaded, tasks);
        assert_eq!(loaded.as_slice()[1].status, TaskStatus::Done);
    }

    #[tokio::test]
    async fn saves_canonical_records() {
        let kv = InMemoryStore::new();
        let slot = SlotPersistence::with_slot(kv.clone(), "todos");
        slot.save(&sample()).await.expect("save");

        let raw = kv.get("todos").await.expect("slot written");
        let json: serde_json::Value = serde_json::from_slice(&raw).expect("json");
        assert_eq!(json[1]["status"], "done");
        assert_eq!(json[0]["priority"], "High");
    }

    #[tokio::test]
    async fn malformed_slot_is_reported() {
        let kv = InMemoryStore::new();
        kv.put(DEFAULT_SLOT, b"{not json").await.expect("put");
        let slot = SlotPersistence::new(kv);
        let err = slot.load().await.expect_err("malformed");
        assert!(matches!(err, PersistenceError::Malformed(_)));
    }

    #[tokio::test]
    async fn duplicate_ids_in_slot_are_reported() {
        let kv = InMemoryStore::new();
        kv.put(
            DEFAULT_SLOT,
            br#"[{"id":"1","description":"a"},{"id":1,"description":"b"}]"#,
        )
        .await
        .expect("put");
        let slot = SlotPersistence::new(kv);
        let err = slot.load().await.expect_err("duplicate ids");
        assert!(matches!(err, PersistenceError::Invalid(_)));
    }
}
