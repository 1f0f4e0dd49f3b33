use std::{
    fs::{self, File},
    io::{Read, Write},
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use taskus_core::storage::{KeyValueStore, StorageError};
use tempfile::NamedTempFile;
use tracing::instrument;

const SLOT_EXTENSION: &str = "json";

/// One file per key under `root`. Writes go through a temp file in the same
/// directory and are renamed into place, so a reader never sees a partial slot.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("{}.{SLOT_EXTENSION}", sanitize_key(key)))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    #[instrument(skip_all, fields(key))]
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root).map_err(storage_err)?;
        write_atomic(&self.path_for(key), value)
    }

    #[instrument(skip_all, fields(key))]
    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.path_for(key);
        let mut file = File::open(&path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound {
                    key: key.to_string(),
                }
            } else {
                storage_err(err)
            }
        })?;

        let mut buf = Vec::new();
        file.read_to_end(&mut buf).map_err(storage_err)?;
        Ok(buf)
    }

    #[instrument(skip_all, fields(key))]
    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(_) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(storage_err(err)),
        }
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    let parent = path.parent().ok_or_else(|| StorageError::Storage {
        reason: "invalid storage path".to_string(),
    })?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(storage_err)?;
    tmp.write_all(bytes).map_err(storage_err)?;
    tmp.flush().map_err(storage_err)?;
    tmp.persist(path).map_err(|e| storage_err(e.error))?;
    Ok(())
}

/// Keys may contain `/` or other characters that are not valid in file names.
fn sanitize_key(key: &str) -> String {
    URL_SAFE_NO_PAD.encode(key)
}

fn storage_err<E: ToString>(err: E) -> StorageError {
    StorageError::Storage {
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use taskus_core::storage::KeyValueStore;

    use super::*;

    #[tokio::test]
    async fn round_trip_writes_plain_slot_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("data"));

        let value = br#"[{"id":"1","description":"Buy milk","priority":"Medium","status":"todo"}]"#;
        store.put("tasks", value).await.expect("put");
        assert_eq!(store.get("tasks").await.expect("get"), value);

        let on_disk = std::fs::read(store.path_for("tasks")).expect("read slot");
        assert_eq!(on_disk, value);
    }

    #[tokio::test]
    async fn put_replaces_previous_value() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());
        store.put("tasks", b"[1]").await.expect("first put");
        store.put("tasks", b"[]").await.expect("second put");
        assert_eq!(store.get("tasks").await.expect("get"), b"[]");

        let entries = std::fs::read_dir(dir.path()).expect("read dir").count();
        assert_eq!(entries, 1, "temp files must not be left behind");
    }

    #[tokio::test]
    async fn keys_with_separators_stay_inside_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());
        store.put("../escape/tasks", b"x").await.expect("put");
        assert_eq!(store.path_for("../escape/tasks").parent(), Some(dir.path()));
        assert_eq!(store.get("../escape/tasks").await.expect("get"), b"x");
    }

    #[tokio::test]
    async fn missing_key_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());
        let err = store.get("tasks").await.expect_err("missing");
        assert_eq!(
            err,
            StorageError::NotFound {
                key: "tasks".into()
            }
        );
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());
        store.put("k", b"v").await.expect("put");
        store.delete("k").await.expect("delete");
        store.delete("k").await.expect("delete again");

        let err = store.get("k").await.expect_err("should be missing");
        assert!(matches!(err, StorageError::NotFound { .. }));
    }
}
