//! File-based session store — one JSON file per session.
//!
//! Storage layout: `{root}/{session_id}.json`. Writes go through a
//! temporary file and an atomic rename so a crash mid-write never leaves
//! a truncated blob behind. Simple, portable, human-inspectable.

use async_trait::async_trait;
use roleweave_core::{SessionStore, StoreError};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A session store writing one JSON file per session under a root dir.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, session_id: &str) -> Result<PathBuf, StoreError> {
        validate_session_id(session_id)?;
        Ok(self.root.join(format!("{session_id}.json")))
    }
}

/// Session ids become file names; keep them to a safe alphabet.
fn validate_session_id(session_id: &str) -> Result<(), StoreError> {
    let ok = !session_id.is_empty()
        && session_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(StoreError::Storage(format!(
            "session id not usable as a file name: {session_id:?}"
        )))
    }
}

fn write_atomically(path: &Path, content: &str) -> Result<(), StoreError> {
    let parent = path
        .parent()
        .ok_or_else(|| StoreError::Storage("store path has no parent directory".into()))?;
    std::fs::create_dir_all(parent)
        .map_err(|e| StoreError::Storage(format!("failed to create store directory: {e}")))?;

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, content)
        .map_err(|e| StoreError::Storage(format!("failed to write session file: {e}")))?;
    std::fs::rename(&tmp, path)
        .map_err(|e| StoreError::Storage(format!("failed to finalize session file: {e}")))?;
    Ok(())
}

#[async_trait]
impl SessionStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn put(&self, session_id: &str, blob: serde_json::Value) -> Result<(), StoreError> {
        let path = self.path_for(session_id)?;
        let content = serde_json::to_string_pretty(&blob)
            .map_err(|e| StoreError::Storage(format!("failed to serialize session: {e}")))?;
        write_atomically(&path, &content)?;
        debug!(session_id, path = %path.display(), "Session persisted");
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let path = self.path_for(session_id)?;
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StoreError::Storage(format!(
                    "failed to read session file: {e}"
                )))
            }
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                session_id: session_id.to_string(),
                reason: e.to_string(),
            })
    }

    async fn delete(&self, session_id: &str) -> Result<bool, StoreError> {
        let path = self.path_for(session_id)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::Storage(format!(
                "failed to delete session file: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn roundtrip_through_disk() {
        let (_dir, store) = store();
        let blob = serde_json::json!({"schema_version": 1, "turn": 7});
        store.put("sess-abc", blob.clone()).await.unwrap();
        assert_eq!(store.get("sess-abc").await.unwrap(), Some(blob));
    }

    #[tokio::test]
    async fn missing_session_is_none() {
        let (_dir, store) = store();
        assert_eq!(store.get("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let (dir, store) = store();
        std::fs::write(dir.path().join("bad.json"), "{not json").unwrap();
        let err = store.get("bad").await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn hostile_session_id_is_rejected() {
        let (_dir, store) = store();
        let err = store
            .put("../escape", serde_json::json!(1))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Storage(_)));
        assert!(store.get("").await.is_err());
    }

    #[tokio::test]
    async fn delete_removes_the_file() {
        let (dir, store) = store();
        store.put("gone", serde_json::json!(1)).await.unwrap();
        assert!(store.delete("gone").await.unwrap());
        assert!(!dir.path().join("gone.json").exists());
        assert!(!store.delete("gone").await.unwrap());
    }

    #[tokio::test]
    async fn put_overwrites_atomically() {
        let (dir, store) = store();
        store.put("sess", serde_json::json!({"v": 1})).await.unwrap();
        store.put("sess", serde_json::json!({"v": 2})).await.unwrap();
        assert_eq!(
            store.get("sess").await.unwrap(),
            Some(serde_json::json!({"v": 2}))
        );
        // No stray temp files left behind
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
