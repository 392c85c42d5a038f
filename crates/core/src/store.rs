//! Session store trait — durable blob storage for serialized sessions.
//!
//! The blob is exactly the state machine's `serialize()` payload; the
//! store never looks inside it.

use async_trait::async_trait;

use crate::error::StoreError;

/// The session persistence collaborator.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The backend name (e.g. "memory", "file").
    fn name(&self) -> &str;

    /// Store or replace the blob for a session.
    async fn put(
        &self,
        session_id: &str,
        blob: serde_json::Value,
    ) -> std::result::Result<(), StoreError>;

    /// Fetch the blob for a session; `None` when unknown.
    async fn get(
        &self,
        session_id: &str,
    ) -> std::result::Result<Option<serde_json::Value>, StoreError>;

    /// Remove a session. Returns whether anything was deleted.
    async fn delete(&self, session_id: &str) -> std::result::Result<bool, StoreError>;
}
