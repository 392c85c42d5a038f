//! Session persistence — self-describing JSON blobs with schema versioning.
//!
//! `save_state` emits everything needed to reconstruct an equivalent
//! machine; `load_state` refuses blobs whose schema version it does not
//! recognize and leaves the machine idle in that case.

use std::collections::BTreeMap;

use roleweave_core::{Error, Result, RoleQueue};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::context::ConversationContext;
use crate::machine::{ConversationStateMachine, SessionState};

/// Version of the persisted layout this build reads and writes.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SessionBlob {
    schema_version: u32,
    session_id: String,
    state: SessionState,
    context: ConversationContext,
    queues: BTreeMap<String, RoleQueue>,
    unit_order: Vec<String>,
}

impl ConversationStateMachine {
    /// Serialize the full session into a self-describing blob.
    pub fn save_state(&self) -> Result<serde_json::Value> {
        let blob = SessionBlob {
            schema_version: SCHEMA_VERSION,
            session_id: self.context.session_id.clone(),
            state: self.context.current_state,
            context: self.context.clone(),
            queues: self.queues.clone(),
            unit_order: self.unit_order.clone(),
        };
        Ok(serde_json::to_value(&blob)?)
    }

    /// Restore a session from a blob produced by `save_state`.
    ///
    /// Only valid on a fresh machine. An unknown `schema_version` fails
    /// with `SchemaMismatch` and the machine stays idle.
    pub fn load_state(&mut self, blob: serde_json::Value) -> Result<()> {
        if self.state() != SessionState::Idle || !self.context.interaction_history.is_empty() {
            return Err(Error::PreconditionFailed(
                "load_state requires a fresh machine".into(),
            ));
        }

        let found = blob
            .get("schema_version")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(0) as u32;
        if found != SCHEMA_VERSION {
            return Err(Error::SchemaMismatch {
                found,
                supported: SCHEMA_VERSION,
            });
        }

        let parsed: SessionBlob = serde_json::from_value(blob)?;
        self.context = parsed.context;
        self.queues = parsed.queues;
        self.unit_order = parsed.unit_order;
        self.active_cancel = None;
        info!(session_id = %self.context.session_id, state = %self.state(), "Session restored");
        Ok(())
    }
}
