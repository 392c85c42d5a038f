//! Per-session mutable state.
//!
//! One `ConversationContext` exists per session and is owned exclusively
//! by its state machine; everything else sees read-only projections or
//! the serialized blob.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use roleweave_core::{ErrorRecord, HistoryEvent, Role};
use serde::{Deserialize, Serialize};

use crate::machine::SessionState;

/// All conversation state data for one session.
///
/// Invariants maintained by the state machine:
/// - `current_unit_index < total_units` outside `Completed`
/// - `interruption_count` counts USER_INTERRUPT events, nothing else
/// - `bot_is_generating` and `awaiting_user_input` are never both true
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    pub session_id: String,
    pub current_state: SessionState,

    // Progress
    pub current_unit_index: usize,
    pub total_units: usize,

    // UI indicators
    pub bot_is_generating: bool,
    pub awaiting_user_input: bool,

    // Interruption tracking
    #[serde(default)]
    pub interrupted_at_index: Option<usize>,
    pub interruption_count: u32,

    // History
    pub interaction_history: Vec<HistoryEvent>,
    pub turn_number: u64,

    // Queue bookkeeping
    pub role_usage_count: BTreeMap<Role, u32>,
    pub hysteresis_until: BTreeMap<Role, u64>,

    /// Next unused position in the current unit's queue.
    pub role_cursor: usize,

    /// Turn number until which reallocation is refused (bounded delay).
    pub realloc_frozen_until: u64,

    /// Most recent failure, surfaced through the state summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<ErrorRecord>,

    // Metadata
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub session_metadata: serde_json::Map<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<DateTime<Utc>>,
}

impl ConversationContext {
    pub fn new(session_id: String) -> Self {
        Self {
            session_id,
            current_state: SessionState::Idle,
            current_unit_index: 0,
            total_units: 0,
            bot_is_generating: false,
            awaiting_user_input: false,
            interrupted_at_index: None,
            interruption_count: 0,
            interaction_history: Vec::new(),
            turn_number: 0,
            role_usage_count: BTreeMap::new(),
            hysteresis_until: BTreeMap::new(),
            role_cursor: 0,
            realloc_frozen_until: 0,
            last_error: None,
            session_metadata: serde_json::Map::new(),
            started_at: None,
            last_activity: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_context_is_idle_and_clean() {
        let ctx = ConversationContext::new("sess-1".into());
        assert_eq!(ctx.current_state, SessionState::Idle);
        assert_eq!(ctx.interrupted_at_index, None);
        assert_eq!(ctx.interruption_count, 0);
        assert!(!ctx.bot_is_generating);
        assert!(ctx.interaction_history.is_empty());
    }

    #[test]
    fn context_roundtrips_through_json() {
        let mut ctx = ConversationContext::new("sess-2".into());
        ctx.turn_number = 4;
        ctx.role_usage_count.insert(Role::Explainer, 2);
        ctx.hysteresis_until.insert(Role::Challenger, 11);
        ctx.interaction_history
            .push(HistoryEvent::user_message(1, "hello"));

        let json = serde_json::to_string(&ctx).unwrap();
        let back: ConversationContext = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ctx);
    }
}
