//! Session history events and interruption records.
//!
//! The interaction history is append-only and totally ordered per session;
//! `turn` numbers are monotone (non-decreasing — an interrupt click is
//! recorded at the turn it lands in).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::intent::Intent;
use crate::role::{Role, RoleQueue};

/// What a history event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryEventKind {
    UserMessage,
    BotTurn,
    UserInterrupt,
    InterruptMessage,
}

/// One entry in the per-session interaction history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEvent {
    pub turn: u64,
    pub timestamp: DateTime<Utc>,
    pub kind: HistoryEventKind,

    /// Event-specific fields (`text`, `role`, `unit_index`, ...).
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

impl HistoryEvent {
    fn new(turn: u64, kind: HistoryEventKind) -> Self {
        Self {
            turn,
            timestamp: Utc::now(),
            kind,
            payload: serde_json::Map::new(),
        }
    }

    pub fn user_message(turn: u64, text: &str) -> Self {
        let mut event = Self::new(turn, HistoryEventKind::UserMessage);
        event.payload.insert("text".into(), text.into());
        event
    }

    pub fn bot_turn(turn: u64, role: Role, text: &str) -> Self {
        let mut event = Self::new(turn, HistoryEventKind::BotTurn);
        event.payload.insert("role".into(), role.name().into());
        event.payload.insert("text".into(), text.into());
        event
    }

    pub fn user_interrupt(turn: u64, unit_index: usize) -> Self {
        let mut event = Self::new(turn, HistoryEventKind::UserInterrupt);
        event
            .payload
            .insert("unit_index".into(), serde_json::json!(unit_index));
        event
    }

    pub fn interrupt_message(turn: u64, text: &str) -> Self {
        let mut event = Self::new(turn, HistoryEventKind::InterruptMessage);
        event.payload.insert("text".into(), text.into());
        event
    }

    /// The message text, for events that carry one.
    pub fn text(&self) -> Option<&str> {
        self.payload.get("text").and_then(|v| v.as_str())
    }

    /// The speaking role name, for bot turns.
    pub fn role_name(&self) -> Option<&str> {
        self.payload.get("role").and_then(|v| v.as_str())
    }
}

/// What happened to the queue when an interruption message was processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReallocationOutcome {
    /// The queue was reordered for the detected intent.
    Applied,
    /// Reallocation refused inside the bounded-delay window.
    StabilityBlocked,
    /// Intent confidence did not clear the reallocation threshold.
    BelowThreshold,
}

/// Full record of one processed interruption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterruptionEvent {
    pub turn: u64,
    pub unit_index_at_interrupt: usize,
    pub raw_text: String,
    pub classified_intent: Intent,
    pub confidence: f64,
    pub queue_before: RoleQueue,
    pub queue_after: RoleQueue,
    pub outcome: ReallocationOutcome,
}

/// Structured error record surfaced through the state summary so callers
/// can render failures without inspecting error types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Stable code (e.g. "GENERATOR_TIMEOUT").
    pub code: String,
    pub message: String,
    pub turn: u64,
    pub timestamp: DateTime<Utc>,
}

impl ErrorRecord {
    pub fn from_error(err: &crate::error::Error, turn: u64) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            turn,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bot_turn_carries_role_and_text() {
        let event = HistoryEvent::bot_turn(3, Role::Explainer, "A closure captures its scope.");
        assert_eq!(event.kind, HistoryEventKind::BotTurn);
        assert_eq!(event.role_name(), Some("Explainer"));
        assert_eq!(event.text(), Some("A closure captures its scope."));
    }

    #[test]
    fn interrupt_click_has_no_text() {
        let event = HistoryEvent::user_interrupt(5, 2);
        assert_eq!(event.text(), None);
        assert_eq!(event.payload.get("unit_index"), Some(&serde_json::json!(2)));
    }

    #[test]
    fn history_event_roundtrip() {
        let event = HistoryEvent::user_message(1, "ok");
        let json = serde_json::to_string(&event).unwrap();
        let back: HistoryEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn error_record_uses_stable_code() {
        let err = crate::error::Error::InputInvalid("empty message".into());
        let record = ErrorRecord::from_error(&err, 4);
        assert_eq!(record.code, "INPUT_INVALID");
        assert_eq!(record.turn, 4);
        assert!(record.message.contains("empty message"));
    }
}
