//! Read-only projection of session state for callers and UIs.

use roleweave_core::ErrorRecord;
use serde::{Deserialize, Serialize};

use crate::machine::{ConversationStateMachine, SessionState};

/// Dialogue progress figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub current_unit: usize,
    pub total_units: usize,
    pub percent: f64,
}

/// Everything a UI needs to render the session, in one read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSummary {
    pub session_id: String,
    pub state: SessionState,
    pub bot_is_generating: bool,
    pub awaiting_user_input: bool,
    pub progress: Progress,
    pub turn_number: u64,
    pub interruption_count: u32,
    pub history_len: usize,
    pub can_interrupt: bool,
    pub can_resume: bool,
    pub is_complete: bool,

    /// Most recent failure, so callers can render "something went wrong,
    /// retry?" without inspecting error types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<ErrorRecord>,
}

impl ConversationStateMachine {
    /// Build the read-only summary. Never mutates.
    pub fn get_state_summary(&self) -> StateSummary {
        let ctx = self.context();
        let percent = if ctx.total_units > 0 {
            ctx.current_unit_index as f64 / ctx.total_units as f64 * 100.0
        } else {
            0.0
        };

        StateSummary {
            session_id: ctx.session_id.clone(),
            state: ctx.current_state,
            bot_is_generating: ctx.bot_is_generating,
            awaiting_user_input: ctx.awaiting_user_input,
            progress: Progress {
                current_unit: ctx.current_unit_index,
                total_units: ctx.total_units,
                percent,
            },
            turn_number: ctx.turn_number,
            interruption_count: ctx.interruption_count,
            history_len: ctx.interaction_history.len(),
            can_interrupt: ctx.current_state == SessionState::Engaged,
            can_resume: ctx.current_state == SessionState::Interrupted,
            is_complete: ctx.current_state == SessionState::Completed,
            last_error: ctx.last_error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_machine_summary() {
        let machine = ConversationStateMachine::new();
        let summary = machine.get_state_summary();
        assert_eq!(summary.state, SessionState::Idle);
        assert!(!summary.can_interrupt);
        assert!(!summary.can_resume);
        assert!(!summary.is_complete);
        assert_eq!(summary.progress.total_units, 0);
        assert_eq!(summary.progress.percent, 0.0);
        assert!(summary.last_error.is_none());
    }

    #[test]
    fn summary_does_not_mutate() {
        let mut machine = ConversationStateMachine::new();
        machine.initialize(Some("summary-test")).unwrap();
        let before = machine.context().clone();
        let _ = machine.get_state_summary();
        assert_eq!(machine.context(), &before);
    }

    #[test]
    fn summary_serializes_for_uis() {
        let machine = ConversationStateMachine::new();
        let json = serde_json::to_string(&machine.get_state_summary()).unwrap();
        assert!(json.contains("\"state\":\"idle\""));
        assert!(json.contains("\"can_interrupt\":false"));
    }
}
