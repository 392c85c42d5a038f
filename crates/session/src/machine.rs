//! The conversation state machine.
//!
//! Six states, a fixed event alphabet, and an explicit transition table.
//! All session mutation funnels through the verbs here; collaborators and
//! callers never touch the context directly. Errors surface as values —
//! the machine never panics across its boundary.

use std::collections::BTreeMap;

use chrono::Utc;
use roleweave_config::StabilityConfig;
use roleweave_core::{
    Assignment, CancelToken, Error, ErrorRecord, HistoryEvent, InterruptionEvent,
    ReallocationOutcome, Result, Role, RoleQueue,
};
use roleweave_interrupt::{reallocate, IntentClassifier};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::context::ConversationContext;

/// Session states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Ready,
    Engaged,
    Interrupted,
    Paused,
    Completed,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Ready => "ready",
            SessionState::Engaged => "engaged",
            SessionState::Interrupted => "interrupted",
            SessionState::Paused => "paused",
            SessionState::Completed => "completed",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The full event alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionEvent {
    Initialize,
    DocumentLoaded,
    RolesAssigned,
    StartDialogue,
    BotResponseStart,
    BotResponseEnd,
    UserMessage,
    UserInterrupt,
    UserInterruptMessage,
    Resume,
    Pause,
    ResumeFromPause,
    NextUnit,
    Complete,
    Error,
}

impl std::fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionEvent::Initialize => "INITIALIZE",
            SessionEvent::DocumentLoaded => "DOCUMENT_LOADED",
            SessionEvent::RolesAssigned => "ROLES_ASSIGNED",
            SessionEvent::StartDialogue => "START_DIALOGUE",
            SessionEvent::BotResponseStart => "BOT_RESPONSE_START",
            SessionEvent::BotResponseEnd => "BOT_RESPONSE_END",
            SessionEvent::UserMessage => "USER_MESSAGE",
            SessionEvent::UserInterrupt => "USER_INTERRUPT",
            SessionEvent::UserInterruptMessage => "USER_INTERRUPT_MESSAGE",
            SessionEvent::Resume => "RESUME",
            SessionEvent::Pause => "PAUSE",
            SessionEvent::ResumeFromPause => "RESUME_FROM_PAUSE",
            SessionEvent::NextUnit => "NEXT_UNIT",
            SessionEvent::Complete => "COMPLETE",
            SessionEvent::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// The transition table. `None` means the pair is rejected.
fn transition_target(state: SessionState, event: SessionEvent) -> Option<SessionState> {
    use SessionEvent::*;
    use SessionState::*;

    match (state, event) {
        // Setup flow
        (Idle, Initialize) => Some(Idle),
        (Idle, DocumentLoaded) => Some(Ready),
        (Ready, RolesAssigned) => Some(Ready),
        (Ready, StartDialogue) => Some(Engaged),

        // Normal dialogue loop
        (Engaged, BotResponseStart) => Some(Engaged),
        (Engaged, BotResponseEnd) => Some(Engaged),
        (Engaged, UserMessage) => Some(Engaged),
        (Engaged, NextUnit) => Some(Engaged),
        (Engaged, Complete) => Some(Completed),
        (Engaged, Pause) => Some(Paused),

        // Interruption sub-dialogue
        (Engaged, UserInterrupt) => Some(Interrupted),
        (Interrupted, UserInterruptMessage) => Some(Interrupted),
        (Interrupted, BotResponseStart) => Some(Interrupted),
        (Interrupted, BotResponseEnd) => Some(Interrupted),
        (Interrupted, UserMessage) => Some(Interrupted),
        (Interrupted, Resume) => Some(Engaged),

        // Pause
        (Paused, ResumeFromPause) => Some(Engaged),

        // ERROR is accepted anywhere but the terminal state, and does not move
        (Completed, Error) => None,
        (s, Error) => Some(s),

        _ => None,
    }
}

/// Acknowledgement returned by `user_clicks_interrupt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterruptAck {
    pub already_interrupted: bool,
    pub interrupted_at_unit: usize,
    pub message: String,
}

/// What `advance_unit` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceOutcome {
    /// The unit now current (unchanged when the dialogue completed).
    pub unit_index: usize,
    pub completed: bool,
}

/// State machine for interruption-resilient tutoring sessions.
///
/// Owns exactly one `ConversationContext`; per-session serialization is
/// by `&mut self` — one conceptual executor per session.
pub struct ConversationStateMachine {
    pub(crate) context: ConversationContext,
    pub(crate) queues: BTreeMap<String, RoleQueue>,
    pub(crate) unit_order: Vec<String>,
    /// Cancel token for an in-flight generator call. Never persisted.
    pub(crate) active_cancel: Option<CancelToken>,
}

impl ConversationStateMachine {
    /// Fresh machine in `idle` with no session id yet.
    pub fn new() -> Self {
        Self {
            context: ConversationContext::new(String::new()),
            queues: BTreeMap::new(),
            unit_order: Vec::new(),
            active_cancel: None,
        }
    }

    // --- Read access ---

    pub fn state(&self) -> SessionState {
        self.context.current_state
    }

    pub fn context(&self) -> &ConversationContext {
        &self.context
    }

    pub fn session_id(&self) -> &str {
        &self.context.session_id
    }

    pub fn history(&self) -> &[HistoryEvent] {
        &self.context.interaction_history
    }

    pub fn is_generating(&self) -> bool {
        self.context.bot_is_generating
    }

    /// The queue attached to the current unit.
    pub fn current_queue(&self) -> Result<&RoleQueue> {
        let unit_id = self
            .unit_order
            .get(self.context.current_unit_index)
            .ok_or_else(|| {
                Error::PreconditionFailed("no role assignment attached".into())
            })?;
        self.queues
            .get(unit_id)
            .ok_or_else(|| Error::NotFound(format!("no queue for unit {unit_id}")))
    }

    /// The id of the current unit.
    pub fn current_unit_id(&self) -> Option<&str> {
        self.unit_order
            .get(self.context.current_unit_index)
            .map(String::as_str)
    }

    /// The role at the next unused queue position for the current unit.
    pub fn current_role(&self) -> Result<Role> {
        let queue = self.current_queue()?;
        let cursor = self.context.role_cursor.min(4);
        Ok(queue.get(cursor).unwrap_or_else(|| queue.first()))
    }

    // --- Transition plumbing ---

    fn apply(&mut self, event: SessionEvent) -> Result<()> {
        let from = self.context.current_state;
        let Some(to) = transition_target(from, event) else {
            return Err(Error::InvalidTransition {
                state: from.to_string(),
                event: event.to_string(),
            });
        };
        if from != to {
            debug!(session_id = %self.context.session_id, %from, %to, %event, "Transition");
        }
        self.context.current_state = to;
        self.context.last_activity = Some(Utc::now());
        Ok(())
    }

    // --- Session control API ---

    /// Validate construction and stamp the session id.
    pub fn initialize(&mut self, session_id: Option<&str>) -> Result<String> {
        self.apply(SessionEvent::Initialize)?;
        let id = match session_id {
            Some(id) if !id.trim().is_empty() => id.to_string(),
            _ => Uuid::new_v4().to_string(),
        };
        self.context.session_id = id.clone();
        info!(session_id = %id, "Session initialized");
        Ok(id)
    }

    /// Attach a segmented document. Requires at least one unit — a
    /// document the segmenter reduced to nothing is a usage error.
    pub fn load_document(&mut self, total_units: usize) -> Result<()> {
        if total_units == 0 {
            return Err(Error::PreconditionFailed(
                "document yielded zero units".into(),
            ));
        }
        if transition_target(self.state(), SessionEvent::DocumentLoaded).is_none() {
            return Err(self.rejected(SessionEvent::DocumentLoaded));
        }
        self.context.total_units = total_units;
        self.apply(SessionEvent::DocumentLoaded)
    }

    /// Attach the role assignment produced for this document.
    pub fn attach_assignment(&mut self, assignment: &Assignment) -> Result<()> {
        if transition_target(self.state(), SessionEvent::RolesAssigned).is_none() {
            return Err(self.rejected(SessionEvent::RolesAssigned));
        }
        if assignment.len() != self.context.total_units {
            return Err(Error::PreconditionFailed(format!(
                "assignment covers {} units, document has {}",
                assignment.len(),
                self.context.total_units
            )));
        }
        self.unit_order = assignment.unit_order.clone();
        self.queues = assignment
            .units
            .iter()
            .map(|(id, ua)| (id.clone(), ua.queue.clone()))
            .collect();
        self.apply(SessionEvent::RolesAssigned)
    }

    /// Begin the dialogue at unit 0.
    pub fn start_dialogue(&mut self) -> Result<()> {
        if transition_target(self.state(), SessionEvent::StartDialogue).is_none() {
            return Err(self.rejected(SessionEvent::StartDialogue));
        }
        if self.unit_order.is_empty() {
            return Err(Error::PreconditionFailed(
                "no role assignment attached".into(),
            ));
        }
        self.apply(SessionEvent::StartDialogue)?;
        self.context.current_unit_index = 0;
        self.context.role_cursor = 0;
        self.context.started_at = Some(Utc::now());
        info!(session_id = %self.context.session_id, units = self.context.total_units, "Dialogue started");
        Ok(())
    }

    /// The bot starts generating. Returns the cancel token the caller
    /// hands to the generator collaborator; the token is flipped if the
    /// user interrupts while the call is in flight.
    pub fn start_bot_response(&mut self) -> Result<CancelToken> {
        if transition_target(self.state(), SessionEvent::BotResponseStart).is_none() {
            return Err(self.rejected(SessionEvent::BotResponseStart));
        }
        if self.context.bot_is_generating {
            if let Some(token) = &self.active_cancel {
                return Ok(token.clone());
            }
        }
        self.apply(SessionEvent::BotResponseStart)?;
        self.context.bot_is_generating = true;
        self.context.awaiting_user_input = false;
        let token = CancelToken::new();
        self.active_cancel = Some(token.clone());
        Ok(token)
    }

    /// The bot finished generating. With `text`, the turn is appended to
    /// history and attributed to the role at the queue cursor.
    ///
    /// Idempotent: once `bot_is_generating` is false, further calls are
    /// no-ops — this is what drops a stale `BOT_RESPONSE_END` after an
    /// interrupt flipped the flags.
    pub fn finish_bot_response(&mut self, text: Option<&str>) -> Result<()> {
        if transition_target(self.state(), SessionEvent::BotResponseEnd).is_none() {
            return Err(self.rejected(SessionEvent::BotResponseEnd));
        }
        if !self.context.bot_is_generating {
            debug!(
                session_id = %self.context.session_id,
                "finish_bot_response with no response in flight; ignoring"
            );
            return Ok(());
        }

        let role = self.current_role()?;
        self.apply(SessionEvent::BotResponseEnd)?;
        self.context.bot_is_generating = false;
        self.context.awaiting_user_input = true;
        self.active_cancel = None;

        if let Some(text) = text {
            self.context.turn_number += 1;
            self.context
                .interaction_history
                .push(HistoryEvent::bot_turn(self.context.turn_number, role, text));
            *self.context.role_usage_count.entry(role).or_insert(0) += 1;
            self.context.role_cursor += 1;
        }
        Ok(())
    }

    /// A regular user message inside the dialogue loop.
    pub fn process_user_message(&mut self, text: &str) -> Result<()> {
        if self.state() != SessionState::Engaged {
            return Err(self.rejected(SessionEvent::UserMessage));
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::InputInvalid("empty user message".into()));
        }
        self.apply(SessionEvent::UserMessage)?;
        self.context.turn_number += 1;
        self.context
            .interaction_history
            .push(HistoryEvent::user_message(self.context.turn_number, text));
        self.context.awaiting_user_input = false;
        Ok(())
    }

    /// The user pressed the interrupt affordance.
    ///
    /// This is the only path that touches `interrupted_at_index` and
    /// `interruption_count`. Pressing it again while already interrupted
    /// succeeds without re-counting.
    pub fn user_clicks_interrupt(&mut self) -> Result<InterruptAck> {
        if self.state() == SessionState::Interrupted {
            return Ok(InterruptAck {
                already_interrupted: true,
                interrupted_at_unit: self
                    .context
                    .interrupted_at_index
                    .unwrap_or(self.context.current_unit_index),
                message: "already interrupted".into(),
            });
        }
        if transition_target(self.state(), SessionEvent::UserInterrupt).is_none() {
            return Err(self.rejected(SessionEvent::UserInterrupt));
        }

        // Stop any in-flight generation; the late result will be discarded.
        if let Some(token) = self.active_cancel.take() {
            token.cancel();
        }

        let unit_index = self.context.current_unit_index;
        self.apply(SessionEvent::UserInterrupt)?;
        self.context.bot_is_generating = false;
        self.context.awaiting_user_input = true;
        self.context.interrupted_at_index = Some(unit_index);
        self.context.interruption_count += 1;
        self.context
            .interaction_history
            .push(HistoryEvent::user_interrupt(
                self.context.turn_number,
                unit_index,
            ));
        info!(
            session_id = %self.context.session_id,
            interrupt = self.context.interruption_count,
            unit = unit_index,
            "User interrupted"
        );

        Ok(InterruptAck {
            already_interrupted: false,
            interrupted_at_unit: unit_index,
            message: "What's your question?".into(),
        })
    }

    /// The user's interruption question. Records it, classifies intent,
    /// and — when the intent is confident and the bounded-delay window is
    /// open — reorders the current unit's queue. Never calls the
    /// generator.
    pub fn process_interruption_message(
        &mut self,
        text: &str,
        classifier: &IntentClassifier,
        stability: &StabilityConfig,
    ) -> Result<InterruptionEvent> {
        if self.state() != SessionState::Interrupted {
            return Err(self.rejected(SessionEvent::UserInterruptMessage));
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::InputInvalid("empty interruption message".into()));
        }

        self.apply(SessionEvent::UserInterruptMessage)?;
        self.context.turn_number += 1;
        let turn = self.context.turn_number;
        self.context
            .interaction_history
            .push(HistoryEvent::interrupt_message(turn, text));

        let classification = classifier.classify(text);
        let unit_index = self
            .context
            .interrupted_at_index
            .unwrap_or(self.context.current_unit_index);
        let queue_before = self.current_queue()?.clone();

        let (outcome, queue_after) =
            if classification.confidence < stability.reallocation_threshold {
                (ReallocationOutcome::BelowThreshold, queue_before.clone())
            } else if turn < self.context.realloc_frozen_until {
                warn!(
                    session_id = %self.context.session_id,
                    frozen_until = self.context.realloc_frozen_until,
                    turn,
                    "stability_block"
                );
                (ReallocationOutcome::StabilityBlocked, queue_before.clone())
            } else {
                let result = reallocate(
                    &queue_before,
                    classification.intent,
                    &self.context.role_usage_count,
                    &self.context.hysteresis_until,
                    turn,
                )?;
                for role in &result.demoted {
                    self.context
                        .hysteresis_until
                        .insert(*role, turn + stability.hysteresis_window_turns);
                }
                self.context.realloc_frozen_until = turn + stability.transition_delay_turns;
                let unit_id = self
                    .current_unit_id()
                    .ok_or_else(|| Error::NotFound("current unit has no id".into()))?
                    .to_string();
                self.queues.insert(unit_id, result.queue.clone());
                self.context.role_cursor = 0;
                info!(
                    session_id = %self.context.session_id,
                    intent = %classification.intent,
                    "Queue reallocated"
                );
                (ReallocationOutcome::Applied, result.queue)
            };

        Ok(InterruptionEvent {
            turn,
            unit_index_at_interrupt: unit_index,
            raw_text: text.to_string(),
            classified_intent: classification.intent,
            confidence: classification.confidence,
            queue_before,
            queue_after,
            outcome,
        })
    }

    /// Leave the interruption sub-dialogue.
    ///
    /// `from_start = false` continues from the current unit; `true` jumps
    /// back to the unit that was interrupted (idempotent today, kept for
    /// a future per-topic restart).
    pub fn resume_conversation(&mut self, from_start: bool) -> Result<usize> {
        if transition_target(self.state(), SessionEvent::Resume).is_none() {
            return Err(self.rejected(SessionEvent::Resume));
        }
        self.apply(SessionEvent::Resume)?;
        if from_start {
            if let Some(index) = self.context.interrupted_at_index {
                self.context.current_unit_index = index;
            }
        }
        self.context.interrupted_at_index = None;
        info!(
            session_id = %self.context.session_id,
            unit = self.context.current_unit_index,
            "Resumed"
        );
        Ok(self.context.current_unit_index)
    }

    /// Suspend the dialogue (the user left the session).
    pub fn pause(&mut self) -> Result<()> {
        self.apply(SessionEvent::Pause)
    }

    /// Return from an explicit pause.
    pub fn resume_from_pause(&mut self) -> Result<()> {
        self.apply(SessionEvent::ResumeFromPause)
    }

    /// Move to the next unit, completing the dialogue past the last one.
    /// On completion the index keeps naming the last unit covered.
    pub fn advance_unit(&mut self) -> Result<AdvanceOutcome> {
        if transition_target(self.state(), SessionEvent::NextUnit).is_none() {
            return Err(self.rejected(SessionEvent::NextUnit));
        }

        let new_index = self.context.current_unit_index + 1;
        if new_index >= self.context.total_units {
            self.apply(SessionEvent::Complete)?;
            info!(session_id = %self.context.session_id, "Dialogue completed");
            return Ok(AdvanceOutcome {
                unit_index: self.context.current_unit_index,
                completed: true,
            });
        }

        self.apply(SessionEvent::NextUnit)?;
        self.context.current_unit_index = new_index;
        self.context.role_cursor = 0;
        debug!(session_id = %self.context.session_id, unit = new_index, "Advanced unit");
        Ok(AdvanceOutcome {
            unit_index: new_index,
            completed: false,
        })
    }

    /// Record a collaborator failure: flags reverted, no history entry,
    /// the structured record surfaced through the summary. The state does
    /// not move.
    pub fn record_failure(&mut self, err: &Error) {
        warn!(
            session_id = %self.context.session_id,
            code = err.code(),
            error = %err,
            "Recorded failure"
        );
        self.context.last_error = Some(ErrorRecord::from_error(err, self.context.turn_number));
        self.context.bot_is_generating = false;
        self.context.awaiting_user_input = true;
        self.active_cancel = None;
        // ERROR is informational; in the terminal state it is simply dropped
        let _ = self.apply(SessionEvent::Error);
    }

    fn rejected(&self, event: SessionEvent) -> Error {
        Error::InvalidTransition {
            state: self.state().to_string(),
            event: event.to_string(),
        }
    }
}

impl Default for ConversationStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roleweave_config::ScoringConfig;
    use roleweave_core::{AssignmentMode, SectionKind, SemanticUnit};

    fn units(n: usize) -> Vec<SemanticUnit> {
        (0..n)
            .map(|i| SemanticUnit {
                id: format!("S0_{i}"),
                title: None,
                text: format!("Paragraph number {i} with enough words to score sensibly."),
                section_kind: SectionKind::Body,
                position: i,
                cohesion: 1.0,
                word_count: 9,
                metadata: serde_json::Map::new(),
            })
            .collect()
    }

    fn engaged_machine(n: usize) -> ConversationStateMachine {
        let mut machine = ConversationStateMachine::new();
        machine.initialize(Some("test-session")).unwrap();
        machine.load_document(n).unwrap();
        let assignment = roleweave_roles::assign(
            &units(n),
            AssignmentMode::Greedy,
            &ScoringConfig::default(),
        )
        .unwrap();
        machine.attach_assignment(&assignment).unwrap();
        machine.start_dialogue().unwrap();
        machine
    }

    #[test]
    fn setup_flow_reaches_engaged() {
        let machine = engaged_machine(2);
        assert_eq!(machine.state(), SessionState::Engaged);
        assert_eq!(machine.context().current_unit_index, 0);
    }

    #[test]
    fn load_document_rejects_zero_units() {
        let mut machine = ConversationStateMachine::new();
        machine.initialize(None).unwrap();
        let err = machine.load_document(0).unwrap_err();
        assert_eq!(err.code(), "PRECONDITION_FAILED");
        assert_eq!(machine.state(), SessionState::Idle);
    }

    #[test]
    fn start_dialogue_requires_assignment() {
        let mut machine = ConversationStateMachine::new();
        machine.initialize(None).unwrap();
        machine.load_document(2).unwrap();
        let err = machine.start_dialogue().unwrap_err();
        assert_eq!(err.code(), "PRECONDITION_FAILED");
    }

    #[test]
    fn attach_assignment_must_cover_document() {
        let mut machine = ConversationStateMachine::new();
        machine.initialize(None).unwrap();
        machine.load_document(3).unwrap();
        let assignment = roleweave_roles::assign(
            &units(2),
            AssignmentMode::Greedy,
            &ScoringConfig::default(),
        )
        .unwrap();
        let err = machine.attach_assignment(&assignment).unwrap_err();
        assert_eq!(err.code(), "PRECONDITION_FAILED");
    }

    #[test]
    fn invalid_event_is_rejected_without_moving() {
        let mut machine = ConversationStateMachine::new();
        let err = machine.pause().unwrap_err();
        assert_eq!(err.code(), "INVALID_TRANSITION");
        assert_eq!(machine.state(), SessionState::Idle);
    }

    #[test]
    fn bot_response_cycle_flips_flags() {
        let mut machine = engaged_machine(2);
        machine.start_bot_response().unwrap();
        assert!(machine.context().bot_is_generating);
        assert!(!machine.context().awaiting_user_input);

        machine.finish_bot_response(Some("here is the material")).unwrap();
        assert!(!machine.context().bot_is_generating);
        assert!(machine.context().awaiting_user_input);
        assert_eq!(machine.context().turn_number, 1);
        assert_eq!(machine.history().len(), 1);
    }

    #[test]
    fn finish_without_start_is_a_noop() {
        let mut machine = engaged_machine(2);
        machine.finish_bot_response(Some("stale")).unwrap();
        assert_eq!(machine.history().len(), 0);
        assert_eq!(machine.context().turn_number, 0);
    }

    #[test]
    fn repeated_finish_is_idempotent() {
        let mut machine = engaged_machine(2);
        machine.start_bot_response().unwrap();
        machine.finish_bot_response(Some("answer")).unwrap();
        machine.finish_bot_response(Some("retry")).unwrap();
        assert_eq!(machine.history().len(), 1);
        assert_eq!(machine.context().turn_number, 1);
    }

    #[test]
    fn generating_and_awaiting_are_mutually_exclusive() {
        let mut machine = engaged_machine(2);
        machine.start_bot_response().unwrap();
        let ctx = machine.context();
        assert!(!(ctx.bot_is_generating && ctx.awaiting_user_input));
        machine.finish_bot_response(None).unwrap();
        let ctx = machine.context();
        assert!(!(ctx.bot_is_generating && ctx.awaiting_user_input));
    }

    #[test]
    fn user_message_appends_history() {
        let mut machine = engaged_machine(2);
        machine.process_user_message("makes sense").unwrap();
        assert_eq!(machine.history().len(), 1);
        assert_eq!(machine.history()[0].text(), Some("makes sense"));
    }

    #[test]
    fn empty_user_message_is_invalid_input() {
        let mut machine = engaged_machine(2);
        let err = machine.process_user_message("   ").unwrap_err();
        assert_eq!(err.code(), "INPUT_INVALID");
    }

    #[test]
    fn interrupt_records_once() {
        let mut machine = engaged_machine(5);
        for _ in 0..3 {
            machine.advance_unit().unwrap();
        }
        let ack = machine.user_clicks_interrupt().unwrap();
        assert!(!ack.already_interrupted);
        assert_eq!(ack.interrupted_at_unit, 3);
        assert_eq!(machine.state(), SessionState::Interrupted);
        assert_eq!(machine.context().interrupted_at_index, Some(3));
        assert_eq!(machine.context().interruption_count, 1);
    }

    #[test]
    fn bot_answer_during_interruption_does_not_recount() {
        let mut machine = engaged_machine(5);
        for _ in 0..3 {
            machine.advance_unit().unwrap();
        }
        machine.user_clicks_interrupt().unwrap();

        machine.start_bot_response().unwrap();
        machine.finish_bot_response(Some("clarifying answer")).unwrap();

        assert_eq!(machine.context().interrupted_at_index, Some(3));
        assert_eq!(machine.context().interruption_count, 1);
        assert_eq!(machine.state(), SessionState::Interrupted);
    }

    #[test]
    fn repeated_interrupt_click_does_not_recount() {
        let mut machine = engaged_machine(5);
        for _ in 0..3 {
            machine.advance_unit().unwrap();
        }
        machine.user_clicks_interrupt().unwrap();
        let ack = machine.user_clicks_interrupt().unwrap();
        assert!(ack.already_interrupted);
        assert_eq!(ack.message, "already interrupted");
        assert_eq!(machine.context().interruption_count, 1);
    }

    #[test]
    fn resume_clears_interrupt_marker() {
        let mut machine = engaged_machine(5);
        for _ in 0..3 {
            machine.advance_unit().unwrap();
        }
        machine.user_clicks_interrupt().unwrap();
        let unit = machine.resume_conversation(false).unwrap();
        assert_eq!(unit, 3);
        assert_eq!(machine.state(), SessionState::Engaged);
        assert_eq!(machine.context().interrupted_at_index, None);
    }

    #[test]
    fn resume_from_start_returns_to_interrupted_unit() {
        let mut machine = engaged_machine(5);
        machine.advance_unit().unwrap();
        machine.user_clicks_interrupt().unwrap();
        let unit = machine.resume_conversation(true).unwrap();
        assert_eq!(unit, 1);
        assert_eq!(machine.context().current_unit_index, 1);
    }

    #[test]
    fn interrupt_cancels_inflight_generation() {
        let mut machine = engaged_machine(2);
        let token = machine.start_bot_response().unwrap();
        machine.user_clicks_interrupt().unwrap();
        assert!(token.is_cancelled());
        assert!(!machine.context().bot_is_generating);
    }

    #[test]
    fn advance_walks_then_completes() {
        let mut machine = engaged_machine(2);
        let step = machine.advance_unit().unwrap();
        assert!(!step.completed);
        assert_eq!(step.unit_index, 1);

        let done = machine.advance_unit().unwrap();
        assert!(done.completed);
        assert_eq!(done.unit_index, 1);
        assert_eq!(machine.state(), SessionState::Completed);
        assert_eq!(machine.context().current_unit_index, 1);
    }

    #[test]
    fn completed_rejects_further_events() {
        let mut machine = engaged_machine(1);
        machine.advance_unit().unwrap();
        assert_eq!(machine.state(), SessionState::Completed);
        assert!(machine.advance_unit().is_err());
        assert!(machine.process_user_message("hi").is_err());
        assert!(machine.user_clicks_interrupt().is_err());
    }

    #[test]
    fn pause_and_resume_from_pause() {
        let mut machine = engaged_machine(2);
        machine.pause().unwrap();
        assert_eq!(machine.state(), SessionState::Paused);
        assert!(machine.process_user_message("hi").is_err());
        machine.resume_from_pause().unwrap();
        assert_eq!(machine.state(), SessionState::Engaged);
    }

    #[test]
    fn record_failure_keeps_state_and_reverts_flags() {
        let mut machine = engaged_machine(2);
        machine.start_bot_response().unwrap();
        let err = Error::Generator(roleweave_core::GeneratorError::Timeout {
            deadline_secs: 30,
        });
        machine.record_failure(&err);
        assert_eq!(machine.state(), SessionState::Engaged);
        assert!(!machine.context().bot_is_generating);
        assert_eq!(
            machine.context().last_error.as_ref().map(|e| e.code.as_str()),
            Some("GENERATOR_TIMEOUT")
        );
        assert_eq!(machine.history().len(), 0);
    }

    #[test]
    fn role_cursor_walks_the_queue() {
        let mut machine = engaged_machine(2);
        let first = machine.current_role().unwrap();
        machine.start_bot_response().unwrap();
        machine.finish_bot_response(Some("turn one")).unwrap();
        let second = machine.current_role().unwrap();
        assert_ne!(first, second);
        let queue = machine.current_queue().unwrap();
        assert_eq!(queue.get(1), Some(second));
    }

    #[test]
    fn cursor_resets_on_advance() {
        let mut machine = engaged_machine(2);
        machine.start_bot_response().unwrap();
        machine.finish_bot_response(Some("turn one")).unwrap();
        machine.advance_unit().unwrap();
        assert_eq!(machine.context().role_cursor, 0);
    }

    #[test]
    fn turn_numbers_are_monotone() {
        let mut machine = engaged_machine(3);
        machine.start_bot_response().unwrap();
        machine.finish_bot_response(Some("one")).unwrap();
        machine.process_user_message("two").unwrap();
        machine.user_clicks_interrupt().unwrap();
        machine.start_bot_response().unwrap();
        machine.finish_bot_response(Some("three")).unwrap();

        let turns: Vec<u64> = machine.history().iter().map(|e| e.turn).collect();
        for pair in turns.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
    }
}
