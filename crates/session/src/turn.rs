//! Turn driver — produces bot turns through the generator collaborator.
//!
//! Resolves the role at the queue cursor, assembles the prompt, runs the
//! generator under a deadline, and feeds the result back through the
//! state machine. An interrupt that lands while the call is in flight
//! cancels cooperatively; a response that arrives anyway is discarded.

use std::sync::Arc;
use std::time::Duration;

use roleweave_config::GeneratorConfig;
use roleweave_core::{
    Error, GenerateRequest, Generator, GeneratorError, HistoryEvent, HistoryEventKind, Result,
    Role, SemanticUnit,
};
use roleweave_roles::catalog;
use tracing::{debug, warn};

use crate::machine::ConversationStateMachine;

/// What a driven turn produced.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// The generator answered and the turn was appended to history.
    Completed { role: Role, text: String },
    /// The user interrupted mid-call; the late response was dropped.
    Discarded,
}

/// Drives generator calls for one session at a time.
pub struct TurnDriver {
    generator: Arc<dyn Generator>,
    timeout: Duration,
    context_window: usize,
}

impl TurnDriver {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        let defaults = GeneratorConfig::default();
        Self {
            generator,
            timeout: Duration::from_secs(defaults.timeout_secs),
            context_window: defaults.context_window_turns,
        }
    }

    pub fn with_config(mut self, config: &GeneratorConfig) -> Self {
        self.timeout = Duration::from_secs(config.timeout_secs);
        self.context_window = config.context_window_turns;
        self
    }

    /// Generate the next bot turn for the current unit.
    ///
    /// On generator failure the machine keeps its state, flags are
    /// reverted, nothing is appended to history, and the typed error is
    /// returned for the caller to retry or surface.
    pub async fn drive_bot_turn(
        &self,
        machine: &mut ConversationStateMachine,
        unit: &SemanticUnit,
    ) -> Result<TurnOutcome> {
        let role = machine.current_role()?;
        let profile = catalog::profile(role);
        let prompt = build_prompt(profile.system_prompt, machine.history(), unit, self.context_window);

        let cancel = machine.start_bot_response()?;
        let request = GenerateRequest {
            prompt,
            temperature: profile.temperature,
            max_tokens: profile.max_tokens,
            cancel: cancel.clone(),
        };

        debug!(session_id = %machine.session_id(), %role, unit = %unit.id, "Generating bot turn");

        let response = match tokio::time::timeout(self.timeout, self.generator.generate(request))
            .await
        {
            Err(_elapsed) => {
                cancel.cancel();
                let err = Error::Generator(GeneratorError::Timeout {
                    deadline_secs: self.timeout.as_secs(),
                });
                machine.record_failure(&err);
                return Err(err);
            }
            Ok(Err(backend_err)) => {
                let err = Error::Generator(backend_err);
                machine.record_failure(&err);
                return Err(err);
            }
            Ok(Ok(response)) => response,
        };

        // The user may have interrupted while the call was in flight; the
        // state transition already happened, so the late result is stale.
        if cancel.is_cancelled() || !machine.is_generating() {
            warn!(session_id = %machine.session_id(), "stale_generator_response");
            return Ok(TurnOutcome::Discarded);
        }

        machine.finish_bot_response(Some(&response.text))?;
        Ok(TurnOutcome::Completed {
            role,
            text: response.text,
        })
    }
}

/// Assemble the prompt: role template, the last N history turns rendered
/// as `[speaker]: text`, then the current unit's content.
fn build_prompt(
    system_prompt: &str,
    history: &[HistoryEvent],
    unit: &SemanticUnit,
    context_window: usize,
) -> String {
    let mut lines: Vec<String> = history
        .iter()
        .filter_map(render_history_line)
        .collect();
    if lines.len() > context_window {
        lines.drain(..lines.len() - context_window);
    }

    let mut prompt = String::from(system_prompt);
    prompt.push_str("\n\n");
    prompt.push_str(&lines.join("\n"));
    prompt.push_str("\n\nCurrent unit:\n");
    prompt.push_str(&unit.text);
    prompt
}

fn render_history_line(event: &HistoryEvent) -> Option<String> {
    let text = event.text()?;
    let speaker = match event.kind {
        HistoryEventKind::BotTurn => event.role_name().unwrap_or("Bot"),
        HistoryEventKind::UserMessage | HistoryEventKind::InterruptMessage => "User",
        HistoryEventKind::UserInterrupt => return None,
    };
    Some(format!("[{speaker}]: {text}"))
}
