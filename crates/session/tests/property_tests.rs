//! Property-based tests for the state machine.
//!
//! Random verb sequences against a live machine, checking after every
//! step that the interruption counter matches the history, the unit index
//! never decreases, and the UI flags stay mutually exclusive. Every
//! reachable machine must also survive a serialize/deserialize round trip.

use proptest::collection::vec;
use proptest::prelude::*;
use roleweave_config::{ScoringConfig, StabilityConfig};
use roleweave_core::{AssignmentMode, HistoryEventKind, SectionKind, SemanticUnit};
use roleweave_interrupt::IntentClassifier;
use roleweave_session::ConversationStateMachine;

fn units(n: usize) -> Vec<SemanticUnit> {
    (0..n)
        .map(|i| SemanticUnit {
            id: format!("S0_{i}"),
            title: None,
            text: format!("Unit {i} carries plain body prose with enough words in it."),
            section_kind: SectionKind::Body,
            position: i,
            cohesion: 1.0,
            word_count: 11,
            metadata: serde_json::Map::new(),
        })
        .collect()
}

fn engaged_machine(n: usize) -> ConversationStateMachine {
    let assignment = roleweave_roles::assign(
        &units(n),
        AssignmentMode::Greedy,
        &ScoringConfig::default(),
    )
    .expect("assign");
    let mut machine = ConversationStateMachine::new();
    machine.initialize(Some("prop-session")).expect("initialize");
    machine.load_document(n).expect("load_document");
    machine.attach_assignment(&assignment).expect("attach");
    machine.start_dialogue().expect("start");
    machine
}

/// Apply one verb; rejected verbs are part of the exercise.
fn apply_op(
    machine: &mut ConversationStateMachine,
    op: u8,
    classifier: &IntentClassifier,
    stability: &StabilityConfig,
) {
    match op {
        0 => {
            let _ = machine.start_bot_response();
        }
        1 => {
            let _ = machine.finish_bot_response(Some("a generated turn"));
        }
        2 => {
            let _ = machine.finish_bot_response(None);
        }
        3 => {
            let _ = machine.process_user_message("a perfectly ordinary message");
        }
        4 => {
            let _ = machine.user_clicks_interrupt();
        }
        5 => {
            let _ = machine.process_interruption_message(
                "can you give a concrete example?",
                classifier,
                stability,
            );
        }
        6 => {
            let _ = machine.resume_conversation(false);
        }
        7 => {
            let _ = machine.resume_conversation(true);
        }
        8 => {
            let _ = machine.pause();
        }
        9 => {
            let _ = machine.resume_from_pause();
        }
        _ => {
            let _ = machine.advance_unit();
        }
    }
}

proptest! {
    /// Interruption count equals the number of USER_INTERRUPT events in
    /// history — never the number of times `interrupted` was entered.
    #[test]
    fn interruption_count_matches_history(ops in vec(0u8..11, 0..80)) {
        let classifier = IntentClassifier::new();
        let stability = StabilityConfig::default();
        let mut machine = engaged_machine(6);

        for op in ops {
            apply_op(&mut machine, op, &classifier, &stability);

            let clicks = machine
                .history()
                .iter()
                .filter(|e| e.kind == HistoryEventKind::UserInterrupt)
                .count();
            prop_assert_eq!(machine.context().interruption_count as usize, clicks);
        }
    }

    /// The unit index is monotone and the UI flags stay exclusive under
    /// any verb sequence.
    #[test]
    fn index_monotone_and_flags_exclusive(ops in vec(0u8..11, 0..80)) {
        let classifier = IntentClassifier::new();
        let stability = StabilityConfig::default();
        let mut machine = engaged_machine(6);
        let mut last_index = machine.context().current_unit_index;

        for op in ops {
            apply_op(&mut machine, op, &classifier, &stability);

            let ctx = machine.context();
            prop_assert!(ctx.current_unit_index >= last_index);
            prop_assert!(ctx.current_unit_index < ctx.total_units);
            prop_assert!(!(ctx.bot_is_generating && ctx.awaiting_user_input));
            last_index = ctx.current_unit_index;
        }
    }

    /// Every reachable machine round-trips through its blob unchanged.
    #[test]
    fn reachable_machines_roundtrip(ops in vec(0u8..11, 0..60)) {
        let classifier = IntentClassifier::new();
        let stability = StabilityConfig::default();
        let mut machine = engaged_machine(4);

        for op in ops {
            apply_op(&mut machine, op, &classifier, &stability);
        }

        let blob = machine.save_state().expect("save");
        let mut restored = ConversationStateMachine::new();
        restored.load_state(blob).expect("load");

        prop_assert_eq!(restored.context(), machine.context());
        prop_assert_eq!(restored.get_state_summary(), machine.get_state_summary());
    }

    /// Turn numbers in history never decrease.
    #[test]
    fn history_turns_are_monotone(ops in vec(0u8..11, 0..80)) {
        let classifier = IntentClassifier::new();
        let stability = StabilityConfig::default();
        let mut machine = engaged_machine(5);

        for op in ops {
            apply_op(&mut machine, op, &classifier, &stability);
        }

        let turns: Vec<u64> = machine.history().iter().map(|e| e.turn).collect();
        for pair in turns.windows(2) {
            prop_assert!(pair[0] <= pair[1]);
        }
    }
}
