//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::event::{CREATE_PRESENTATION, ENTER_QUERY, ENTER_STYLE, GO_BACK};
use super::*;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just(CREATE_PRESENTATION.to_string()),
        Just(ENTER_STYLE.to_string()),
        Just(ENTER_QUERY.to_string()),
        Just(GO_BACK.to_string()),
        Just("/start".to_string()),
        "\\PC{0,40}",
    ]
}

fn arb_input_state() -> impl Strategy<Value = DialogueState> {
    prop_oneof![
        Just(DialogueState::Idle),
        Just(DialogueState::AwaitingStyleChoice),
        Just(DialogueState::AwaitingStyleText),
        Just(DialogueState::AwaitingQueryChoice),
        Just(DialogueState::AwaitingQueryText),
    ]
}

fn arb_data() -> impl Strategy<Value = CollectedData> {
    (
        proptest::option::of("\\PC{0,20}"),
        proptest::option::of("\\PC{0,20}"),
    )
        .prop_map(|(style, query)| CollectedData { style, query })
}

fn arb_outcome() -> impl Strategy<Value = GenerationOutcome> {
    prop_oneof![
        "\\PC{0,30}".prop_map(|url| GenerationOutcome::Ready { url }),
        "\\PC{0,30}".prop_map(|message| GenerationOutcome::Failed { message }),
    ]
}

/// Fold effects into the data, the way the runtime applies them
fn apply_data(data: &CollectedData, effects: &[Effect]) -> CollectedData {
    let mut data = data.clone();
    for effect in effects {
        match effect {
            Effect::UpdateData(partial) => data.merge(partial.clone()),
            Effect::ClearData => data = CollectedData::default(),
            _ => {}
        }
    }
    data
}

proptest! {
    #[test]
    fn back_from_choice_states_resets(
        state in prop_oneof![
            Just(DialogueState::AwaitingStyleChoice),
            Just(DialogueState::AwaitingQueryChoice),
        ],
        data in arb_data(),
    ) {
        let result = transition(&state, &data, Event::user_input(GO_BACK)).unwrap();

        prop_assert_eq!(result.new_state, DialogueState::Idle);
        prop_assert!(apply_data(&data, &result.effects).is_empty());
    }

    #[test]
    fn style_text_is_stored_verbatim(text in arb_text(), data in arb_data()) {
        let result = transition(
            &DialogueState::AwaitingStyleText,
            &data,
            Event::user_input(text.clone()),
        )
        .unwrap();

        prop_assert_eq!(result.new_state, DialogueState::AwaitingQueryChoice);
        prop_assert_eq!(apply_data(&data, &result.effects).style, Some(text));
    }

    #[test]
    fn query_text_is_stored_and_submitted_verbatim(text in arb_text(), data in arb_data()) {
        let result = transition(
            &DialogueState::AwaitingQueryText,
            &data,
            Event::user_input(text.clone()),
        )
        .unwrap();

        prop_assert_eq!(result.new_state, DialogueState::Generating);
        prop_assert_eq!(apply_data(&data, &result.effects).query, Some(text.clone()));

        let requests: Vec<_> = result
            .effects
            .iter()
            .filter_map(|e| match e {
                Effect::RequestGeneration { request } => Some(request),
                _ => None,
            })
            .collect();
        prop_assert_eq!(requests.len(), 1);
        prop_assert_eq!(&requests[0].topic, &text);
    }

    #[test]
    fn generation_always_ends_idle_and_cleared(data in arb_data(), outcome in arb_outcome()) {
        let result = transition(
            &DialogueState::Generating,
            &data,
            Event::GenerationFinished { outcome },
        )
        .unwrap();

        prop_assert_eq!(result.new_state, DialogueState::Idle);
        prop_assert!(apply_data(&data, &result.effects).is_empty());
    }

    #[test]
    fn choice_states_never_leave_on_unknown_text(
        state in prop_oneof![
            Just(DialogueState::AwaitingStyleChoice),
            Just(DialogueState::AwaitingQueryChoice),
        ],
        text in "\\PC{0,40}",
        data in arb_data(),
    ) {
        prop_assume!(Command::parse(&text) == Command::Text);

        let result = transition(&state, &data, Event::user_input(text)).unwrap();

        prop_assert_eq!(result.new_state, state);
        let touched = result.effects.iter().any(|e| matches!(
            e,
            Effect::ClearData | Effect::UpdateData(_) | Effect::RequestGeneration { .. }
        ));
        prop_assert!(!touched, "choice state touched the collected data");
    }

    #[test]
    fn user_input_never_errors_outside_generation(
        state in arb_input_state(),
        data in arb_data(),
        text in arb_text(),
    ) {
        prop_assert!(transition(&state, &data, Event::user_input(text)).is_ok());
    }

    #[test]
    fn only_query_text_starts_generation(
        state in arb_input_state(),
        data in arb_data(),
        text in arb_text(),
    ) {
        let result = transition(&state, &data, Event::user_input(text)).unwrap();
        let requested = result
            .effects
            .iter()
            .any(|e| matches!(e, Effect::RequestGeneration { .. }));

        prop_assert_eq!(requested, state == DialogueState::AwaitingQueryText);
        prop_assert_eq!(result.new_state == DialogueState::Generating, requested);
    }

    /// Drive random input sequences, completing every generation, and check
    /// the conversation never gets stuck in `Generating`
    #[test]
    fn random_sessions_return_to_idle_after_generation(
        inputs in proptest::collection::vec(arb_text(), 1..30),
        outcome in arb_outcome(),
    ) {
        let mut state = DialogueState::Idle;
        let mut data = CollectedData::default();

        for text in inputs {
            let result = transition(&state, &data, Event::user_input(text)).unwrap();
            data = apply_data(&data, &result.effects);
            state = result.new_state;

            if state == DialogueState::Generating {
                let finished = transition(
                    &state,
                    &data,
                    Event::GenerationFinished { outcome: outcome.clone() },
                )
                .unwrap();
                data = apply_data(&data, &finished.effects);
                state = finished.new_state;

                prop_assert_eq!(state, DialogueState::Idle);
                prop_assert!(data.is_empty());
            }

            if state == DialogueState::Idle {
                prop_assert!(data.is_empty());
            }
        }
    }
}
