//! Property-based tests for conversation flow invariants
//!
//! Unit tests in `transition.rs` pin down the copy and the happy paths; these
//! check the shape of the machine under arbitrary input.

use super::effect::Effect;
use super::state::{ConversationState, FlowContext, Mood, Step};
use super::transition::{begin_daily, transition};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn arb_mood() -> impl Strategy<Value = Mood> {
    prop_oneof![
        Just(Mood::Calm),
        Just(Mood::Stressed),
        Just(Mood::Tempted),
        Just(Mood::Hopeful),
    ]
}

fn arb_whitespace() -> impl Strategy<Value = String> {
    "[ \t]{0,4}"
}

/// Printable input that does not trim to a valid mood digit.
fn arb_invalid_mood_input() -> impl Strategy<Value = String> {
    "[ -~]{0,16}".prop_filter("must not be a mood digit", |s| {
        !matches!(s.trim(), "1" | "2" | "3" | "4")
    })
}

/// Printable input with at least one non-whitespace character.
fn arb_free_text() -> impl Strategy<Value = String> {
    "[ -~]{1,40}".prop_filter("must not trim to empty", |s| !s.trim().is_empty())
}

fn arb_any_input() -> impl Strategy<Value = String> {
    "[ -~]{0,24}"
}

/// A word with its ASCII casing scrambled.
fn arb_cased(word: &'static str) -> impl Strategy<Value = String> {
    proptest::collection::vec(any::<bool>(), word.len()).prop_map(move |flips| {
        word.chars()
            .zip(flips)
            .map(|(c, upper)| {
                if upper {
                    c.to_ascii_uppercase()
                } else {
                    c.to_ascii_lowercase()
                }
            })
            .collect()
    })
}

/// Any reachable conversation state, built directly.
fn arb_state() -> impl Strategy<Value = ConversationState> {
    prop_oneof![
        Just((Step::MoodPrompt, FlowContext::daily())),
        arb_mood().prop_map(|mood| {
            (
                Step::IntentionPrompt,
                FlowContext::Daily {
                    mood: Some(mood),
                    intention: None,
                },
            )
        }),
        arb_mood().prop_map(|mood| {
            (
                Step::IntentionCapture,
                FlowContext::Daily {
                    mood: Some(mood),
                    intention: None,
                },
            )
        }),
        (arb_mood(), proptest::option::of(arb_free_text())).prop_map(|(mood, intention)| {
            (
                Step::Complete,
                FlowContext::Daily {
                    mood: Some(mood),
                    intention,
                },
            )
        }),
        Just((Step::RepairTrigger, FlowContext::repair())),
        arb_free_text().prop_map(|trigger| {
            (
                Step::Complete,
                FlowContext::Repair {
                    trigger: Some(trigger),
                },
            )
        }),
    ]
    .prop_map(|(step, context)| ConversationState {
        user_id: "prop-user".to_string(),
        step,
        context,
    })
}

/// A state in either flow that has just completed.
fn arb_complete_state() -> impl Strategy<Value = ConversationState> {
    prop_oneof![
        (arb_mood(), proptest::option::of(arb_free_text())).prop_map(|(mood, intention)| {
            FlowContext::Daily {
                mood: Some(mood),
                intention,
            }
        }),
        arb_free_text().prop_map(|trigger| FlowContext::Repair {
            trigger: Some(trigger),
        }),
    ]
    .prop_map(|context| ConversationState {
        user_id: "prop-user".to_string(),
        step: Step::Complete,
        context,
    })
}

/// Step and context must agree: daily steps carry daily context, the repair
/// question carries repair context, and captured fields only appear once the
/// machine has passed the step that captures them.
fn has_valid_shape(state: &ConversationState) -> bool {
    match (state.step, &state.context) {
        (Step::MoodPrompt, FlowContext::Daily { mood, intention }) => {
            mood.is_none() && intention.is_none()
        }
        (Step::IntentionPrompt | Step::IntentionCapture, FlowContext::Daily { mood, intention }) => {
            mood.is_some() && intention.is_none()
        }
        (Step::Complete, FlowContext::Daily { .. }) => true,
        (Step::RepairTrigger, FlowContext::Repair { trigger }) => trigger.is_none(),
        (Step::Complete, FlowContext::Repair { trigger }) => trigger.is_some(),
        _ => false,
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// A mood digit is accepted regardless of surrounding whitespace, and the
    /// stored mood matches the menu mapping.
    #[test]
    fn prop_mood_digit_ignores_whitespace(
        mood in arb_mood(),
        left in arb_whitespace(),
        right in arb_whitespace(),
    ) {
        let digit = match mood {
            Mood::Calm => "1",
            Mood::Stressed => "2",
            Mood::Tempted => "3",
            Mood::Hopeful => "4",
        };
        let input = format!("{left}{digit}{right}");
        let result = transition(&begin_daily("prop-user").state, &input);
        prop_assert_eq!(result.state.step, Step::IntentionPrompt);
        prop_assert_eq!(result.state.context.mood(), Some(mood));
    }

    /// Invalid mood input leaves the state untouched and the re-prompt echoes
    /// what the user sent.
    #[test]
    fn prop_invalid_mood_is_echoed(input in arb_invalid_mood_input()) {
        let state = begin_daily("prop-user").state;
        let result = transition(&state, &input);
        prop_assert_eq!(&result.state, &state);
        prop_assert!(result.reply.contains(input.trim()));
        prop_assert!(result.effects.is_empty());
    }

    /// The yes/no answer is case-insensitive in both directions.
    #[test]
    fn prop_yes_no_any_casing(
        yes in arb_cased("yes"),
        no in arb_cased("no"),
        mood in arb_mood(),
    ) {
        let state = ConversationState {
            user_id: "prop-user".to_string(),
            step: Step::IntentionPrompt,
            context: FlowContext::Daily { mood: Some(mood), intention: None },
        };
        let accepted = transition(&state, &yes);
        prop_assert_eq!(accepted.state.step, Step::IntentionCapture);
        let declined = transition(&state, &no);
        prop_assert_eq!(declined.state.step, Step::Complete);
        prop_assert_eq!(declined.effects.len(), 1);
    }

    /// A captured intention is stored trimmed but otherwise verbatim, and the
    /// save effect carries the same text.
    #[test]
    fn prop_intention_stored_verbatim(text in arb_free_text(), mood in arb_mood()) {
        let state = ConversationState {
            user_id: "prop-user".to_string(),
            step: Step::IntentionCapture,
            context: FlowContext::Daily { mood: Some(mood), intention: None },
        };
        let result = transition(&state, &text);
        prop_assert_eq!(result.state.step, Step::Complete);
        prop_assert_eq!(result.state.context.intention(), Some(text.trim()));
        match result.effects.as_slice() {
            [Effect::SaveSession { intention: Some(saved), .. }] => {
                prop_assert_eq!(saved.as_str(), text.trim());
            }
            other => prop_assert!(false, "unexpected effects {other:?}"),
        }
    }

    /// Any input after completion starts a fresh daily check-in with empty
    /// context, no matter which flow just finished.
    #[test]
    fn prop_complete_always_resets(state in arb_complete_state(), input in arb_any_input()) {
        let result = transition(&state, &input);
        prop_assert_eq!(result.state.step, Step::MoodPrompt);
        prop_assert_eq!(&result.state.context, &FlowContext::daily());
        prop_assert!(result.effects.is_empty());
    }

    /// Transitions never produce a nonsense state, never change the user, and
    /// always have something to say.
    #[test]
    fn prop_transitions_preserve_shape(state in arb_state(), input in arb_any_input()) {
        let result = transition(&state, &input);
        prop_assert!(has_valid_shape(&result.state), "bad shape: {:?}", result.state);
        prop_assert_eq!(&result.state.user_id, &state.user_id);
        prop_assert!(!result.reply.is_empty());
    }

    /// A save effect is emitted exactly when a transition lands on Complete
    /// from somewhere else. Driving arbitrary scripts from first contact, the
    /// number of saves equals the number of completions.
    #[test]
    fn prop_save_iff_newly_complete(script in proptest::collection::vec(arb_any_input(), 1..24)) {
        let mut state = begin_daily("prop-user").state;
        for input in &script {
            let was_complete = state.step == Step::Complete;
            let result = transition(&state, input);
            let newly_complete = !was_complete && result.state.step == Step::Complete;
            prop_assert_eq!(
                result.effects.len(),
                usize::from(newly_complete),
                "state {:?} input {:?}",
                state,
                input
            );
            state = result.state;
        }
    }
}
