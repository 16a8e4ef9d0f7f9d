//! Pure transition function for the conversation state machine

use super::effect::Effect;
use super::prompts;
use super::state::{ConversationState, Flow, FlowContext, Mood, Step};

/// Result of applying one input to a conversation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    pub state: ConversationState,
    pub reply: String,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    fn new(state: ConversationState, reply: impl Into<String>) -> Self {
        Self {
            state,
            reply: reply.into(),
            effects: Vec::new(),
        }
    }

    fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Start a fresh daily check-in for a user with no live conversation.
pub fn begin_daily(user_id: &str) -> TransitionResult {
    TransitionResult::new(
        ConversationState {
            user_id: user_id.to_string(),
            step: Step::MoodPrompt,
            context: FlowContext::daily(),
        },
        prompts::welcome(),
    )
}

/// Enter the crisis repair flow, replacing whatever conversation was live.
pub fn begin_repair(user_id: &str) -> TransitionResult {
    TransitionResult::new(
        ConversationState {
            user_id: user_id.to_string(),
            step: Step::RepairTrigger,
            context: FlowContext::repair(),
        },
        prompts::REPAIR_OPENING,
    )
}

/// Apply one user input to a conversation state.
///
/// Pure function: no I/O, no clock, no randomness. Input is trimmed once
/// here; every step sees the trimmed form. Unrecognized input never dead-ends
/// a conversation, it re-prompts in place.
pub fn transition(state: &ConversationState, input: &str) -> TransitionResult {
    let input = input.trim();
    match state.step {
        Step::MoodPrompt => on_mood_prompt(state, input),
        Step::IntentionPrompt => on_intention_prompt(state, input),
        Step::IntentionCapture => on_intention_capture(state, input),
        Step::RepairTrigger => on_repair_trigger(state, input),
        // Any input after completion starts the next day's check-in. The
        // prior session is already persisted, so nothing is lost.
        Step::Complete => begin_daily(&state.user_id),
    }
}

fn on_mood_prompt(state: &ConversationState, input: &str) -> TransitionResult {
    match Mood::from_digit(input) {
        Some(mood) => TransitionResult::new(
            ConversationState {
                user_id: state.user_id.clone(),
                step: Step::IntentionPrompt,
                context: FlowContext::Daily {
                    mood: Some(mood),
                    intention: None,
                },
            },
            prompts::intention_offer(mood),
        ),
        None => TransitionResult::new(state.clone(), prompts::invalid_mood(input)),
    }
}

fn on_intention_prompt(state: &ConversationState, input: &str) -> TransitionResult {
    if input.eq_ignore_ascii_case("yes") {
        TransitionResult::new(
            ConversationState {
                user_id: state.user_id.clone(),
                step: Step::IntentionCapture,
                context: state.context.clone(),
            },
            prompts::INTENTION_REQUEST,
        )
    } else if input.eq_ignore_ascii_case("no") {
        complete_daily(state, None)
    } else {
        TransitionResult::new(state.clone(), prompts::YES_NO_REPROMPT)
    }
}

fn on_intention_capture(state: &ConversationState, input: &str) -> TransitionResult {
    if input.is_empty() {
        TransitionResult::new(state.clone(), prompts::EMPTY_INTENTION_REPROMPT)
    } else {
        complete_daily(state, Some(input.to_string()))
    }
}

fn on_repair_trigger(state: &ConversationState, input: &str) -> TransitionResult {
    if input.is_empty() {
        return TransitionResult::new(state.clone(), prompts::REPAIR_EMPTY_REPROMPT);
    }
    let trigger = input.to_string();
    TransitionResult::new(
        ConversationState {
            user_id: state.user_id.clone(),
            step: Step::Complete,
            context: FlowContext::Repair {
                trigger: Some(trigger.clone()),
            },
        },
        prompts::REPAIR_COMPLETION,
    )
    .with_effect(Effect::SaveSession {
        flow: Flow::Repair,
        mood: None,
        intention: None,
        trigger: Some(trigger),
    })
}

fn complete_daily(state: &ConversationState, intention: Option<String>) -> TransitionResult {
    let mood = state.context.mood();
    TransitionResult::new(
        ConversationState {
            user_id: state.user_id.clone(),
            step: Step::Complete,
            context: FlowContext::Daily {
                mood,
                intention: intention.clone(),
            },
        },
        prompts::DAILY_COMPLETION,
    )
    .with_effect(Effect::SaveSession {
        flow: Flow::Daily,
        mood,
        intention,
        trigger: None,
    })
}
