//! Core conversation state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.
//! `transition` takes the current state and one user input and returns the
//! new state, the reply to send, and any effects to execute. All I/O lives
//! in the engine; everything here is deterministic and directly testable.

mod effect;
mod prompts;
pub mod state;
mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use state::{ConversationState, Flow, Mood, Step};
pub use transition::{begin_daily, begin_repair, transition, TransitionResult};
