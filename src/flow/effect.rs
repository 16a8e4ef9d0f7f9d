//! Effects produced by flow transitions

use super::state::{Flow, Mood};

/// Side effects requested by a transition, executed by the engine.
///
/// The transition function itself never touches storage; completing a flow
/// emits a `SaveSession` effect carrying everything the engine needs to
/// persist it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Persist a completed flow as a session and backfill message links.
    SaveSession {
        flow: Flow,
        mood: Option<Mood>,
        intention: Option<String>,
        trigger: Option<String>,
    },
}
