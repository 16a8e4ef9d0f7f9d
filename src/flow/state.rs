//! Conversation state types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Mood selected during the daily check-in.
///
/// The numeric menu mapping is fixed: 1=calm, 2=stressed, 3=tempted,
/// 4=hopeful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Calm,
    Stressed,
    Tempted,
    Hopeful,
}

impl Mood {
    /// Parse a menu selection. Input must already be trimmed.
    pub fn from_digit(input: &str) -> Option<Self> {
        match input {
            "1" => Some(Mood::Calm),
            "2" => Some(Mood::Stressed),
            "3" => Some(Mood::Tempted),
            "4" => Some(Mood::Hopeful),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Calm => "calm",
            Mood::Stressed => "stressed",
            Mood::Tempted => "tempted",
            Mood::Hopeful => "hopeful",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conversation track: the daily ritual or the crisis repair flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    Daily,
    Repair,
}

impl Flow {
    pub fn as_str(self) -> &'static str {
        match self {
            Flow::Daily => "daily",
            Flow::Repair => "repair",
        }
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position within the active flow's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    MoodPrompt,
    IntentionPrompt,
    IntentionCapture,
    Complete,
    RepairTrigger,
}

/// Per-flow conversation context.
///
/// The variant is the flow: fields that only make sense in one flow are only
/// representable in that flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "flow", rename_all = "snake_case")]
pub enum FlowContext {
    Daily {
        mood: Option<Mood>,
        intention: Option<String>,
    },
    Repair {
        trigger: Option<String>,
    },
}

impl FlowContext {
    /// Fresh daily-ritual context with nothing captured yet.
    pub fn daily() -> Self {
        FlowContext::Daily {
            mood: None,
            intention: None,
        }
    }

    /// Fresh repair context with nothing captured yet.
    pub fn repair() -> Self {
        FlowContext::Repair { trigger: None }
    }

    pub fn mood(&self) -> Option<Mood> {
        match self {
            FlowContext::Daily { mood, .. } => *mood,
            FlowContext::Repair { .. } => None,
        }
    }

    pub fn intention(&self) -> Option<&str> {
        match self {
            FlowContext::Daily { intention, .. } => intention.as_deref(),
            FlowContext::Repair { .. } => None,
        }
    }

    pub fn trigger(&self) -> Option<&str> {
        match self {
            FlowContext::Daily { .. } => None,
            FlowContext::Repair { trigger } => trigger.as_deref(),
        }
    }
}

/// In-memory conversation state for one user.
///
/// Created on first contact, mutated in place as the user progresses, and
/// reset (not removed) when a new input arrives after completion. Never
/// persisted: a restart loses in-flight conversations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    pub user_id: String,
    pub step: Step,
    pub context: FlowContext,
}
