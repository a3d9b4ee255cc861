//! Dialogue state types

use serde::{Deserialize, Serialize};

/// Where a conversation currently is in the presentation dialogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DialogueState {
    /// No active flow (initial and terminal state)
    #[default]
    Idle,

    /// Style menu shown, waiting for "enter style" or "go back"
    AwaitingStyleChoice,

    /// Waiting for the free-text style
    AwaitingStyleText,

    /// Query menu shown, waiting for "enter query" or "go back"
    AwaitingQueryChoice,

    /// Waiting for the free-text query
    AwaitingQueryText,

    /// Query accepted, generation job in flight. Only left through
    /// `Event::GenerationFinished`.
    Generating,
}

impl DialogueState {
    /// Stable name used in logs
    pub fn name(self) -> &'static str {
        match self {
            DialogueState::Idle => "idle",
            DialogueState::AwaitingStyleChoice => "awaiting_style_choice",
            DialogueState::AwaitingStyleText => "awaiting_style_text",
            DialogueState::AwaitingQueryChoice => "awaiting_query_choice",
            DialogueState::AwaitingQueryText => "awaiting_query_text",
            DialogueState::Generating => "generating",
        }
    }
}

/// Parameters collected so far. Also used as a partial update, where only
/// the `Some` fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl CollectedData {
    pub fn with_style(style: impl Into<String>) -> Self {
        Self {
            style: Some(style.into()),
            query: None,
        }
    }

    pub fn with_query(query: impl Into<String>) -> Self {
        Self {
            style: None,
            query: Some(query.into()),
        }
    }

    /// Apply the fields set in `partial`, keeping the rest
    pub fn merge(&mut self, partial: CollectedData) {
        if let Some(style) = partial.style {
            self.style = Some(style);
        }
        if let Some(query) = partial.query {
            self.query = Some(query);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.style.is_none() && self.query.is_none()
    }
}
