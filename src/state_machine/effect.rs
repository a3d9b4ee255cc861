//! Effects produced by state transitions

use super::event::{CREATE_PRESENTATION, ENTER_QUERY, ENTER_STYLE, GO_BACK};
use super::state::CollectedData;
use crate::generator::GenerationRequest;

/// Reply keyboard: ordered rows of button labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyMenu {
    pub rows: Vec<Vec<String>>,
    /// Hide the keyboard after one press
    pub one_time: bool,
}

impl ReplyMenu {
    fn single_row(labels: &[&str], one_time: bool) -> Self {
        Self {
            rows: vec![labels.iter().map(|label| (*label).to_string()).collect()],
            one_time,
        }
    }

    pub fn main() -> Self {
        Self::single_row(&[CREATE_PRESENTATION], false)
    }

    pub fn style() -> Self {
        Self::single_row(&[ENTER_STYLE, GO_BACK], true)
    }

    pub fn query() -> Self {
        Self::single_row(&[ENTER_QUERY, GO_BACK], true)
    }
}

/// Keyboard attached to an outbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    Menu(ReplyMenu),
    /// Ask the client to open the reply box for free-text input
    ForceReply,
}

/// Outbound message for the conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_menu(text: impl Into<String>, menu: ReplyMenu) -> Self {
        Self {
            text: text.into(),
            keyboard: Some(Keyboard::Menu(menu)),
        }
    }

    pub fn force_reply(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: Some(Keyboard::ForceReply),
        }
    }
}

/// Effects to be executed after a state transition, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send a message to the user
    Reply(Reply),

    /// Merge fields into the collected data
    UpdateData(CollectedData),

    /// Drop the collected data
    ClearData,

    /// Persist the new state
    PersistState,

    /// Run a generation job; completion comes back as `Event::GenerationFinished`
    RequestGeneration { request: GenerationRequest },
}

impl Effect {
    pub fn reply(text: impl Into<String>) -> Self {
        Effect::Reply(Reply::text(text))
    }

    pub fn reply_with_menu(text: impl Into<String>, menu: ReplyMenu) -> Self {
        Effect::Reply(Reply::with_menu(text, menu))
    }

    pub fn prompt(text: impl Into<String>) -> Self {
        Effect::Reply(Reply::force_reply(text))
    }
}
