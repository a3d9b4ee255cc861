//! Dialogue state machine
//!
//! Pure transitions over (state, collected data, event); all I/O is expressed
//! as effects executed by the runtime.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{Effect, Keyboard, Reply, ReplyMenu};
pub use event::{Command, Event, GenerationOutcome};
pub use state::{CollectedData, DialogueState};
pub use transition::{transition, TransitionError};
