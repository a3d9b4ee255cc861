//! Conversation runtime executor

use super::traits::{Messenger, PresentationGenerator, StateStore};
use super::Registry;
use crate::state_machine::{
    transition, DialogueState, Effect, Event, GenerationOutcome, TransitionError,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Runs one conversation: drains its inbound events in order, so a
/// conversation never handles a new input while a generation is in flight.
pub struct ConversationRuntime<S, M, G>
where
    S: StateStore + 'static,
    M: Messenger + 'static,
    G: PresentationGenerator + 'static,
{
    conversation_id: String,
    store: Arc<S>,
    messenger: Arc<M>,
    generator: Arc<G>,
    event_rx: mpsc::Receiver<Event>,
    /// Stops the event loop and any running generation
    cancel: CancellationToken,
    /// When set, the runtime removes itself once the conversation is idle
    registry: Option<Registry>,
}

impl<S, M, G> ConversationRuntime<S, M, G>
where
    S: StateStore + 'static,
    M: Messenger + 'static,
    G: PresentationGenerator + 'static,
{
    pub fn new(
        conversation_id: impl Into<String>,
        store: Arc<S>,
        messenger: Arc<M>,
        generator: Arc<G>,
        event_rx: mpsc::Receiver<Event>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            store,
            messenger,
            generator,
            event_rx,
            cancel,
            registry: None,
        }
    }

    pub(super) fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub async fn run(mut self) {
        tracing::info!(conv_id = %self.conversation_id, "Starting conversation runtime");

        loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                event = self.event_rx.recv() => {
                    let Some(event) = event else { break };
                    match self.handle_event(event).await {
                        Ok(DialogueState::Idle) => {
                            if self.release_if_idle().await {
                                break;
                            }
                        }
                        Ok(_) => {}
                        Err(e) => tracing::error!(
                            conv_id = %self.conversation_id,
                            error = %e,
                            "Error handling event"
                        ),
                    }
                }
            }
        }

        tracing::info!(conv_id = %self.conversation_id, "Conversation runtime stopped");
    }

    /// Leave the registry if nothing is queued. Dispatch sends while holding
    /// the registry lock, so once the write lock is held the queue cannot
    /// grow behind our back.
    async fn release_if_idle(&mut self) -> bool {
        let Some(registry) = self.registry.clone() else {
            return false;
        };
        let mut runtimes = registry.write().await;
        if !self.event_rx.is_empty() {
            return false;
        }

        self.event_rx.close();
        runtimes.remove(&self.conversation_id);
        tracing::debug!(conv_id = %self.conversation_id, "Idle conversation released");
        true
    }

    /// Apply one event and everything it triggers; returns the state the
    /// conversation ends up in
    pub(crate) async fn handle_event(&self, event: Event) -> Result<DialogueState, String> {
        let conv_id = self.conversation_id.as_str();
        let mut state = self.store.get_state(conv_id).await?;

        // Effects can generate follow-up events (generation completion)
        let mut events_to_process = vec![event];

        while let Some(current_event) = events_to_process.pop() {
            let data = self.store.get_data(conv_id).await?;

            let result = match transition(&state, &data, current_event) {
                Ok(r) => r,
                Err(TransitionError::Busy) => {
                    tracing::warn!(conv_id = %conv_id, "Input received while generating");
                    return Err(TransitionError::Busy.to_string());
                }
                Err(e) => return Err(e.to_string()),
            };

            if result.new_state == state && result.effects.is_empty() {
                tracing::debug!(
                    conv_id = %conv_id,
                    state = state.name(),
                    "Input ignored"
                );
            } else if result.new_state != state {
                tracing::info!(
                    conv_id = %conv_id,
                    from = state.name(),
                    to = result.new_state.name(),
                    "Dialogue state changed"
                );
            }
            state = result.new_state;

            for effect in result.effects {
                if let Some(generated_event) = self.execute_effect(effect, state).await? {
                    events_to_process.push(generated_event);
                }
            }
        }

        Ok(state)
    }

    /// Execute an effect and optionally return a generated event
    async fn execute_effect(
        &self,
        effect: Effect,
        state: DialogueState,
    ) -> Result<Option<Event>, String> {
        let conv_id = self.conversation_id.as_str();

        match effect {
            Effect::Reply(reply) => {
                // A lost reply must not wedge the dialogue
                if let Err(e) = self.messenger.send(conv_id, &reply).await {
                    tracing::warn!(conv_id = %conv_id, error = %e, "Failed to send reply");
                }
                Ok(None)
            }

            Effect::UpdateData(partial) => {
                tracing::info!(
                    conv_id = %conv_id,
                    style = partial.style.as_deref(),
                    query = partial.query.as_deref(),
                    "User input stored"
                );
                self.store.update_data(conv_id, partial).await?;
                Ok(None)
            }

            Effect::ClearData => {
                self.store.clear(conv_id).await?;
                Ok(None)
            }

            Effect::PersistState => {
                self.store.set_state(conv_id, state).await?;
                Ok(None)
            }

            Effect::RequestGeneration { request } => {
                tracing::info!(
                    conv_id = %conv_id,
                    topic = %request.topic,
                    style = %request.style,
                    "Requesting presentation"
                );

                let outcome = match self.generator.generate(&request, &self.cancel).await {
                    Ok(url) => {
                        tracing::info!(conv_id = %conv_id, url = %url, "Presentation ready");
                        GenerationOutcome::Ready { url }
                    }
                    Err(e) => {
                        tracing::warn!(conv_id = %conv_id, error = %e, "Presentation failed");
                        GenerationOutcome::Failed {
                            message: e.user_message(),
                        }
                    }
                };

                Ok(Some(Event::GenerationFinished { outcome }))
            }
        }
    }
}
