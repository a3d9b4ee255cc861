//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use crate::generator::{GenerationError, GenerationRequest, Generator, GeneratorApi, Sleeper};
use crate::state_machine::{CollectedData, DialogueState, Reply};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// Per-conversation state and collected data, keyed by conversation id
///
/// A conversation that was never seen reads as `Idle` with no data.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn get_state(&self, conv_id: &str) -> Result<DialogueState, String>;

    async fn set_state(&self, conv_id: &str, state: DialogueState) -> Result<(), String>;

    /// Merge the `Some` fields of `partial` into the collected data
    async fn update_data(&self, conv_id: &str, partial: CollectedData) -> Result<(), String>;

    async fn get_data(&self, conv_id: &str) -> Result<CollectedData, String>;

    /// Forget the conversation: state back to `Idle`, data emptied
    async fn clear(&self, conv_id: &str) -> Result<(), String>;
}

/// Outbound side of the chat transport
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, conv_id: &str, reply: &Reply) -> Result<(), String>;
}

/// Runs a generation job to completion
#[async_trait]
pub trait PresentationGenerator: Send + Sync {
    /// Returns the artifact URL
    async fn generate(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<String, GenerationError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: StateStore + ?Sized> StateStore for Arc<T> {
    async fn get_state(&self, conv_id: &str) -> Result<DialogueState, String> {
        (**self).get_state(conv_id).await
    }

    async fn set_state(&self, conv_id: &str, state: DialogueState) -> Result<(), String> {
        (**self).set_state(conv_id, state).await
    }

    async fn update_data(&self, conv_id: &str, partial: CollectedData) -> Result<(), String> {
        (**self).update_data(conv_id, partial).await
    }

    async fn get_data(&self, conv_id: &str) -> Result<CollectedData, String> {
        (**self).get_data(conv_id).await
    }

    async fn clear(&self, conv_id: &str) -> Result<(), String> {
        (**self).clear(conv_id).await
    }
}

#[async_trait]
impl<T: Messenger + ?Sized> Messenger for Arc<T> {
    async fn send(&self, conv_id: &str, reply: &Reply) -> Result<(), String> {
        (**self).send(conv_id, reply).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

#[derive(Debug, Clone, Default)]
struct ConversationRecord {
    state: DialogueState,
    data: CollectedData,
}

/// Process-local state store; everything is lost on restart
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    conversations: RwLock<HashMap<String, ConversationRecord>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of conversations with a stored record
    #[allow(dead_code)] // Used by tests
    pub async fn len(&self) -> usize {
        self.conversations.read().await.len()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn get_state(&self, conv_id: &str) -> Result<DialogueState, String> {
        Ok(self
            .conversations
            .read()
            .await
            .get(conv_id)
            .map(|record| record.state)
            .unwrap_or_default())
    }

    async fn set_state(&self, conv_id: &str, state: DialogueState) -> Result<(), String> {
        let mut conversations = self.conversations.write().await;
        let record = conversations.entry(conv_id.to_string()).or_default();
        record.state = state;

        // An idle conversation with nothing collected reads the same as an
        // unknown one
        if state == DialogueState::Idle && record.data.is_empty() {
            conversations.remove(conv_id);
        }
        Ok(())
    }

    async fn update_data(&self, conv_id: &str, partial: CollectedData) -> Result<(), String> {
        self.conversations
            .write()
            .await
            .entry(conv_id.to_string())
            .or_default()
            .data
            .merge(partial);
        Ok(())
    }

    async fn get_data(&self, conv_id: &str) -> Result<CollectedData, String> {
        Ok(self
            .conversations
            .read()
            .await
            .get(conv_id)
            .map(|record| record.data.clone())
            .unwrap_or_default())
    }

    async fn clear(&self, conv_id: &str) -> Result<(), String> {
        self.conversations.write().await.remove(conv_id);
        Ok(())
    }
}

/// Adapter to use the polling `Generator` as `PresentationGenerator`
#[async_trait]
impl<A, S> PresentationGenerator for Generator<A, S>
where
    A: GeneratorApi,
    S: Sleeper,
{
    async fn generate(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<String, GenerationError> {
        let result = Generator::generate(self, request, cancel).await?;
        Ok(result.artifact_url(self.api().base_url()))
    }
}
