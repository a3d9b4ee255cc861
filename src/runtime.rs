//! Runtime for executing conversations
//!
//! Each conversation gets its own task and an ordered inbound channel.
//! Conversations run concurrently and share nothing but the state store.
//! A runtime exits once its conversation is back in `Idle` with nothing
//! queued; the next input starts a fresh one.

mod executor;
pub mod traits;


pub use executor::ConversationRuntime;
pub use traits::*;

use crate::generator::{Generator, LoggingApi, TokioSleeper};
use crate::state_machine::Event;
use crate::telegram::TelegramMessenger;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Inputs buffered per conversation while it is busy
const CONVERSATION_QUEUE: usize = 32;

/// Type alias for the production generator
pub type ProductionGenerator = Generator<LoggingApi, TokioSleeper>;

/// Type alias for the production manager with concrete implementations
pub type ProductionManager =
    RuntimeManager<InMemoryStateStore, TelegramMessenger, ProductionGenerator>;

/// Live runtimes keyed by conversation id, shared with the runtimes so an
/// idle one can remove itself
type Registry = Arc<RwLock<HashMap<String, ConversationHandle>>>;

/// Handle to interact with a running conversation
struct ConversationHandle {
    event_tx: mpsc::Sender<Event>,
    task: JoinHandle<()>,
}

/// Manager for all conversation runtimes
pub struct RuntimeManager<S, M, G>
where
    S: StateStore + 'static,
    M: Messenger + 'static,
    G: PresentationGenerator + 'static,
{
    store: Arc<S>,
    messenger: Arc<M>,
    generator: Arc<G>,
    runtimes: Registry,
    shutdown: CancellationToken,
}

impl<S, M, G> RuntimeManager<S, M, G>
where
    S: StateStore + 'static,
    M: Messenger + 'static,
    G: PresentationGenerator + 'static,
{
    pub fn new(store: Arc<S>, messenger: Arc<M>, generator: Arc<G>) -> Self {
        Self {
            store,
            messenger,
            generator,
            runtimes: Arc::new(RwLock::new(HashMap::new())),
            shutdown: CancellationToken::new(),
        }
    }

    #[allow(dead_code)] // Used by tests
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Queue an event for a conversation, starting its runtime if needed
    ///
    /// Never waits on a busy conversation: when its queue is full the
    /// event is dropped. The send happens under the registry lock, so an
    /// idle runtime cannot release itself between lookup and send.
    pub async fn dispatch(&self, conversation_id: &str, event: Event) -> Result<(), String> {
        if self.shutdown.is_cancelled() {
            return Err("Runtime manager is shut down".to_string());
        }

        // Fast path: runtime already running
        {
            let runtimes = self.runtimes.read().await;
            if let Some(handle) = runtimes.get(conversation_id) {
                if !handle.event_tx.is_closed() {
                    return send_event(conversation_id, &handle.event_tx, event);
                }
            }
        }

        let mut runtimes = self.runtimes.write().await;
        let event_tx = self.get_or_create(&mut runtimes, conversation_id);
        send_event(conversation_id, &event_tx, event)
    }

    /// Get or create the inbound channel of a conversation
    fn get_or_create(
        &self,
        runtimes: &mut HashMap<String, ConversationHandle>,
        conversation_id: &str,
    ) -> mpsc::Sender<Event> {
        if let Some(handle) = runtimes.get(conversation_id) {
            if !handle.event_tx.is_closed() {
                return handle.event_tx.clone();
            }
        }

        let (event_tx, event_rx) = mpsc::channel(CONVERSATION_QUEUE);
        let runtime = ConversationRuntime::new(
            conversation_id,
            self.store.clone(),
            self.messenger.clone(),
            self.generator.clone(),
            event_rx,
            self.shutdown.child_token(),
        )
        .with_registry(self.runtimes.clone());

        let task = tokio::spawn(runtime.run());
        runtimes.insert(
            conversation_id.to_string(),
            ConversationHandle {
                event_tx: event_tx.clone(),
                task,
            },
        );

        event_tx
    }

    /// Number of conversations with a live runtime
    #[allow(dead_code)] // Used by tests
    pub async fn active_conversations(&self) -> usize {
        self.runtimes.read().await.len()
    }

    /// Cancel every runtime (including in-flight generations) and wait for
    /// them to stop
    pub async fn shutdown(&self) {
        self.shutdown.cancel();

        let handles: Vec<_> = self
            .runtimes
            .write()
            .await
            .drain()
            .map(|(_, handle)| handle.task)
            .collect();

        tracing::info!(conversations = handles.len(), "Stopping conversation runtimes");
        for task in handles {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Conversation runtime panicked");
            }
        }
    }
}

fn send_event(
    conversation_id: &str,
    event_tx: &mpsc::Sender<Event>,
    event: Event,
) -> Result<(), String> {
    event_tx.try_send(event).map_err(|e| match e {
        mpsc::error::TrySendError::Full(_) => {
            tracing::warn!(conv_id = %conversation_id, "Conversation queue full, dropping input");
            format!("Conversation {conversation_id} is busy")
        }
        mpsc::error::TrySendError::Closed(_) => {
            format!("Conversation {conversation_id} runtime has stopped")
        }
    })
}
