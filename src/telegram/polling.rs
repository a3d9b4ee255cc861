//! Long-polling update loop

use super::types::Update;
use super::{TelegramClient, LONG_POLL_TIMEOUT_SECS};
use crate::runtime::{Messenger, PresentationGenerator, RuntimeManager, StateStore};
use crate::state_machine::Event;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const INITIAL_RETRY_DELAY: Duration = Duration::from_secs(1);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Pull updates until `cancel` fires, dispatching each text message to its
/// conversation
pub async fn run_polling<S, M, G>(
    client: &TelegramClient,
    manager: &RuntimeManager<S, M, G>,
    cancel: CancellationToken,
) where
    S: StateStore + 'static,
    M: Messenger + 'static,
    G: PresentationGenerator + 'static,
{
    let mut offset = match client.skip_pending_updates().await {
        Ok(offset) => offset,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to skip pending updates");
            None
        }
    };
    let mut retry_delay = INITIAL_RETRY_DELAY;

    tracing::info!("Polling for updates");

    loop {
        let batch = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            batch = client.get_updates(offset, LONG_POLL_TIMEOUT_SECS) => batch,
        };

        match batch {
            Ok(updates) => {
                retry_delay = INITIAL_RETRY_DELAY;
                for update in updates {
                    offset = Some(update.update_id + 1);
                    dispatch_update(manager, update).await;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, retry_in = ?retry_delay, "getUpdates failed");
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(retry_delay) => {}
                }
                retry_delay = (retry_delay * 2).min(MAX_RETRY_DELAY);
            }
        }
    }

    tracing::info!("Polling stopped");
}

/// Route one update; anything but a text message is ignored
pub(crate) async fn dispatch_update<S, M, G>(manager: &RuntimeManager<S, M, G>, update: Update)
where
    S: StateStore + 'static,
    M: Messenger + 'static,
    G: PresentationGenerator + 'static,
{
    let Some(message) = update.message else {
        return;
    };
    let Some(text) = message.text else {
        return;
    };

    let conv_id = message.chat.id.to_string();
    tracing::info!(
        conv_id = %conv_id,
        user_id = message.from.as_ref().map(|user| user.id),
        text = %text,
        "Received message"
    );

    if let Err(e) = manager.dispatch(&conv_id, Event::user_input(text)).await {
        tracing::warn!(conv_id = %conv_id, error = %e, "Failed to dispatch message");
    }
}
