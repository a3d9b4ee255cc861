//! Telegram Bot API transport
//!
//! Long-polls for updates, turns text messages into dialogue events and
//! delivers replies with reply keyboards.

mod polling;
pub mod types;

pub use polling::run_polling;

use crate::runtime::Messenger;
use crate::state_machine::Reply;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use types::{ApiResponse, GetUpdates, Message, SendMessage, Update};

/// Server-side wait of a `getUpdates` long poll
pub const LONG_POLL_TIMEOUT_SECS: u32 = 30;

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Telegram request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Telegram API error {code:?}: {description}")]
    Api {
        code: Option<i32>,
        description: String,
    },
}

/// Minimal Bot API client
pub struct TelegramClient {
    client: Client,
    /// `{api_url}/bot{token}`; never logged
    endpoint: String,
}

impl TelegramClient {
    pub fn new(api_url: &str, token: &str) -> Result<Self, TelegramError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(LONG_POLL_TIMEOUT_SECS) + 10))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/bot{token}", api_url.trim_end_matches('/')),
        })
    }

    async fn call<P, R>(&self, method: &str, params: &P) -> Result<R, TelegramError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        // Errors carry the request URL, which contains the token
        let response = self
            .client
            .post(format!("{}/{method}", self.endpoint))
            .json(params)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let body: ApiResponse<R> = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)?;

        match (body.ok, body.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(TelegramError::Api {
                code: body.error_code,
                description: body
                    .description
                    .unwrap_or_else(|| format!("{method} returned no result")),
            }),
        }
    }

    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u32,
    ) -> Result<Vec<Update>, TelegramError> {
        let params = GetUpdates {
            offset,
            timeout: timeout_secs,
            allowed_updates: vec!["message"],
        };
        self.call("getUpdates", &params).await
    }

    /// Acknowledge everything queued while the bot was offline; returns the
    /// offset to continue from
    pub async fn skip_pending_updates(&self) -> Result<Option<i64>, TelegramError> {
        let pending = self.get_updates(Some(-1), 0).await?;
        Ok(pending.last().map(|update| update.update_id + 1))
    }

    pub async fn send_message(&self, message: &SendMessage) -> Result<Message, TelegramError> {
        self.call("sendMessage", message).await
    }
}

/// Adapter to use `TelegramClient` as `Messenger`
pub struct TelegramMessenger {
    client: Arc<TelegramClient>,
}

impl TelegramMessenger {
    pub fn new(client: Arc<TelegramClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send(&self, conv_id: &str, reply: &Reply) -> Result<(), String> {
        self.client
            .send_message(&SendMessage::from_reply(conv_id, reply))
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}
