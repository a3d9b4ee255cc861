//! Presentation bot
//!
//! A Telegram bot that collects a presentation style and topic through a
//! short dialogue, submits them to a generation service and replies with
//! the finished presentation.

mod config;
mod generator;
mod runtime;
mod state_machine;
mod telegram;

use config::Config;
use generator::{Generator, HttpGeneratorApi, LoggingApi, TokioSleeper};
use runtime::{InMemoryStateStore, ProductionManager};
use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};
use telegram::{TelegramClient, TelegramMessenger};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging
    let log_file = match config::log_file_from_env() {
        Some(path) => Some(OpenOptions::new().create(true).append(true).open(path)?),
        None => None,
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "presentation_bot=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(log_file.map(|file| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(Mutex::new(file))
        }))
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    tracing::info!(
        generator_url = %config.generator_url,
        poll_interval = ?config.poll_policy.interval,
        max_polls = ?config.poll_policy.max_attempts,
        "Configuration loaded"
    );

    // Generation service
    let api = HttpGeneratorApi::new(config.generator_url.clone())?;
    let generator = Arc::new(Generator::new(
        LoggingApi::new(Arc::new(api)),
        TokioSleeper,
        config.poll_policy,
    ));

    // Telegram
    let telegram = Arc::new(TelegramClient::new(
        &config.telegram_api_url,
        &config.api_token,
    )?);
    let messenger = Arc::new(TelegramMessenger::new(telegram.clone()));

    let manager: ProductionManager =
        runtime::RuntimeManager::new(Arc::new(InMemoryStateStore::new()), messenger, generator);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                return;
            }
            tracing::info!("Shutdown requested");
            cancel.cancel();
        });
    }

    tracing::info!("Bot started");
    telegram::run_polling(&telegram, &manager, cancel).await;

    manager.shutdown().await;
    tracing::info!("Bot stopped");

    Ok(())
}
