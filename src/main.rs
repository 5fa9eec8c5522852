//! contact_forge - Telegram bot that turns phone-number lists into vCard files
//!
//! Long-polls the Bot API and runs one session actor per user over a pure
//! dialogue state machine.

mod config;
mod contacts;
mod error;
mod runtime;
mod state_machine;
mod transport;

use config::BotConfig;
use runtime::{RuntimeManager, WorkDir};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use transport::{Poller, TelegramClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "contact_forge=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = BotConfig::from_env()?;
    tracing::info!(
        work_dir = %config.work_dir.display(),
        api_url = %config.api_url,
        allowed_users = config.allowed_users.len(),
        max_upload_bytes = config.max_upload_bytes,
        "Configuration loaded"
    );
    if config.allowed_users.is_empty() {
        tracing::warn!("ALLOWED_USER_IDS not set, every user may use the bot");
    }

    std::fs::create_dir_all(&config.work_dir)?;

    let client = Arc::new(TelegramClient::new(
        &config.api_url,
        &config.token,
        config.poll_timeout,
    )?);
    let manager = Arc::new(RuntimeManager::new(
        Arc::clone(&client),
        WorkDir::new(&config.work_dir),
        config.max_upload_bytes,
    ));

    let shutdown = CancellationToken::new();
    let poller = Poller::new(
        Arc::clone(&client),
        Arc::clone(&manager),
        config.allowed_users.clone(),
        shutdown.clone(),
    );
    let polling = tokio::spawn(poller.run());

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");
    shutdown.cancel();
    polling.await?;
    manager.shutdown().await;
    tracing::info!("Stopped");

    Ok(())
}
