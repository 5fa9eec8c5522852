//! Long-polling loop feeding updates into the runtime manager

use super::types::Update;
use super::{TelegramClient, TransportError};
use crate::config::AllowList;
use crate::runtime::{RuntimeManager, Transport};
use crate::state_machine::prompts;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(60);

pub struct Poller {
    client: Arc<TelegramClient>,
    manager: Arc<RuntimeManager<TelegramClient>>,
    allowed: AllowList,
    shutdown: CancellationToken,
    offset: i64,
}

impl Poller {
    pub fn new(
        client: Arc<TelegramClient>,
        manager: Arc<RuntimeManager<TelegramClient>>,
        allowed: AllowList,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            client,
            manager,
            allowed,
            shutdown,
            offset: 0,
        }
    }

    /// Poll until the shutdown token fires
    pub async fn run(mut self) {
        tracing::info!("Starting update poller");
        let mut backoff = INITIAL_BACKOFF;

        loop {
            let polled = tokio::select! {
                () = self.shutdown.cancelled() => break,
                polled = self.client.get_updates(self.offset) => polled,
            };

            match polled {
                Ok(updates) => {
                    backoff = INITIAL_BACKOFF;
                    for update in updates {
                        self.offset = self.offset.max(update.update_id + 1);
                        self.handle(update).await;
                    }
                }
                Err(e) => {
                    let delay = retry_delay(&e, backoff);
                    if e.kind.is_retryable() {
                        tracing::warn!(error = %e, delay_secs = delay.as_secs(), "Polling failed, backing off");
                    } else {
                        tracing::error!(error = %e, delay_secs = delay.as_secs(), "Polling rejected, check BOT_TOKEN");
                    }
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                    tokio::select! {
                        () = self.shutdown.cancelled() => break,
                        () = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }

        tracing::info!(offset = self.offset, "Update poller stopped");
    }

    async fn handle(&self, update: Update) {
        let Some(inbound) = update.message.and_then(super::types::Message::into_inbound) else {
            tracing::debug!(update_id = update.update_id, "Ignoring update without usable content");
            return;
        };

        if !self.allowed.permits(inbound.user_id) {
            tracing::info!(user_id = inbound.user_id, "Rejecting unauthorized user");
            if let Err(e) = self
                .client
                .send_text(inbound.chat_id, prompts::UNAUTHORIZED)
                .await
            {
                tracing::warn!(user_id = inbound.user_id, error = %e, "Failed to send rejection");
            }
            return;
        }

        self.manager.dispatch(inbound).await;
    }
}

/// Flood control tells us exactly how long to wait; everything else uses the backoff.
fn retry_delay(error: &TransportError, backoff: Duration) -> Duration {
    error.retry_after.unwrap_or(backoff)
}
