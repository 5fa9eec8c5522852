//! Runtime for executing sessions
//!
//! Each user gets one [`SessionRuntime`] task with its own inbox, so a user's
//! messages are handled strictly in order while different users run in parallel.
//! A runtime leaves the registry once its session is idle; the next message
//! from that user starts a fresh one.

mod executor;
pub mod traits;
mod workspace;

#[cfg(test)]
pub mod testing;

pub use executor::{InputKind, SessionInput, SessionRuntime};
pub use traits::*;
pub use workspace::WorkDir;

use crate::state_machine::{prompts, Event, SessionContext};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Live session runtimes keyed by user id
pub(crate) type Registry = Arc<RwLock<HashMap<i64, SessionHandle>>>;

/// Manager for all session runtimes, keyed by user id
pub struct RuntimeManager<T: Transport> {
    transport: Arc<T>,
    work_dir: WorkDir,
    max_upload_bytes: u64,
    runtimes: Registry,
    shutdown: CancellationToken,
}

/// Handle to a running session actor
pub struct SessionHandle {
    input_tx: mpsc::UnboundedSender<SessionInput>,
    task: JoinHandle<()>,
}

/// Queue `input` on the user's runtime, handing it back if there is none
/// or it has stopped.
fn send_to(
    runtimes: &HashMap<i64, SessionHandle>,
    user_id: i64,
    input: SessionInput,
) -> Result<(), SessionInput> {
    match runtimes.get(&user_id) {
        Some(handle) => handle.input_tx.send(input).map_err(|e| e.0),
        None => Err(input),
    }
}

impl<T: Transport + 'static> RuntimeManager<T> {
    pub fn new(transport: Arc<T>, work_dir: WorkDir, max_upload_bytes: u64) -> Self {
        Self {
            transport,
            work_dir,
            max_upload_bytes,
            runtimes: Arc::new(RwLock::new(HashMap::new())),
            shutdown: CancellationToken::new(),
        }
    }

    /// Route one inbound message.
    ///
    /// `/start` (and unknown commands) are answered here with the menu; everything
    /// else goes to the user's session actor.
    pub async fn dispatch(&self, inbound: Inbound) {
        let Inbound {
            user_id,
            chat_id,
            kind,
        } = inbound;

        let kind = match kind {
            InboundKind::Command(Command::Start) => {
                self.send_menu(user_id, chat_id).await;
                return;
            }
            InboundKind::Command(Command::Unknown(name)) => {
                tracing::debug!(user_id, command = %name, "Unknown command");
                self.send_menu(user_id, chat_id).await;
                return;
            }
            InboundKind::Command(Command::Cancel) => InputKind::Event(Event::Cancel),
            InboundKind::Command(Command::Feature(feature)) => {
                tracing::info!(user_id, feature = feature.command(), "Feature selected");
                InputKind::Event(Event::Begin(feature))
            }
            InboundKind::Text(text) => InputKind::Event(Event::Text(text)),
            InboundKind::Document(file) => InputKind::Attachment(file),
        };

        // Sends happen under the registry lock so a retiring runtime cannot
        // miss input queued after its last idle check.
        let input = SessionInput { chat_id, kind };
        let Err(input) = send_to(&*self.runtimes.read().await, user_id, input) else {
            return;
        };

        let mut runtimes = self.runtimes.write().await;
        let Err(input) = send_to(&runtimes, user_id, input) else {
            return;
        };
        if runtimes.remove(&user_id).is_some() {
            tracing::warn!(user_id, "Session runtime stopped unexpectedly, restarting");
        }
        let handle = self.spawn_runtime(user_id, chat_id);
        if handle.input_tx.send(input).is_err() {
            tracing::error!(user_id, "Session runtime is gone, dropping input");
        }
        runtimes.insert(user_id, handle);
    }

    async fn send_menu(&self, user_id: i64, chat_id: i64) {
        if let Err(e) = self.transport.send_text(chat_id, &prompts::menu()).await {
            tracing::warn!(user_id, error = %e, "Failed to send menu");
        }
    }

    /// Start a runtime for `user_id`; the caller holds the registry write lock
    fn spawn_runtime(&self, user_id: i64, chat_id: i64) -> SessionHandle {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let runtime = SessionRuntime::new(
            SessionContext::new(user_id, chat_id),
            Arc::clone(&self.transport),
            self.work_dir.clone(),
            self.max_upload_bytes,
            input_rx,
            self.shutdown.child_token(),
        )
        .with_registry(Arc::clone(&self.runtimes));
        let task = tokio::spawn(async move {
            runtime.run().await;
        });
        tracing::info!(user_id, "Started session runtime");
        SessionHandle { input_tx, task }
    }

    pub async fn active_sessions(&self) -> usize {
        self.runtimes.read().await.len()
    }

    /// Stop every runtime after its queued input is handled and wait for them to
    /// clean up their session directories.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let handles: Vec<(i64, SessionHandle)> = self.runtimes.write().await.drain().collect();
        for (user_id, handle) in handles {
            drop(handle.input_tx);
            if let Err(e) = handle.task.await {
                tracing::error!(user_id, error = %e, "Session runtime panicked");
            }
        }
    }
}
