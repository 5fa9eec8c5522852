//! Session runtime actor
//!
//! One actor per user. It owns the session state, turns inbound input into
//! state machine events and executes the resulting effects. The next state is
//! committed only once every document of the step has been delivered.

use super::traits::{FileRef, Transport};
use super::workspace::{SessionDir, WorkDir, WorkspaceError};
use super::Registry;
use crate::state_machine::{
    prompts, transition, Artifact, Effect, Event, Feature, Recipient, SessionContext,
    SessionState, TransitionResult,
};
use crate::transport::TransportError;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Input queued for a session actor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInput {
    /// Chat the message arrived in; replies go back there
    pub chat_id: i64,
    pub kind: InputKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    Event(Event),
    /// Attachment still to be downloaded by the actor
    Attachment(FileRef),
}

/// Failures that leave the session state untouched
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("attachment of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },
    #[error("download failed: {0}")]
    Download(#[source] TransportError),
    #[error("delivery failed: {0}")]
    Delivery(#[source] TransportError),
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
}

impl ExecutionError {
    fn user_message(&self) -> String {
        match self {
            Self::TooLarge { limit, .. } => prompts::file_too_large(*limit),
            Self::Download(_) => prompts::DOWNLOAD_FAILED.to_string(),
            Self::Delivery(_) | Self::Workspace(_) => prompts::DELIVERY_FAILED.to_string(),
        }
    }
}

pub struct SessionRuntime<T: Transport> {
    context: SessionContext,
    state: SessionState,
    transport: T,
    work_dir: WorkDir,
    session_dir: Option<SessionDir>,
    max_upload_bytes: u64,
    input_rx: mpsc::UnboundedReceiver<SessionInput>,
    shutdown: CancellationToken,
    /// Registry to leave once the session is idle
    registry: Option<Registry>,
}

impl<T: Transport> SessionRuntime<T> {
    pub fn new(
        context: SessionContext,
        transport: T,
        work_dir: WorkDir,
        max_upload_bytes: u64,
        input_rx: mpsc::UnboundedReceiver<SessionInput>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            context,
            state: SessionState::Idle,
            transport,
            work_dir,
            session_dir: None,
            max_upload_bytes,
            input_rx,
            shutdown,
            registry: None,
        }
    }

    /// Retire from `registry` whenever the session returns to idle
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    #[cfg(test)]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Process inputs until the inbox closes, shutdown is requested or the
    /// session goes idle with nothing queued.
    /// Queued inputs are drained before shutdown is honoured.
    pub async fn run(mut self) {
        tracing::info!(user_id = self.context.user_id, "Starting session runtime");

        loop {
            tokio::select! {
                biased;
                input = self.input_rx.recv() => match input {
                    Some(input) => {
                        self.handle(input).await;
                        if self.state.is_idle() && self.retire().await {
                            break;
                        }
                    }
                    None => break,
                },
                () = self.shutdown.cancelled() => break,
            }
        }

        self.release_session_dir().await;
        tracing::info!(user_id = self.context.user_id, "Session runtime stopped");
    }

    /// Leave the registry if no input is queued.
    ///
    /// The dispatcher only sends while holding the registry lock, so once our
    /// entry is gone under the write lock no further input can reach this inbox.
    async fn retire(&mut self) -> bool {
        let Some(registry) = &self.registry else {
            return false;
        };
        let mut runtimes = registry.write().await;
        if !self.input_rx.is_empty() {
            return false;
        }
        runtimes.remove(&self.context.user_id);
        self.input_rx.close();
        tracing::debug!(user_id = self.context.user_id, "Idle session runtime retired");
        true
    }

    pub async fn handle(&mut self, input: SessionInput) {
        self.context.chat_id = input.chat_id;

        let event = match input.kind {
            InputKind::Event(event) => event,
            InputKind::Attachment(file) => match self.fetch(&file).await {
                Ok(event) => event,
                Err(e) => {
                    self.report(&e).await;
                    return;
                }
            },
        };

        if let Err(e) = self.process_event(event).await {
            self.report(&e).await;
        }
    }

    /// Download an attachment, but only when the current step consumes one.
    /// Any other step rejects documents regardless of their content.
    async fn fetch(&self, file: &FileRef) -> Result<Event, ExecutionError> {
        if !self.state.awaits_upload() {
            tracing::debug!(
                user_id = self.context.user_id,
                step = self.state.step_name(),
                file_name = %file.file_name,
                "Attachment not expected, skipping download"
            );
            return Ok(Event::document(&file.file_name, Vec::new()));
        }

        let limit = self.max_upload_bytes;
        if let Some(size) = file.size.filter(|size| *size > limit) {
            return Err(ExecutionError::TooLarge { size, limit });
        }
        let bytes = self
            .transport
            .download(file)
            .await
            .map_err(ExecutionError::Download)?;
        let size = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        if size > limit {
            return Err(ExecutionError::TooLarge { size, limit });
        }

        tracing::info!(
            user_id = self.context.user_id,
            file_name = %file.file_name,
            bytes = bytes.len(),
            "Downloaded attachment"
        );
        Ok(Event::document(&file.file_name, bytes))
    }

    async fn process_event(&mut self, event: Event) -> Result<(), ExecutionError> {
        let TransitionResult { new_state, effects } =
            transition(&self.state, &self.context, event);

        // Effects run in order. A failed delivery returns early: later replies
        // are not sent and the state is not committed.
        for effect in effects {
            match effect {
                Effect::Reply { text } => self.say(&text).await,
                Effect::SendDocument {
                    recipient,
                    artifact,
                } => self.deliver(recipient, &artifact).await?,
                Effect::EndSession => self.end_session().await,
            }
        }

        let previous = std::mem::replace(&mut self.state, new_state);
        if previous.step_name() != self.state.step_name() {
            tracing::info!(
                user_id = self.context.user_id,
                feature = self.state.feature().map(Feature::command),
                from = previous.step_name(),
                to = self.state.step_name(),
                "Session step changed"
            );
        }
        Ok(())
    }

    async fn deliver(
        &mut self,
        recipient: Recipient,
        artifact: &Artifact,
    ) -> Result<(), ExecutionError> {
        let dir = match self.session_dir.take() {
            Some(dir) => dir,
            None => {
                self.work_dir
                    .open_session(self.context.user_id, self.state.feature())
                    .await?
            }
        };
        let outcome = self.send_staged(&dir, recipient, artifact).await;
        self.session_dir = Some(dir);
        outcome
    }

    async fn send_staged(
        &self,
        dir: &SessionDir,
        recipient: Recipient,
        artifact: &Artifact,
    ) -> Result<(), ExecutionError> {
        let staged = dir.stage(&artifact.file_name, &artifact.bytes).await?;
        let chat_id = self.context.resolve(recipient);
        let sent = self
            .transport
            .send_document(chat_id, &artifact.file_name, &staged)
            .await;
        dir.discard(&staged).await;
        sent.map_err(ExecutionError::Delivery)?;

        tracing::info!(
            user_id = self.context.user_id,
            chat_id,
            file_name = %artifact.file_name,
            bytes = artifact.bytes.len(),
            "Delivered document"
        );
        Ok(())
    }

    async fn end_session(&mut self) {
        tracing::info!(
            user_id = self.context.user_id,
            feature = self.state.feature().map(Feature::command),
            "Session ended"
        );
        self.release_session_dir().await;
    }

    async fn release_session_dir(&mut self) {
        if let Some(dir) = self.session_dir.take() {
            if let Err(e) = dir.remove().await {
                tracing::warn!(user_id = self.context.user_id, error = %e, "Failed to remove session directory");
            }
        }
    }

    async fn say(&self, text: &str) {
        if let Err(e) = self.transport.send_text(self.context.chat_id, text).await {
            tracing::warn!(user_id = self.context.user_id, error = %e, "Failed to send reply");
        }
    }

    async fn report(&self, error: &ExecutionError) {
        tracing::warn!(
            user_id = self.context.user_id,
            step = self.state.step_name(),
            error = %error,
            "Step not committed"
        );
        self.say(&error.user_message()).await;
    }
}
