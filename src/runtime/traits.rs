//! Trait abstractions for runtime I/O
//!
//! The executor only talks to the chat platform through [`Transport`], so whole
//! dialogues can be driven against a mock.

use crate::state_machine::Feature;
use crate::transport::TransportError;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Reference to an inbound attachment that has not been downloaded yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub file_id: String,
    pub file_name: String,
    /// Size announced by the platform, if any
    pub size: Option<u64>,
}

/// Outbound messaging and attachment download
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TransportError>;

    /// Upload the file at `path` as a document named `file_name`
    async fn send_document(
        &self,
        chat_id: i64,
        file_name: &str,
        path: &Path,
    ) -> Result<(), TransportError>;

    /// Fetch the bytes of an inbound attachment
    async fn download(&self, file: &FileRef) -> Result<Vec<u8>, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TransportError> {
        (**self).send_text(chat_id, text).await
    }

    async fn send_document(
        &self,
        chat_id: i64,
        file_name: &str,
        path: &Path,
    ) -> Result<(), TransportError> {
        (**self).send_document(chat_id, file_name, path).await
    }

    async fn download(&self, file: &FileRef) -> Result<Vec<u8>, TransportError> {
        (**self).download(file).await
    }
}

/// Slash commands understood by the bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Cancel,
    Feature(Feature),
    Unknown(String),
}

impl Command {
    /// Parse `/name`, `/name@bot` or `/name args`; `None` when `text` is not a command
    pub fn parse(text: &str) -> Option<Self> {
        let body = text.trim_start().strip_prefix('/')?;
        let word = body.split_whitespace().next().unwrap_or_default();
        let name = word
            .split_once('@')
            .map_or(word, |(name, _bot)| name)
            .to_ascii_lowercase();
        Some(match name.as_str() {
            "start" | "help" => Self::Start,
            "cancel" => Self::Cancel,
            other => Feature::from_command(other)
                .map_or_else(|| Self::Unknown(other.to_string()), Self::Feature),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundKind {
    Command(Command),
    Text(String),
    Document(FileRef),
}

impl InboundKind {
    /// A message body is either a command or free text
    pub fn from_text(text: String) -> Self {
        match Command::parse(&text) {
            Some(command) => Self::Command(command),
            None => Self::Text(text),
        }
    }
}

/// One message from one user, as handed to [`super::RuntimeManager::dispatch`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub user_id: i64,
    pub chat_id: i64,
    pub kind: InboundKind,
}
