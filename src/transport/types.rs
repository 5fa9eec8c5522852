//! Telegram Bot API wire types
//!
//! Only the fields the bot reads are modelled; serde ignores the rest.

use crate::runtime::{FileRef, Inbound, InboundKind};
use serde::{Deserialize, Serialize};

/// Envelope around every Bot API result
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<u16>,
    pub parameters: Option<ResponseParameters>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResponseParameters {
    pub retry_after: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
    pub document: Option<Document>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    pub file_id: String,
    pub file_name: Option<String>,
    pub file_size: Option<u64>,
}

/// Result of `getFile`
#[derive(Debug, Clone, Deserialize)]
pub struct File {
    pub file_id: String,
    pub file_path: Option<String>,
    pub file_size: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct GetUpdates<'a> {
    pub offset: i64,
    pub timeout: u64,
    pub allowed_updates: &'a [&'a str],
}

#[derive(Debug, Serialize)]
pub struct SendMessage<'a> {
    pub chat_id: i64,
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
pub struct GetFile<'a> {
    pub file_id: &'a str,
}

impl Message {
    /// Convert into the runtime's input shape; `None` for messages the bot ignores
    /// (stickers, photos, channel posts without a sender).
    pub fn into_inbound(self) -> Option<Inbound> {
        let user_id = self.from?.id;
        let chat_id = self.chat.id;
        let kind = if let Some(document) = self.document {
            InboundKind::Document(FileRef {
                file_name: document
                    .file_name
                    .unwrap_or_else(|| format!("{}.bin", document.file_id)),
                file_id: document.file_id,
                size: document.file_size,
            })
        } else {
            InboundKind::from_text(self.text?)
        };
        Some(Inbound {
            user_id,
            chat_id,
            kind,
        })
    }
}
