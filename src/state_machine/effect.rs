//! Effects produced by state transitions

use super::state::Recipient;

/// A generated file ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Effects to be executed after a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Text reply to the session's chat
    Reply { text: String },

    /// Deliver a generated document
    SendDocument {
        recipient: Recipient,
        artifact: Artifact,
    },

    /// Session is over; release its working directory
    EndSession,
}

impl Effect {
    pub fn reply(text: impl Into<String>) -> Self {
        Effect::Reply { text: text.into() }
    }

    pub fn send_document(
        recipient: Recipient,
        file_name: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Effect::SendDocument {
            recipient,
            artifact: Artifact {
                file_name: file_name.into(),
                bytes: bytes.into(),
            },
        }
    }

    pub fn is_delivery(&self) -> bool {
        matches!(self, Effect::SendDocument { .. })
    }
}
