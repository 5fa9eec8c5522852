//! Events that drive session transitions

use super::Feature;
use crate::contacts::DocumentKind;

/// An attachment with its bytes already downloaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn kind(&self) -> Option<DocumentKind> {
        DocumentKind::from_file_name(&self.file_name)
    }
}

/// Events that can occur in a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Feature entry command; always starts a fresh session
    Begin(Feature),
    /// Plain text message
    Text(String),
    /// Document upload
    Document(UploadedDocument),
    /// `/cancel`
    Cancel,
}

impl Event {
    pub fn text(text: impl Into<String>) -> Self {
        Event::Text(text.into())
    }

    pub fn document(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Event::Document(UploadedDocument::new(file_name, bytes))
    }
}
