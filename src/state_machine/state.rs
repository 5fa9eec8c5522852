//! Session state types
//!
//! Each feature has its own step enum. A step variant carries exactly the
//! fields collected before it, so no step can read a field that was never
//! entered.

use super::Feature;
use crate::contacts::{DecodedText, PhoneNumber};

/// Hard ceiling on uploads for the open-ended features
pub const MAX_UPLOADS: usize = 100;

// ============================================================================
// Shared field groups
// ============================================================================

/// Who receives generated documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// The chat the session is running in
    Requester,
    /// Another chat, by id
    Chat(i64),
}

/// Contact-name prefix and output base name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Naming {
    pub contact_name: String,
    pub base_name: String,
}

/// Upload target and the artifacts produced so far
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadProgress {
    pub target: usize,
    pub uploads: usize,
    pub artifacts: Vec<String>,
}

impl UploadProgress {
    pub fn new(target: usize) -> Self {
        Self {
            target,
            uploads: 0,
            artifacts: Vec::new(),
        }
    }

    /// Record one completed upload and the artifacts it produced.
    #[must_use]
    pub fn record(&self, artifacts: impl IntoIterator<Item = String>) -> Self {
        let mut next = self.clone();
        next.uploads += 1;
        next.artifacts.extend(artifacts);
        next
    }

    pub fn is_complete(&self) -> bool {
        self.uploads >= self.target
    }

    pub fn remaining(&self) -> usize {
        self.target.saturating_sub(self.uploads)
    }

    /// Room for one more upload after the target was reached.
    #[must_use]
    pub fn extended(&self) -> Self {
        let mut next = self.clone();
        next.target = next.target.max(next.uploads + 1);
        next
    }
}

/// A vCard upload kept across several steps
#[derive(Debug, Clone, PartialEq)]
pub struct HeldDocument {
    /// Name the result is delivered under
    pub file_name: String,
    pub decoded: DecodedText,
}

// ============================================================================
// Per-feature steps
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertJob {
    pub naming: Naming,
    pub recipient: Recipient,
    pub seq_start: usize,
    pub progress: UploadProgress,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertStep {
    ContactName,
    BaseName { contact_name: String },
    RecipientChoice { naming: Naming },
    RecipientId { naming: Naming },
    UploadCount { naming: Naming, recipient: Recipient },
    SequenceStart { naming: Naming, recipient: Recipient, expected: usize },
    AwaitUpload(ConvertJob),
    AwaitDecision(ConvertJob),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertAnyJob {
    pub naming: Naming,
    pub progress: UploadProgress,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertAnyStep {
    ContactName,
    BaseName { contact_name: String },
    UploadCount { naming: Naming },
    AwaitUpload(ConvertAnyJob),
    AwaitDecision(ConvertAnyJob),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractJob {
    pub line_count: usize,
    pub progress: UploadProgress,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractStep {
    LineCount,
    AwaitUpload(ExtractJob),
    AwaitDecision(ExtractJob),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyNumberJob {
    /// 1-based column index
    pub column: usize,
    pub progress: UploadProgress,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyNumberStep {
    ColumnIndex,
    AwaitUpload(CopyNumberJob),
    AwaitDecision(CopyNumberJob),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomNumberStep {
    ContactName,
    BaseName { contact_name: String },
    CollectNumbers { naming: Naming, numbers: Vec<PhoneNumber> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitJob {
    pub naming: Naming,
    pub parts: usize,
    pub recipient: Recipient,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitStep {
    ContactName,
    BaseName { contact_name: String },
    SplitCount { naming: Naming },
    RecipientChoice { naming: Naming, parts: usize },
    RecipientId { naming: Naming, parts: usize },
    AwaitUpload(SplitJob),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertJob {
    pub naming: Naming,
    pub numbers: Vec<PhoneNumber>,
    pub progress: UploadProgress,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertStep {
    ContactName,
    BaseName { contact_name: String },
    CollectNumbers { naming: Naming, numbers: Vec<PhoneNumber> },
    UploadCount { naming: Naming, numbers: Vec<PhoneNumber> },
    AwaitUpload(InsertJob),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenameStep {
    AwaitUpload,
    RenameFileChoice { document: HeldDocument },
    NewFileName { document: HeldDocument },
    OldName { document: HeldDocument },
    NewName { document: HeldDocument, old_name: String },
}

// ============================================================================
// Session State
// ============================================================================

/// State of one user's session
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    /// No feature active
    #[default]
    Idle,
    Convert(ConvertStep),
    ConvertAny(ConvertAnyStep),
    Extract(ExtractStep),
    CopyNumber(CopyNumberStep),
    CustomNumber(CustomNumberStep),
    Split(SplitStep),
    Insert(InsertStep),
    Rename(RenameStep),
}

impl SessionState {
    pub fn feature(&self) -> Option<Feature> {
        match self {
            SessionState::Idle => None,
            SessionState::Convert(_) => Some(Feature::Convert),
            SessionState::ConvertAny(_) => Some(Feature::ConvertAny),
            SessionState::Extract(_) => Some(Feature::Extract),
            SessionState::CopyNumber(_) => Some(Feature::CopyNumber),
            SessionState::CustomNumber(_) => Some(Feature::CustomNumber),
            SessionState::Split(_) => Some(Feature::Split),
            SessionState::Insert(_) => Some(Feature::Insert),
            SessionState::Rename(_) => Some(Feature::Rename),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }

    /// Whether the current step expects an attachment
    pub fn awaits_upload(&self) -> bool {
        matches!(
            self,
            SessionState::Convert(ConvertStep::AwaitUpload(_))
                | SessionState::ConvertAny(ConvertAnyStep::AwaitUpload(_))
                | SessionState::Extract(ExtractStep::AwaitUpload(_))
                | SessionState::CopyNumber(CopyNumberStep::AwaitUpload(_))
                | SessionState::Split(SplitStep::AwaitUpload(_))
                | SessionState::Insert(InsertStep::AwaitUpload(_))
                | SessionState::Rename(RenameStep::AwaitUpload)
        )
    }

    /// Short step label for logs
    pub fn step_name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Convert(step) => match step {
                ConvertStep::ContactName => "contact_name",
                ConvertStep::BaseName { .. } => "base_name",
                ConvertStep::RecipientChoice { .. } => "recipient_choice",
                ConvertStep::RecipientId { .. } => "recipient_id",
                ConvertStep::UploadCount { .. } => "upload_count",
                ConvertStep::SequenceStart { .. } => "sequence_start",
                ConvertStep::AwaitUpload(_) => "await_upload",
                ConvertStep::AwaitDecision(_) => "await_decision",
            },
            SessionState::ConvertAny(step) => match step {
                ConvertAnyStep::ContactName => "contact_name",
                ConvertAnyStep::BaseName { .. } => "base_name",
                ConvertAnyStep::UploadCount { .. } => "upload_count",
                ConvertAnyStep::AwaitUpload(_) => "await_upload",
                ConvertAnyStep::AwaitDecision(_) => "await_decision",
            },
            SessionState::Extract(step) => match step {
                ExtractStep::LineCount => "line_count",
                ExtractStep::AwaitUpload(_) => "await_upload",
                ExtractStep::AwaitDecision(_) => "await_decision",
            },
            SessionState::CopyNumber(step) => match step {
                CopyNumberStep::ColumnIndex => "column_index",
                CopyNumberStep::AwaitUpload(_) => "await_upload",
                CopyNumberStep::AwaitDecision(_) => "await_decision",
            },
            SessionState::CustomNumber(step) => match step {
                CustomNumberStep::ContactName => "contact_name",
                CustomNumberStep::BaseName { .. } => "base_name",
                CustomNumberStep::CollectNumbers { .. } => "collect_numbers",
            },
            SessionState::Split(step) => match step {
                SplitStep::ContactName => "contact_name",
                SplitStep::BaseName { .. } => "base_name",
                SplitStep::SplitCount { .. } => "split_count",
                SplitStep::RecipientChoice { .. } => "recipient_choice",
                SplitStep::RecipientId { .. } => "recipient_id",
                SplitStep::AwaitUpload(_) => "await_upload",
            },
            SessionState::Insert(step) => match step {
                InsertStep::ContactName => "contact_name",
                InsertStep::BaseName { .. } => "base_name",
                InsertStep::CollectNumbers { .. } => "collect_numbers",
                InsertStep::UploadCount { .. } => "upload_count",
                InsertStep::AwaitUpload(_) => "await_upload",
            },
            SessionState::Rename(step) => match step {
                RenameStep::AwaitUpload => "await_upload",
                RenameStep::RenameFileChoice { .. } => "rename_file_choice",
                RenameStep::NewFileName { .. } => "new_file_name",
                RenameStep::OldName { .. } => "old_name",
                RenameStep::NewName { .. } => "new_name",
            },
        }
    }
}

/// Identity of the session, fixed for its lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionContext {
    pub user_id: i64,
    pub chat_id: i64,
}

impl SessionContext {
    pub fn new(user_id: i64, chat_id: i64) -> Self {
        Self { user_id, chat_id }
    }

    /// Resolve a recipient to a concrete chat id
    pub fn resolve(&self, recipient: Recipient) -> i64 {
        match recipient {
            Recipient::Requester => self.chat_id,
            Recipient::Chat(id) => id,
        }
    }
}
