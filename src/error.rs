//! Step-level error taxonomy
//!
//! Every error here is recovered at the step boundary: the session stays in
//! its current step and the user gets a short explanation plus the prompt.

use thiserror::Error;

/// Errors raised while validating input or transforming an upload
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    /// Malformed text or numeric field
    #[error("invalid input: {reason}")]
    Validation { reason: ValidationReason },

    /// Attachment missing or its extension is not accepted by this step
    #[error("unsupported document: {file_name}")]
    UnsupportedFormat { file_name: String, accepted: &'static str },

    /// Document present but unreadable
    #[error("failed to parse {file_name}: {detail}")]
    Parse { file_name: String, detail: String },

    /// Column selector exceeds the sheet width
    #[error("column {requested} out of range (sheet has {available})")]
    ColumnOutOfRange { requested: usize, available: usize },

    /// Transform produced zero records
    #[error("no extractable data")]
    NoExtractableData,

    /// Output text has characters the upload's encoding cannot hold
    #[error("text not representable in {encoding}")]
    Unencodable { encoding: &'static str },
}

/// Why a field was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationReason {
    EmptyText,
    ExpectedText,
    NotPositiveNumber,
    TooLarge { max: usize },
    NotYesNo,
    NotDecision,
    NotChatId,
    NotPhoneNumber,
}

impl std::fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::EmptyText => "empty text",
            Self::ExpectedText => "expected a text message",
            Self::NotPositiveNumber => "not a positive integer",
            Self::TooLarge { max } => return write!(f, "greater than {max}"),
            Self::NotYesNo => "expected ya/tidak",
            Self::NotDecision => "expected selesai/belum",
            Self::NotChatId => "not a chat id",
            Self::NotPhoneNumber => "not a +<digits> number",
        };
        f.write_str(text)
    }
}

impl StepError {
    pub fn validation(reason: ValidationReason) -> Self {
        Self::Validation { reason }
    }

    pub fn parse(file_name: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        Self::Parse {
            file_name: file_name.into(),
            detail: detail.to_string(),
        }
    }

    /// Short Indonesian explanation shown to the user
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { reason } => match reason {
                ValidationReason::EmptyText => "Input tidak boleh kosong.".to_string(),
                ValidationReason::ExpectedText => "Silakan balas dengan pesan teks.".to_string(),
                ValidationReason::NotPositiveNumber => {
                    "Tolong masukkan angka yang valid (lebih dari 0).".to_string()
                }
                ValidationReason::TooLarge { max } => {
                    format!("Angka terlalu besar. Masukkan angka antara 1 dan {max}.")
                }
                ValidationReason::NotYesNo => "Tolong ketik 'ya' atau 'tidak'.".to_string(),
                ValidationReason::NotDecision => {
                    "Input tidak dikenal. Silakan ketik 'selesai' atau 'belum'.".to_string()
                }
                ValidationReason::NotChatId => {
                    "ID tujuan harus berupa angka. Silakan masukkan ID yang valid.".to_string()
                }
                ValidationReason::NotPhoneNumber => {
                    "Harap masukkan nomor kontak yang valid dengan format yang benar (contoh: +628123456789)."
                        .to_string()
                }
            },
            Self::UnsupportedFormat { accepted, .. } => {
                format!("Tolong unggah file {accepted} yang valid.")
            }
            Self::Parse { file_name, .. } => {
                format!("File '{file_name}' tidak dapat dibaca. Silakan unggah ulang.")
            }
            Self::ColumnOutOfRange {
                requested,
                available,
            } => format!(
                "Kolom {requested} tidak ada dalam file (file hanya memiliki {available} kolom)."
            ),
            Self::NoExtractableData => {
                "Tidak ada data yang ditemukan untuk diubah menjadi VCF.".to_string()
            }
            Self::Unencodable { encoding } => format!(
                "Nama mengandung karakter yang tidak didukung oleh encoding file ({encoding}). Silakan gunakan nama lain."
            ),
        }
    }
}
