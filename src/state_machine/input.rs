//! Field parsing for text replies

use super::event::UploadedDocument;
use crate::contacts::DocumentKind;
use crate::error::{StepError, ValidationReason};

/// Answer to the continuation question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Done,
    NotDone,
}

/// Non-blank text, trimmed.
pub fn text(raw: &str) -> Result<String, StepError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(StepError::validation(ValidationReason::EmptyText));
    }
    Ok(trimmed.to_string())
}

/// A file-name part: non-blank and safe to use as a single path component.
pub fn file_stem(raw: &str) -> Result<String, StepError> {
    let stem = sanitize_file_name(&text(raw)?);
    if stem.chars().all(|c| c == '.' || c == '_') {
        return Err(StepError::validation(ValidationReason::EmptyText));
    }
    Ok(stem)
}

/// Replace path separators and control characters with `_`.
pub fn sanitize_file_name(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c == ':' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}

pub fn positive(raw: &str) -> Result<usize, StepError> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(StepError::validation(ValidationReason::NotPositiveNumber)),
    }
}

/// A positive integer no greater than `max`
pub fn bounded(raw: &str, max: usize) -> Result<usize, StepError> {
    let n = positive(raw)?;
    if n > max {
        return Err(StepError::validation(ValidationReason::TooLarge { max }));
    }
    Ok(n)
}

pub fn yes_no(raw: &str) -> Result<bool, StepError> {
    let answer = raw.trim();
    if answer.eq_ignore_ascii_case("ya") {
        Ok(true)
    } else if answer.eq_ignore_ascii_case("tidak") {
        Ok(false)
    } else {
        Err(StepError::validation(ValidationReason::NotYesNo))
    }
}

pub fn decision(raw: &str) -> Result<Decision, StepError> {
    let answer = raw.trim();
    if answer.eq_ignore_ascii_case("selesai") {
        Ok(Decision::Done)
    } else if answer.eq_ignore_ascii_case("belum") {
        Ok(Decision::NotDone)
    } else {
        Err(StepError::validation(ValidationReason::NotDecision))
    }
}

/// Telegram chat id; negative for groups.
pub fn chat_id(raw: &str) -> Result<i64, StepError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| StepError::validation(ValidationReason::NotChatId))
}

/// Batch terminator line for typed number lists
pub fn is_sentinel(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case("selesai")
}

/// Check an upload's extension against the kinds a step accepts.
pub fn require_kind(
    document: &UploadedDocument,
    accepted: &[DocumentKind],
    label: &'static str,
) -> Result<DocumentKind, StepError> {
    match document.kind() {
        Some(kind) if accepted.contains(&kind) => Ok(kind),
        _ => Err(StepError::UnsupportedFormat {
            file_name: document.file_name.clone(),
            accepted: label,
        }),
    }
}

/// Error for a text reply where an upload was expected
pub fn expected_document(label: &'static str) -> StepError {
    StepError::UnsupportedFormat {
        file_name: String::new(),
        accepted: label,
    }
}

/// Error for an upload where a text reply was expected
pub fn expected_text() -> StepError {
    StepError::validation(ValidationReason::ExpectedText)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive() {
        assert_eq!(positive(" 5 "), Ok(5));
        assert!(positive("0").is_err());
        assert!(positive("-3").is_err());
        assert!(positive("abc").is_err());
        assert!(positive("").is_err());
    }

    #[test]
    fn test_bounded_rejects_above_max() {
        assert_eq!(bounded("100", 100), Ok(100));
        assert_eq!(
            bounded("101", 100),
            Err(StepError::validation(ValidationReason::TooLarge { max: 100 }))
        );
        assert!(bounded("18446744073709551615", 100).is_err());
        assert!(bounded("0", 100).is_err());
    }

    #[test]
    fn test_yes_no_case_insensitive() {
        assert_eq!(yes_no("YA"), Ok(true));
        assert_eq!(yes_no("Tidak"), Ok(false));
        assert!(yes_no("yes").is_err());
    }

    #[test]
    fn test_decision() {
        assert_eq!(decision("Selesai"), Ok(Decision::Done));
        assert_eq!(decision("belum "), Ok(Decision::NotDone));
        assert!(decision("nanti").is_err());
    }

    #[test]
    fn test_chat_id_allows_groups() {
        assert_eq!(chat_id("123456789"), Ok(123_456_789));
        assert_eq!(chat_id("-1001234"), Ok(-1_001_234));
        assert!(chat_id("@someone").is_err());
    }

    #[test]
    fn test_file_stem_sanitizes() {
        assert_eq!(file_stem(" ../etc/passwd ").unwrap(), ".._etc_passwd");
        assert_eq!(file_stem("kontak\tbaru").unwrap(), "kontak_baru");
        assert!(file_stem("   ").is_err());
        assert!(file_stem("/").is_err());
        assert!(file_stem("..").is_err());
    }

    #[test]
    fn test_require_kind() {
        let doc = UploadedDocument::new("a.csv", b"1".to_vec());
        let kinds = [DocumentKind::PlainText, DocumentKind::Delimited];
        assert_eq!(require_kind(&doc, &kinds, ".txt"), Ok(DocumentKind::Delimited));
        let doc = UploadedDocument::new("a.pdf", b"1".to_vec());
        assert!(matches!(
            require_kind(&doc, &kinds, ".txt"),
            Err(StepError::UnsupportedFormat { .. })
        ));
    }
}
