//! `/extract`: split a number list at a line threshold

use super::{advance, continuation, document_of, rejected, text_of, Continuation, TransitionResult};
use crate::contacts::extract::{decode_text, numbers_document, partition_lines};
use crate::contacts::{DocumentKind, PhoneNumber};
use crate::error::StepError;
use crate::state_machine::effect::Effect;
use crate::state_machine::event::Event;
use crate::state_machine::input;
use crate::state_machine::prompts;
use crate::state_machine::state::{
    ExtractJob, ExtractStep, Recipient, SessionState, UploadProgress, MAX_UPLOADS,
};

const ACCEPTED: &[DocumentKind] = &[DocumentKind::PlainText, DocumentKind::Delimited];
const LABEL: &str = ".txt atau .csv";

pub(super) fn initial() -> ExtractStep {
    ExtractStep::LineCount
}

pub(super) fn prompt(step: &ExtractStep) -> String {
    match step {
        ExtractStep::LineCount => "Masukkan jumlah baris nomor yang ingin diambil:".to_string(),
        ExtractStep::AwaitUpload(_) => {
            format!("Silakan unggah file TXT (maksimal {MAX_UPLOADS} file):")
        }
        ExtractStep::AwaitDecision(_) => prompts::DECISION.to_string(),
    }
}

pub(super) fn step(step: &ExtractStep, event: Event) -> TransitionResult {
    apply(step, event).unwrap_or_else(|e| rejected(SessionState::Extract(step.clone()), &e))
}

fn to(step: ExtractStep, effects: Vec<Effect>) -> TransitionResult {
    advance(SessionState::Extract(step), effects)
}

/// Deliver `numbers` as `file_name`, or say why nothing was sent.
fn half(file_name: String, numbers: &[PhoneNumber]) -> (Effect, Option<String>) {
    if numbers.is_empty() {
        let note = format!("Tidak ada nomor untuk {file_name}, file tidak dikirim.");
        (Effect::reply(note), None)
    } else {
        let effect = Effect::send_document(
            Recipient::Requester,
            &file_name,
            numbers_document(numbers),
        );
        (effect, Some(file_name))
    }
}

fn apply(step: &ExtractStep, event: Event) -> Result<TransitionResult, StepError> {
    match step {
        ExtractStep::LineCount => {
            let line_count = input::positive(&text_of(event)?)?;
            Ok(to(
                ExtractStep::AwaitUpload(ExtractJob {
                    line_count,
                    progress: UploadProgress::new(MAX_UPLOADS),
                }),
                vec![],
            ))
        }
        ExtractStep::AwaitUpload(job) => {
            let document = document_of(event, LABEL)?;
            input::require_kind(&document, ACCEPTED, LABEL)?;
            let partition = partition_lines(&decode_text(&document.bytes).text, job.line_count);
            if partition.selected.is_empty() && partition.remainder.is_empty() {
                return Err(StepError::NoExtractableData);
            }

            let source = input::sanitize_file_name(&document.file_name);
            let (extracted, extracted_name) =
                half(format!("extracted_{source}"), &partition.selected);
            let (remaining, remaining_name) =
                half(format!("remaining_{source}"), &partition.remainder);
            let summary = format!(
                "{} nomor diambil, {} nomor tersisa.",
                partition.selected.len(),
                partition.remainder.len()
            );

            let job = ExtractJob {
                line_count: job.line_count,
                progress: job
                    .progress
                    .record(extracted_name.into_iter().chain(remaining_name)),
            };
            Ok(to(
                ExtractStep::AwaitDecision(job),
                vec![extracted, remaining, Effect::reply(summary)],
            ))
        }
        ExtractStep::AwaitDecision(job) => match continuation(event, &job.progress)? {
            Continuation::Finished(result) => Ok(result),
            Continuation::Resume(progress) => Ok(to(
                ExtractStep::AwaitUpload(ExtractJob {
                    line_count: job.line_count,
                    progress,
                }),
                vec![Effect::reply(prompts::ANOTHER_UPLOAD)],
            )),
        },
    }
}
