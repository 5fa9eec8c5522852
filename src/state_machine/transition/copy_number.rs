//! `/copy_number`: one spreadsheet column to a number list

use super::{advance, continuation, document_of, rejected, text_of, Continuation, TransitionResult};
use crate::contacts::extract::{extract_column, numbers_document, read_sheet};
use crate::contacts::DocumentKind;
use crate::error::StepError;
use crate::state_machine::effect::Effect;
use crate::state_machine::event::Event;
use crate::state_machine::input;
use crate::state_machine::prompts;
use crate::state_machine::state::{
    CopyNumberJob, CopyNumberStep, Recipient, SessionState, UploadProgress, MAX_UPLOADS,
};

const ACCEPTED: &[DocumentKind] = &[DocumentKind::Spreadsheet];
const LABEL: &str = "Excel";

pub(super) fn initial() -> CopyNumberStep {
    CopyNumberStep::ColumnIndex
}

pub(super) fn prompt(step: &CopyNumberStep) -> String {
    match step {
        CopyNumberStep::ColumnIndex => {
            "Masukkan nomor kolom dari mana Anda ingin mengambil data nomor (mulai dari 1):"
                .to_string()
        }
        CopyNumberStep::AwaitUpload(_) => {
            format!("Silakan unggah file Excel (maksimal {MAX_UPLOADS} file):")
        }
        CopyNumberStep::AwaitDecision(_) => prompts::DECISION.to_string(),
    }
}

pub(super) fn step(step: &CopyNumberStep, event: Event) -> TransitionResult {
    apply(step, event).unwrap_or_else(|e| rejected(SessionState::CopyNumber(step.clone()), &e))
}

fn to(step: CopyNumberStep, effects: Vec<Effect>) -> TransitionResult {
    advance(SessionState::CopyNumber(step), effects)
}

fn apply(step: &CopyNumberStep, event: Event) -> Result<TransitionResult, StepError> {
    match step {
        CopyNumberStep::ColumnIndex => {
            let column = input::positive(&text_of(event)?)?;
            Ok(to(
                CopyNumberStep::AwaitUpload(CopyNumberJob {
                    column,
                    progress: UploadProgress::new(MAX_UPLOADS),
                }),
                vec![],
            ))
        }
        CopyNumberStep::AwaitUpload(job) => {
            let document = document_of(event, LABEL)?;
            input::require_kind(&document, ACCEPTED, LABEL)?;
            let grid = read_sheet(&document.file_name, &document.bytes)?;
            let numbers = extract_column(&grid, job.column)?;
            if numbers.is_empty() {
                return Err(StepError::NoExtractableData);
            }

            let file_name = format!(
                "extracted_{}.txt",
                input::sanitize_file_name(&document.file_name)
            );
            let summary = format!(
                "{} nomor diambil dari kolom {}.",
                numbers.len(),
                job.column
            );
            let delivery =
                Effect::send_document(Recipient::Requester, &file_name, numbers_document(&numbers));
            let job = CopyNumberJob {
                column: job.column,
                progress: job.progress.record([file_name]),
            };
            Ok(to(
                CopyNumberStep::AwaitDecision(job),
                vec![delivery, Effect::reply(summary)],
            ))
        }
        CopyNumberStep::AwaitDecision(job) => match continuation(event, &job.progress)? {
            Continuation::Finished(result) => Ok(result),
            Continuation::Resume(progress) => Ok(to(
                CopyNumberStep::AwaitUpload(CopyNumberJob {
                    column: job.column,
                    progress,
                }),
                vec![Effect::reply(prompts::ANOTHER_UPLOAD)],
            )),
        },
    }
}
