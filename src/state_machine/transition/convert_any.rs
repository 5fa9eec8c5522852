//! `/convert_any`: text or spreadsheet uploads to one vCard file each

use super::{advance, continuation, document_of, rejected, text_of, Continuation, TransitionResult};
use crate::contacts::extract::{decode_text, extract_all_cells, extract_lines, read_sheet};
use crate::contacts::vcard::{build_records, serialize};
use crate::contacts::{DocumentKind, NameStyle, RecordShape};
use crate::error::StepError;
use crate::state_machine::effect::Effect;
use crate::state_machine::event::Event;
use crate::state_machine::input;
use crate::state_machine::prompts;
use crate::state_machine::state::{
    ConvertAnyJob, ConvertAnyStep, Naming, Recipient, SessionState, UploadProgress,
};

const ACCEPTED: &[DocumentKind] = &[
    DocumentKind::PlainText,
    DocumentKind::Delimited,
    DocumentKind::Spreadsheet,
];
const LABEL: &str = ".txt, .csv, atau Excel";

pub(super) fn initial() -> ConvertAnyStep {
    ConvertAnyStep::ContactName
}

pub(super) fn prompt(step: &ConvertAnyStep) -> String {
    match step {
        ConvertAnyStep::ContactName => prompts::CONTACT_NAME.to_string(),
        ConvertAnyStep::BaseName { contact_name } => prompts::base_name_for(contact_name),
        ConvertAnyStep::UploadCount { .. } => {
            "Silakan masukkan jumlah file yang akan diunggah.".to_string()
        }
        ConvertAnyStep::AwaitUpload(job) if job.progress.uploads == 0 => {
            "Silakan unggah file yang akan dikonversi (.txt, .csv, .xlsx, .xls, .ods).".to_string()
        }
        ConvertAnyStep::AwaitUpload(job) => format!(
            "Silakan unggah file berikutnya ({} dari {}).",
            job.progress.uploads + 1,
            job.progress.target
        ),
        ConvertAnyStep::AwaitDecision(_) => prompts::DECISION.to_string(),
    }
}

pub(super) fn step(step: &ConvertAnyStep, event: Event) -> TransitionResult {
    apply(step, event).unwrap_or_else(|e| rejected(SessionState::ConvertAny(step.clone()), &e))
}

fn to(step: ConvertAnyStep, effects: Vec<Effect>) -> TransitionResult {
    advance(SessionState::ConvertAny(step), effects)
}

fn apply(step: &ConvertAnyStep, event: Event) -> Result<TransitionResult, StepError> {
    match step {
        ConvertAnyStep::ContactName => {
            let contact_name = input::text(&text_of(event)?)?;
            Ok(to(ConvertAnyStep::BaseName { contact_name }, vec![]))
        }
        ConvertAnyStep::BaseName { contact_name } => {
            let naming = Naming {
                contact_name: contact_name.clone(),
                base_name: input::file_stem(&text_of(event)?)?,
            };
            Ok(to(ConvertAnyStep::UploadCount { naming }, vec![]))
        }
        ConvertAnyStep::UploadCount { naming } => {
            let target = input::positive(&text_of(event)?)?;
            Ok(to(
                ConvertAnyStep::AwaitUpload(ConvertAnyJob {
                    naming: naming.clone(),
                    progress: UploadProgress::new(target),
                }),
                vec![],
            ))
        }
        ConvertAnyStep::AwaitUpload(job) => {
            let document = document_of(event, LABEL)?;
            let kind = input::require_kind(&document, ACCEPTED, LABEL)?;
            let numbers = if kind == DocumentKind::Spreadsheet {
                extract_all_cells(&read_sheet(&document.file_name, &document.bytes)?)
            } else {
                extract_lines(&decode_text(&document.bytes).text)
            };
            if numbers.is_empty() {
                return Err(StepError::NoExtractableData);
            }

            let blocks = build_records(
                &job.naming.contact_name,
                &numbers,
                NameStyle::Numbered,
                RecordShape::Formatted,
            );
            let file_name = format!("{}.vcf", job.naming.base_name);
            let summary = format!(
                "File '{}' telah diproses dan dikonversi menjadi file VCF ({} kontak).",
                document.file_name,
                numbers.len()
            );
            let delivery = Effect::send_document(Recipient::Requester, &file_name, serialize(&blocks));

            let job = ConvertAnyJob {
                naming: job.naming.clone(),
                progress: job.progress.record([file_name]),
            };
            if job.progress.is_complete() {
                Ok(to(
                    ConvertAnyStep::AwaitDecision(job),
                    vec![
                        delivery,
                        Effect::reply(summary),
                        Effect::reply("Semua file telah diproses dan dikirim."),
                    ],
                ))
            } else {
                Ok(to(
                    ConvertAnyStep::AwaitUpload(job),
                    vec![delivery, Effect::reply(summary)],
                ))
            }
        }
        ConvertAnyStep::AwaitDecision(job) => match continuation(event, &job.progress)? {
            Continuation::Finished(result) => Ok(result),
            Continuation::Resume(progress) => Ok(to(
                ConvertAnyStep::AwaitUpload(ConvertAnyJob {
                    naming: job.naming.clone(),
                    progress,
                }),
                vec![],
            )),
        },
    }
}
