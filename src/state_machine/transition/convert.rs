//! `/convert`: text uploads to numbered vCard files

use super::{advance, continuation, document_of, rejected, text_of, Continuation, TransitionResult};
use crate::contacts::extract::{decode_text, extract_lines};
use crate::contacts::vcard::{build_records, serialize};
use crate::contacts::{DocumentKind, NameStyle, RecordShape};
use crate::error::StepError;
use crate::state_machine::effect::Effect;
use crate::state_machine::event::Event;
use crate::state_machine::input;
use crate::state_machine::prompts;
use crate::state_machine::state::{ConvertJob, ConvertStep, Naming, Recipient, SessionState, UploadProgress};

const ACCEPTED: &[DocumentKind] = &[DocumentKind::PlainText, DocumentKind::Delimited];
const LABEL: &str = ".txt atau .csv";

pub(super) fn initial() -> ConvertStep {
    ConvertStep::ContactName
}

pub(super) fn prompt(step: &ConvertStep) -> String {
    match step {
        ConvertStep::ContactName => prompts::CONTACT_NAME.to_string(),
        ConvertStep::BaseName { contact_name } => prompts::base_name_for(contact_name),
        ConvertStep::RecipientChoice { .. } => prompts::RECIPIENT_CHOICE.to_string(),
        ConvertStep::RecipientId { .. } => prompts::RECIPIENT_ID.to_string(),
        ConvertStep::UploadCount { .. } => {
            "Berapa jumlah file .txt yang akan Anda unggah? (Silakan masukkan angka)".to_string()
        }
        ConvertStep::SequenceStart { .. } => {
            "Silakan masukkan nomor urut awal untuk file VCF.".to_string()
        }
        ConvertStep::AwaitUpload(job) if job.progress.uploads == 0 => {
            "Silakan unggah file .txt Anda untuk dikonversi ke VCF.".to_string()
        }
        ConvertStep::AwaitUpload(job) => format!(
            "Silakan unggah file .txt berikutnya ({} dari {}).",
            job.progress.uploads + 1,
            job.progress.target
        ),
        ConvertStep::AwaitDecision(_) => prompts::DECISION.to_string(),
    }
}

pub(super) fn step(step: &ConvertStep, event: Event) -> TransitionResult {
    apply(step, event).unwrap_or_else(|e| rejected(SessionState::Convert(step.clone()), &e))
}

fn to(step: ConvertStep, effects: Vec<Effect>) -> TransitionResult {
    advance(SessionState::Convert(step), effects)
}

fn apply(step: &ConvertStep, event: Event) -> Result<TransitionResult, StepError> {
    match step {
        ConvertStep::ContactName => {
            let contact_name = input::text(&text_of(event)?)?;
            Ok(to(ConvertStep::BaseName { contact_name }, vec![]))
        }
        ConvertStep::BaseName { contact_name } => {
            let naming = Naming {
                contact_name: contact_name.clone(),
                base_name: input::file_stem(&text_of(event)?)?,
            };
            Ok(to(ConvertStep::RecipientChoice { naming }, vec![]))
        }
        ConvertStep::RecipientChoice { naming } => {
            let naming = naming.clone();
            if input::yes_no(&text_of(event)?)? {
                Ok(to(ConvertStep::RecipientId { naming }, vec![]))
            } else {
                Ok(to(
                    ConvertStep::UploadCount {
                        naming,
                        recipient: Recipient::Requester,
                    },
                    vec![],
                ))
            }
        }
        ConvertStep::RecipientId { naming } => {
            let recipient = Recipient::Chat(input::chat_id(&text_of(event)?)?);
            Ok(to(
                ConvertStep::UploadCount {
                    naming: naming.clone(),
                    recipient,
                },
                vec![],
            ))
        }
        ConvertStep::UploadCount { naming, recipient } => {
            let expected = input::positive(&text_of(event)?)?;
            Ok(to(
                ConvertStep::SequenceStart {
                    naming: naming.clone(),
                    recipient: *recipient,
                    expected,
                },
                vec![],
            ))
        }
        ConvertStep::SequenceStart {
            naming,
            recipient,
            expected,
        } => {
            let seq_start = input::positive(&text_of(event)?)?;
            Ok(to(
                ConvertStep::AwaitUpload(ConvertJob {
                    naming: naming.clone(),
                    recipient: *recipient,
                    seq_start,
                    progress: UploadProgress::new(*expected),
                }),
                vec![],
            ))
        }
        ConvertStep::AwaitUpload(job) => {
            let document = document_of(event, LABEL)?;
            input::require_kind(&document, ACCEPTED, LABEL)?;
            let numbers = extract_lines(&decode_text(&document.bytes).text);
            if numbers.is_empty() {
                return Err(StepError::NoExtractableData);
            }

            let blocks = build_records(
                &job.naming.contact_name,
                &numbers,
                NameStyle::Numbered,
                RecordShape::Formatted,
            );
            let seq = job.seq_start.saturating_add(job.progress.uploads);
            let file_name = format!("{}-{seq:02}.vcf", job.naming.base_name);
            let summary = format!(
                "File '{}' telah dikonversi menjadi {file_name} ({} kontak).",
                document.file_name,
                numbers.len()
            );
            let delivery = Effect::send_document(job.recipient, &file_name, serialize(&blocks));

            let job = ConvertJob {
                progress: job.progress.record([file_name]),
                ..job.clone()
            };
            if job.progress.is_complete() {
                Ok(to(
                    ConvertStep::AwaitDecision(job),
                    vec![
                        delivery,
                        Effect::reply(summary),
                        Effect::reply("Semua file telah diproses dan dikirim."),
                    ],
                ))
            } else {
                Ok(to(ConvertStep::AwaitUpload(job), vec![delivery, Effect::reply(summary)]))
            }
        }
        ConvertStep::AwaitDecision(job) => match continuation(event, &job.progress)? {
            Continuation::Finished(result) => Ok(result),
            Continuation::Resume(progress) => Ok(to(
                ConvertStep::AwaitUpload(ConvertJob {
                    progress,
                    ..job.clone()
                }),
                vec![],
            )),
        },
    }
}
