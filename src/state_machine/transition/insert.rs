//! `/sisip`: append admin contacts to uploaded vCard files

use super::{advance, document_of, rejected, text_of, TransitionResult};
use crate::contacts::vcard::{append_records, build_records};
use crate::contacts::{DocumentKind, NameStyle, PhoneNumber, RecordShape};
use crate::error::{StepError, ValidationReason};
use crate::state_machine::effect::Effect;
use crate::state_machine::event::Event;
use crate::state_machine::input;
use crate::state_machine::state::{
    InsertJob, InsertStep, Naming, Recipient, SessionState, UploadProgress,
};

const ACCEPTED: &[DocumentKind] = &[DocumentKind::ContactCard];
const LABEL: &str = ".vcf";

pub(super) fn initial() -> InsertStep {
    InsertStep::ContactName
}

pub(super) fn prompt(step: &InsertStep) -> String {
    match step {
        InsertStep::ContactName => "Silakan masukkan nama kontak yang akan ditambahkan.".to_string(),
        InsertStep::BaseName { contact_name } => format!(
            "Nama kontak '{contact_name}' telah dipilih. Silakan masukkan nama file VCF yang akan digunakan."
        ),
        InsertStep::CollectNumbers { numbers, .. } if numbers.is_empty() => {
            "Silakan masukkan nomor kontak (format: satu nomor per baris). Kirim 'SELESAI' jika sudah selesai."
                .to_string()
        }
        InsertStep::CollectNumbers { .. } => {
            "Kirim nomor lain atau 'SELESAI' jika sudah selesai.".to_string()
        }
        InsertStep::UploadCount { .. } => {
            "Silakan masukkan jumlah file VCF yang akan Anda unggah.".to_string()
        }
        InsertStep::AwaitUpload(job) if job.progress.uploads == 0 => format!(
            "Anda akan mengunggah {} file VCF. Silakan unggah file VCF Anda satu per satu.",
            job.progress.target
        ),
        InsertStep::AwaitUpload(job) => format!(
            "Silakan unggah {} file VCF lagi.",
            job.progress.remaining()
        ),
    }
}

pub(super) fn step(step: &InsertStep, event: Event) -> TransitionResult {
    apply(step, event).unwrap_or_else(|e| rejected(SessionState::Insert(step.clone()), &e))
}

fn to(step: InsertStep, effects: Vec<Effect>) -> TransitionResult {
    advance(SessionState::Insert(step), effects)
}

/// Every non-blank line must be a strict `+<digits>` number.
fn parse_numbers(message: &str) -> Result<Vec<PhoneNumber>, StepError> {
    message
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            PhoneNumber::parse_strict(line)
                .ok_or_else(|| StepError::validation(ValidationReason::NotPhoneNumber))
        })
        .collect()
}

fn apply(step: &InsertStep, event: Event) -> Result<TransitionResult, StepError> {
    match step {
        InsertStep::ContactName => {
            let contact_name = input::text(&text_of(event)?)?;
            Ok(to(InsertStep::BaseName { contact_name }, vec![]))
        }
        InsertStep::BaseName { contact_name } => {
            let naming = Naming {
                contact_name: contact_name.clone(),
                base_name: input::file_stem(&text_of(event)?)?,
            };
            Ok(to(
                InsertStep::CollectNumbers {
                    naming,
                    numbers: Vec::new(),
                },
                vec![],
            ))
        }
        InsertStep::CollectNumbers { naming, numbers } => {
            let message = text_of(event)?;
            if input::is_sentinel(&message) {
                if numbers.is_empty() {
                    return Ok(to(
                        step.clone(),
                        vec![Effect::reply(
                            "Tidak ada nomor kontak yang dimasukkan. Silakan masukkan nomor kontak terlebih dahulu.",
                        )],
                    ));
                }
                return Ok(to(
                    InsertStep::UploadCount {
                        naming: naming.clone(),
                        numbers: numbers.clone(),
                    },
                    vec![],
                ));
            }

            let parsed = parse_numbers(&message)?;
            let mut numbers = numbers.clone();
            numbers.extend(parsed);
            Ok(to(
                InsertStep::CollectNumbers {
                    naming: naming.clone(),
                    numbers,
                },
                vec![Effect::reply("Nomor kontak telah ditambahkan.")],
            ))
        }
        InsertStep::UploadCount { naming, numbers } => {
            let target = input::positive(&text_of(event)?)?;
            Ok(to(
                InsertStep::AwaitUpload(InsertJob {
                    naming: naming.clone(),
                    numbers: numbers.clone(),
                    progress: UploadProgress::new(target),
                }),
                vec![],
            ))
        }
        InsertStep::AwaitUpload(job) => {
            let document = document_of(event, LABEL)?;
            input::require_kind(&document, ACCEPTED, LABEL)?;

            let blocks = build_records(
                &job.naming.contact_name,
                &job.numbers,
                NameStyle::Numbered,
                RecordShape::Structured,
            );
            let bytes = append_records(&document.bytes, &blocks);
            let file_name = input::sanitize_file_name(&document.file_name);
            let summary = format!("File '{file_name}' telah diproses dan dikirim.");
            let delivery = Effect::send_document(Recipient::Requester, &file_name, bytes);

            let progress = job.progress.record([file_name]);
            if progress.is_complete() {
                return Ok(TransitionResult::new(SessionState::Idle)
                    .with_effect(delivery)
                    .reply(summary)
                    .reply("Semua file VCF telah diproses.")
                    .with_effect(Effect::EndSession));
            }
            Ok(to(
                InsertStep::AwaitUpload(InsertJob {
                    progress,
                    ..job.clone()
                }),
                vec![delivery, Effect::reply(summary)],
            ))
        }
    }
}
